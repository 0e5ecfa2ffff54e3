//! Forecast archive types.
//!
//! A [`Snapshot`] is one 10-day forecast run covering many municipalities; each
//! municipality carries one [`DayRecord`] per forecast day. Snapshots are
//! generic over the record type so the same metadata travels through parsing
//! (`Snapshot<DayRecord>`) and column reordering (`Snapshot<OrderedRecord>`).

use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// Number of forecast days every municipality must carry.
pub const FORECAST_DAYS: usize = 10;

/// Municipality key → that municipality's day records, in input order.
pub type Municipalities<R> = IndexMap<String, Vec<R>>;

/// One forecast run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Snapshot<R = DayRecord> {
    pub date_archived: f64,
    pub date_archived_str: String,
    pub date_created: f64,
    /// Matching key across per-province files, also used for the output file name.
    pub date_created_str: String,
    pub date_end: Option<String>,
    pub date_end_str: Option<String>,
    pub date_forecast: Option<String>,
    pub date_forecast_str: Option<String>,
    pub date_range: Option<String>,
    pub date_start: Option<String>,
    pub date_start_str: Option<String>,
    /// Set by the upstream scraper when a run could not be parsed.
    pub error: Option<serde_json::Map<String, serde_json::Value>>,
    pub id: String,
    pub municipalities: Option<Municipalities<R>>,
}

impl<R> Snapshot<R> {
    /// Rebuild the snapshot with every day record passed through `f`.
    pub fn map_records<T>(self, mut f: impl FnMut(R) -> T) -> Snapshot<T> {
        let municipalities = self.municipalities.map(|map| {
            map.into_iter()
                .map(|(key, days)| (key, days.into_iter().map(&mut f).collect::<Vec<T>>()))
                .collect()
        });

        Snapshot {
            date_archived: self.date_archived,
            date_archived_str: self.date_archived_str,
            date_created: self.date_created,
            date_created_str: self.date_created_str,
            date_end: self.date_end,
            date_end_str: self.date_end_str,
            date_forecast: self.date_forecast,
            date_forecast_str: self.date_forecast_str,
            date_range: self.date_range,
            date_start: self.date_start,
            date_start_str: self.date_start_str,
            error: self.error,
            id: self.id,
            municipalities,
        }
    }

    /// Number of municipality entries (0 when the map is null).
    pub fn municipality_count(&self) -> usize {
        self.municipalities.as_ref().map_or(0, |m| m.len())
    }
}

/// One municipality's forecast for one day.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DayRecord {
    pub cover: String,
    pub day: f64,
    pub day_format: String,
    pub day_str: String,
    pub humidity: f64,
    pub municipality: String,
    pub province: String,
    pub rainfall: String,
    pub rainfall_amt_text: String,
    pub tmax: f64,
    pub tmean: f64,
    pub tmin: f64,
    pub wdirection: String,
    pub wspeed: f64,
}

impl DayRecord {
    /// Move the value of `column` out of the record.
    pub fn take(&mut self, column: Column) -> CellValue {
        match column {
            Column::Cover => CellValue::Text(std::mem::take(&mut self.cover)),
            Column::Day => CellValue::Number(self.day),
            Column::DayFormat => CellValue::Text(std::mem::take(&mut self.day_format)),
            Column::DayStr => CellValue::Text(std::mem::take(&mut self.day_str)),
            Column::Humidity => CellValue::Number(self.humidity),
            Column::Municipality => CellValue::Text(std::mem::take(&mut self.municipality)),
            Column::Province => CellValue::Text(std::mem::take(&mut self.province)),
            Column::Rainfall => CellValue::Text(std::mem::take(&mut self.rainfall)),
            Column::RainfallAmtText => {
                CellValue::Text(std::mem::take(&mut self.rainfall_amt_text))
            }
            Column::Tmax => CellValue::Number(self.tmax),
            Column::Tmean => CellValue::Number(self.tmean),
            Column::Tmin => CellValue::Number(self.tmin),
            Column::Wdirection => CellValue::Text(std::mem::take(&mut self.wdirection)),
            Column::Wspeed => CellValue::Number(self.wspeed),
        }
    }
}

/// A DayRecord field, usable as a spreadsheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Cover,
    Day,
    DayFormat,
    DayStr,
    Humidity,
    Municipality,
    Province,
    Rainfall,
    RainfallAmtText,
    Tmax,
    Tmean,
    Tmin,
    Wdirection,
    Wspeed,
}

impl Column {
    /// All DayRecord fields in declaration order.
    pub const ALL: [Column; 14] = [
        Column::Cover,
        Column::Day,
        Column::DayFormat,
        Column::DayStr,
        Column::Humidity,
        Column::Municipality,
        Column::Province,
        Column::Rainfall,
        Column::RainfallAmtText,
        Column::Tmax,
        Column::Tmean,
        Column::Tmin,
        Column::Wdirection,
        Column::Wspeed,
    ];

    /// Header text, identical to the JSON key.
    pub fn as_str(self) -> &'static str {
        match self {
            Column::Cover => "cover",
            Column::Day => "day",
            Column::DayFormat => "day_format",
            Column::DayStr => "day_str",
            Column::Humidity => "humidity",
            Column::Municipality => "municipality",
            Column::Province => "province",
            Column::Rainfall => "rainfall",
            Column::RainfallAmtText => "rainfall_amt_text",
            Column::Tmax => "tmax",
            Column::Tmean => "tmean",
            Column::Tmin => "tmin",
            Column::Wdirection => "wdirection",
            Column::Wspeed => "wspeed",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Column::ALL
            .into_iter()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| AppError::Config(format!("Unknown column '{}'", name)))
    }
}

/// A single cell of a reordered record.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    /// The column has no value on this record; rendered as an empty cell.
    Absent,
}

static ABSENT: CellValue = CellValue::Absent;

/// A DayRecord rebuilt as an ordered list of columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedRecord {
    pub cells: Vec<(Column, CellValue)>,
}

impl OrderedRecord {
    /// Value stored under `column`, or [`CellValue::Absent`].
    pub fn get(&self, column: Column) -> &CellValue {
        self.cells
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v)
            .unwrap_or(&ABSENT)
    }
}
