//! Excel export of merged forecast snapshots.
//!
//! One workbook per snapshot, one sheet per forecast day. Each sheet is laid
//! out as:
//!
//! ```text
//! row 0  | Date Created  | <date_created_str>
//! row 1  | Valid until   | <date_range>
//! row 2  | Forecast Date | <date_forecast>
//! row 3  | ID            | <id>
//! row 4  |
//! row 5  | province | municipality | cover | day | ...
//! row 6+ | one row per municipality for that day
//! ```

use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{AppError, AppResult};
use crate::models::{CellValue, Column, OrderedRecord, Snapshot, FORECAST_DAYS};

/// Row holding the column headers; metadata and a blank row sit above it.
const HEADER_ROW: u32 = 5;

/// Outcome of exporting a single snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Written(PathBuf),
    /// The snapshot carried an upstream parsing error.
    Skipped,
}

/// Totals for a full export run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: Vec<PathBuf>,
    pub skipped: usize,
}

/// Writes reordered snapshots to `.xlsx` files in a single output directory.
#[derive(Debug, Clone)]
pub struct ExcelWriter {
    output_dir: PathBuf,
    columns: Vec<Column>,
    /// Wait before clearing an existing output directory (slow container mounts).
    settle_delay: Duration,
}

impl ExcelWriter {
    pub fn new(output_dir: impl Into<PathBuf>, columns: Vec<Column>, settle_delay: Duration) -> Self {
        Self {
            output_dir: output_dir.into(),
            columns,
            settle_delay,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the output directory, removing any previous contents first.
    pub fn init_output_directory(&self) -> AppResult<()> {
        if self.output_dir.exists() {
            if !self.settle_delay.is_zero() {
                std::thread::sleep(self.settle_delay);
            }
            std::fs::remove_dir_all(&self.output_dir)?;
        }
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Write one workbook for `snapshot` into the output directory.
    pub fn export_snapshot(&self, snapshot: &Snapshot<OrderedRecord>) -> AppResult<ExportStatus> {
        if snapshot.error.is_some() {
            tracing::info!(
                "Skipping item with parsing error on {}",
                snapshot.date_created_str
            );
            return Ok(ExportStatus::Skipped);
        }

        ensure_complete(snapshot)?;

        let mut workbook = Workbook::new();
        for day in 0..FORECAST_DAYS {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(format!("Day {}", day + 1))?;
            self.write_day_sheet(worksheet, snapshot, day)?;
        }

        let path = self.output_dir.join(file_name_for(&snapshot.date_created_str));
        workbook.save(&path)?;
        tracing::info!("Wrote {}", path.display());

        Ok(ExportStatus::Written(path))
    }

    /// Recreate the output directory, then export every snapshot in order.
    pub fn export_all(&self, snapshots: &[Snapshot<OrderedRecord>]) -> AppResult<ExportSummary> {
        self.init_output_directory()?;

        let mut summary = ExportSummary::default();
        for snapshot in snapshots {
            match self.export_snapshot(snapshot)? {
                ExportStatus::Written(path) => summary.written.push(path),
                ExportStatus::Skipped => summary.skipped += 1,
            }
        }
        Ok(summary)
    }

    fn write_day_sheet(
        &self,
        worksheet: &mut Worksheet,
        snapshot: &Snapshot<OrderedRecord>,
        day: usize,
    ) -> AppResult<()> {
        let metadata: [(&str, Option<&str>); 4] = [
            ("Date Created", Some(snapshot.date_created_str.as_str())),
            ("Valid until", snapshot.date_range.as_deref()),
            ("Forecast Date", snapshot.date_forecast.as_deref()),
            ("ID", Some(snapshot.id.as_str())),
        ];
        for (row, (label, value)) in (0u32..).zip(metadata) {
            worksheet.write_string(row, 0, label)?;
            if let Some(value) = value {
                worksheet.write_string(row, 1, value)?;
            }
        }

        for (col, column) in (0u16..).zip(&self.columns) {
            worksheet.write_string(HEADER_ROW, col, column.as_str())?;
        }

        let Some(municipalities) = &snapshot.municipalities else {
            return Ok(());
        };

        for (row, days) in (HEADER_ROW + 1..).zip(municipalities.values()) {
            let record = &days[day];
            for (col, &column) in (0u16..).zip(&self.columns) {
                match record.get(column) {
                    CellValue::Text(text) => {
                        worksheet.write_string(row, col, text.as_str())?;
                    }
                    CellValue::Number(number) => {
                        worksheet.write_number(row, col, *number)?;
                    }
                    CellValue::Absent => {}
                }
            }
        }
        Ok(())
    }
}

/// `<date_created_str>.xlsx` with path separators replaced by hyphens.
pub fn file_name_for(date_created_str: &str) -> String {
    format!("{}.xlsx", date_created_str.replace(['/', '\\'], "-"))
}

/// Every municipality must carry exactly one record per forecast day.
fn ensure_complete<R>(snapshot: &Snapshot<R>) -> AppResult<()> {
    let Some(municipalities) = &snapshot.municipalities else {
        return Ok(());
    };

    match municipalities
        .iter()
        .find(|(_, days)| days.len() != FORECAST_DAYS)
    {
        Some((name, _)) => Err(AppError::IncompleteData {
            municipality: name.clone(),
            date_created: snapshot.date_created_str.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;
    use crate::services::columns::{column_order, reorder, DEFAULT_LEADING_COLUMNS};

    fn writer(dir: &Path) -> ExcelWriter {
        ExcelWriter::new(
            dir.join("output"),
            column_order(&DEFAULT_LEADING_COLUMNS),
            Duration::ZERO,
        )
    }

    fn ordered(snapshots: Vec<Snapshot>) -> Vec<Snapshot<OrderedRecord>> {
        reorder(snapshots, &DEFAULT_LEADING_COLUMNS)
    }

    #[test]
    fn test_file_name_replaces_separators() {
        assert_eq!(file_name_for("2024/06/01 08:00"), "2024-06-01 08:00.xlsx");
        assert_eq!(file_name_for("2024\\06\\01"), "2024-06-01.xlsx");
        assert_eq!(file_name_for("plain"), "plain.xlsx");
    }

    #[test]
    fn test_export_snapshot_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer(dir.path());
        writer.init_output_directory().unwrap();

        let snapshots = ordered(vec![fixtures::snapshot("2024/06/01", &[("Baguio", "Benguet")])]);
        let status = writer.export_snapshot(&snapshots[0]).unwrap();

        let expected = writer.output_dir().join("2024-06-01.xlsx");
        assert_eq!(status, ExportStatus::Written(expected.clone()));
        assert!(expected.is_file());
    }

    #[test]
    fn test_nine_days_is_incomplete_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer(dir.path());
        writer.init_output_directory().unwrap();

        let mut snapshot = fixtures::snapshot(
            "2024/06/01",
            &[("Baguio", "Benguet"), ("Sablan", "Benguet")],
        );
        snapshot.municipalities.as_mut().unwrap()["Sablan"].pop();
        let snapshots = ordered(vec![snapshot]);

        let err = writer.export_snapshot(&snapshots[0]).unwrap_err();
        match err {
            AppError::IncompleteData { municipality, date_created } => {
                assert_eq!(municipality, "Sablan");
                assert_eq!(date_created, "2024/06/01");
            }
            other => panic!("expected incomplete data, got {other:?}"),
        }
        assert!(!writer.output_dir().join("2024-06-01.xlsx").exists());
    }

    #[test]
    fn test_error_marked_snapshot_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer(dir.path());

        let mut broken = fixtures::snapshot("2024/06/01", &[("Baguio", "Benguet")]);
        broken.error = Some(serde_json::Map::new());
        let snapshots = ordered(vec![
            broken,
            fixtures::snapshot("2024/06/02", &[("Baguio", "Benguet")]),
        ]);

        let summary = writer.export_all(&snapshots).unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(
            summary.written,
            vec![writer.output_dir().join("2024-06-02.xlsx")]
        );
        assert!(!writer.output_dir().join("2024-06-01.xlsx").exists());
    }

    #[test]
    fn test_export_all_clears_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer(dir.path());
        std::fs::create_dir_all(writer.output_dir()).unwrap();
        let stale = writer.output_dir().join("stale.xlsx");
        std::fs::write(&stale, b"old").unwrap();

        let snapshots = ordered(vec![fixtures::snapshot("2024/06/01", &[("Baguio", "Benguet")])]);
        writer.export_all(&snapshots).unwrap();

        assert!(!stale.exists());
        assert!(writer.output_dir().join("2024-06-01.xlsx").is_file());
    }

    #[test]
    fn test_null_municipalities_still_exported() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer(dir.path());

        let mut snapshot = fixtures::snapshot("2024/06/01", &[]);
        snapshot.municipalities = None;
        let summary = writer.export_all(&ordered(vec![snapshot])).unwrap();
        assert_eq!(summary.written.len(), 1);
    }

    #[test]
    fn test_ensure_complete_accepts_ten_days() {
        let snapshot = fixtures::snapshot("2024/06/01", &[("Baguio", "Benguet")]);
        assert!(ensure_complete(&snapshot).is_ok());
    }
}
