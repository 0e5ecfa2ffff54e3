//! Canonical column ordering for spreadsheet export.
//!
//! Every DayRecord is projected onto the same column list so each sheet has a
//! fixed layout: the leading columns first, then the remaining DayRecord
//! fields in declaration order.

use crate::errors::AppResult;
use crate::models::{Column, DayRecord, OrderedRecord, Snapshot};

/// Columns placed before all others unless configured otherwise.
pub const DEFAULT_LEADING_COLUMNS: [Column; 2] = [Column::Province, Column::Municipality];

/// `leading` (first occurrence kept) followed by every other column in declaration order.
pub fn column_order(leading: &[Column]) -> Vec<Column> {
    let mut order: Vec<Column> = Vec::with_capacity(Column::ALL.len());
    for column in leading.iter().copied().chain(Column::ALL) {
        if !order.contains(&column) {
            order.push(column);
        }
    }
    order
}

/// Project a record onto `order`. Values are moved unchanged.
pub fn project(mut record: DayRecord, order: &[Column]) -> OrderedRecord {
    OrderedRecord {
        cells: order.iter().map(|&c| (c, record.take(c))).collect(),
    }
}

/// Rebuild every DayRecord of every snapshot in the canonical order.
pub fn reorder(snapshots: Vec<Snapshot>, leading: &[Column]) -> Vec<Snapshot<OrderedRecord>> {
    let order = column_order(leading);
    snapshots
        .into_iter()
        .map(|s| s.map_records(|r| project(r, &order)))
        .collect()
}

/// Parse a comma-separated column list such as `"province,municipality"`.
pub fn parse_columns(list: &str) -> AppResult<Vec<Column>> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| name.parse::<Column>())
        .collect()
}
