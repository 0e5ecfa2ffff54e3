//! One conversion run: load and merge the input directory, reorder columns,
//! write the workbooks.

use chrono::Utc;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::errors::AppResult;
use crate::services::columns::{column_order, reorder};
use crate::services::merge::SkippedSnapshot;
use crate::services::reader;
use crate::services::writer::ExcelWriter;

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    /// Snapshots not exported because they carried an error marker.
    pub skipped: usize,
    /// Municipality keys renamed during the merge.
    pub collisions: Vec<String>,
    /// Incoming snapshots with no municipality data, so nothing was merged from them.
    pub unmerged: Vec<SkippedSnapshot>,
}

/// Convert every snapshot found in `config.input_dir` into workbooks under `config.output_dir`.
pub fn run(config: &AppConfig) -> AppResult<RunSummary> {
    let started = Utc::now();

    let merged = reader::load(&config.input_dir)?;
    let municipalities: usize = merged.snapshots.iter().map(|s| s.municipality_count()).sum();
    tracing::info!(
        "Merged {} snapshots ({} municipality entries, {} unmerged)",
        merged.snapshots.len(),
        municipalities,
        merged.skipped.len()
    );

    let snapshots = reorder(merged.snapshots, &config.leading_columns);

    let writer = ExcelWriter::new(
        &config.output_dir,
        column_order(&config.leading_columns),
        config.output_settle_delay,
    );
    let exported = writer.export_all(&snapshots)?;

    tracing::info!(
        "Exported {} workbooks ({} skipped) to {} in {}ms",
        exported.written.len(),
        exported.skipped,
        writer.output_dir().display(),
        (Utc::now() - started).num_milliseconds()
    );

    Ok(RunSummary {
        written: exported.written,
        skipped: exported.skipped,
        collisions: merged.collisions,
        unmerged: merged.skipped,
    })
}
