//! Reads forecast JSON archives from an input directory.

use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};
use crate::models::Snapshot;
use crate::services::merge::{merge_files, MergeOutcome, SnapshotFile};

/// List `*.json` files in `dir`, sorted by file name. Other files are ignored.
///
/// The first entry becomes the merge base, so the order is made deterministic
/// instead of depending on how the filesystem enumerates the directory.
pub fn list_json_files(dir: &Path) -> AppResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(AppError::EmptyInput(dir.to_path_buf()));
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Parse one file as an array of snapshots. Any non-conforming element rejects the file.
pub fn read_snapshot_file(path: &Path) -> AppResult<Vec<Snapshot>> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| AppError::Validation {
        file: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load every JSON file in `dir` and merge them into one snapshot list.
pub fn load(dir: &Path) -> AppResult<MergeOutcome> {
    let files = list_json_files(dir)?;

    let mut parsed = Vec::with_capacity(files.len());
    for path in files {
        let snapshots = read_snapshot_file(&path)?;
        tracing::info!(
            "Loaded {} forecast snapshots from {}",
            snapshots.len(),
            path.display()
        );
        parsed.push(SnapshotFile { path, snapshots });
    }

    let mut parsed = parsed.into_iter();
    let base = parsed
        .next()
        .map(|f| f.snapshots)
        .ok_or_else(|| AppError::EmptyInput(dir.to_path_buf()))?;

    let outcome = merge_files(base, parsed.collect())?;

    if !outcome.collisions.is_empty() {
        tracing::warn!(
            "Some municipalities already exist in the masterlist, and were assigned a unique province-municipality name:\n{}",
            outcome.collisions.join("\n")
        );
    }

    tracing::info!("success: reading input JSON data");
    Ok(outcome)
}
