//! Folds per-province forecast files into a single snapshot list.
//!
//! Every input file covers the same forecast runs for a different province.
//! The first file is the merge base; each subsequent file must carry the same
//! number of snapshots, and each of its snapshots is matched to a base snapshot
//! by `date_created_str`. Municipality entries are appended to the matched base
//! snapshot. A municipality name already present in the base gets the incoming
//! entry's province appended (`"<name>-<province>"`) and is reported as a
//! collision.

use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::errors::{AppError, AppResult};
use crate::models::Snapshot;

/// One parsed input file.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    pub path: PathBuf,
    pub snapshots: Vec<Snapshot>,
}

/// An incoming snapshot whose municipality map was null, so nothing was merged from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSnapshot {
    pub path: PathBuf,
    pub date_created_str: String,
}

/// Result of folding all files into the merge base.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub snapshots: Vec<Snapshot>,
    /// Disambiguated municipality keys, deduplicated, in first-seen order.
    pub collisions: Vec<String>,
    pub skipped: Vec<SkippedSnapshot>,
}

struct Accumulator {
    snapshots: Vec<Snapshot>,
    /// `date_created_str` → position in `snapshots`. First occurrence wins.
    index: HashMap<String, usize>,
    collisions: Vec<String>,
    skipped: Vec<SkippedSnapshot>,
}

impl Accumulator {
    fn new(base: Vec<Snapshot>) -> Self {
        let mut index = HashMap::with_capacity(base.len());
        for (i, snapshot) in base.iter().enumerate() {
            index.entry(snapshot.date_created_str.clone()).or_insert(i);
        }

        Self {
            snapshots: base,
            index,
            collisions: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn merge_file(mut self, file: SnapshotFile) -> AppResult<Self> {
        if file.snapshots.len() != self.snapshots.len() {
            return Err(AppError::Structural(format!(
                "Inconsistent data length on {}",
                file.path.display()
            )));
        }

        for incoming in file.snapshots {
            let position = *self.index.get(&incoming.date_created_str).ok_or_else(|| {
                AppError::Structural(format!(
                    "Error finding data entry for {}",
                    incoming.date_created_str
                ))
            })?;

            let Some(entries) = incoming.municipalities else {
                tracing::warn!(
                    "No municipality data for {} in {}, skipping",
                    incoming.date_created_str,
                    file.path.display()
                );
                self.skipped.push(SkippedSnapshot {
                    path: file.path.clone(),
                    date_created_str: incoming.date_created_str,
                });
                continue;
            };

            let target = self.snapshots[position]
                .municipalities
                .get_or_insert_with(IndexMap::new);

            for (name, days) in entries {
                let key = if target.contains_key(&name) {
                    let province = days.first().map(|d| d.province.as_str()).ok_or_else(|| {
                        AppError::Structural(format!(
                            "Municipality {} in {} has no day records",
                            name,
                            file.path.display()
                        ))
                    })?;
                    let key = disambiguated_key(&name, province);
                    if !self.collisions.contains(&key) {
                        self.collisions.push(key.clone());
                    }
                    key
                } else {
                    name
                };

                target.insert(key, days);
            }
        }

        Ok(self)
    }

    fn finish(self) -> MergeOutcome {
        MergeOutcome {
            snapshots: self.snapshots,
            collisions: self.collisions,
            skipped: self.skipped,
        }
    }
}

/// Unique key for a municipality name that already exists in another province.
pub fn disambiguated_key(municipality: &str, province: &str) -> String {
    format!("{}-{}", municipality, province).trim().to_string()
}

/// Fold `others` into `base`, in order.
pub fn merge_files(base: Vec<Snapshot>, others: Vec<SnapshotFile>) -> AppResult<MergeOutcome> {
    others
        .into_iter()
        .try_fold(Accumulator::new(base), Accumulator::merge_file)
        .map(Accumulator::finish)
}
