//! Snapshot sources
//!
//! The engine consumes snapshots through the `SnapshotSource` trait;
//! parsing registry extracts into snapshots is an external concern. The
//! JSON directory source included here reads one snapshot per file and
//! is what the bundled binary uses.

use crate::error::{ResolverError, Result};
use crate::models::{ProductId, Snapshot, SnapshotDate, SnapshotEntry};
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Supplier of an ordered, finite sequence of immutable snapshots
pub trait SnapshotSource {
    /// Short name of the source, for log lines
    fn source_name(&self) -> &'static str;

    /// Load all snapshots, sorted by strictly increasing date
    fn load(&self) -> Result<Vec<Snapshot>>;
}

/// Verify that snapshot dates are strictly increasing
pub fn validate_chronology(snapshots: &[Snapshot]) -> Result<()> {
    for pair in snapshots.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(ResolverError::SnapshotOrder {
                previous: pair[0].date.date(),
                current: pair[1].date.date(),
            });
        }
    }
    Ok(())
}

#[derive(Deserialize)]
struct RawSnapshot {
    date: SnapshotDate,
    entries: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawEntry {
    product_id: String,
    text: String,
    #[serde(default)]
    dossier: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    substance: Option<String>,
}

/// Directory of `*.json` snapshot files, one snapshot per file
#[derive(Debug, Clone)]
pub struct JsonSnapshotSource {
    dir: PathBuf,
}

impl JsonSnapshotSource {
    /// Create a source reading from the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read_file(&self, path: &Path) -> Result<Snapshot> {
        let data = fs::read_to_string(path)?;
        let raw: RawSnapshot =
            serde_json::from_str(&data).map_err(|source| ResolverError::SnapshotDecode {
                path: path.to_path_buf(),
                source,
            })?;

        // Malformed entries are a parse anomaly: warn and continue, never abort.
        let mut entries = Vec::with_capacity(raw.entries.len());
        for (i, value) in raw.entries.into_iter().enumerate() {
            match serde_json::from_value::<RawEntry>(value) {
                Ok(e) => entries.push(SnapshotEntry {
                    product_id: ProductId::new(e.product_id),
                    text: e.text,
                    dossier: e.dossier,
                    brand: e.brand,
                    substance: e.substance,
                }),
                Err(e) => {
                    warn!(
                        "Skipping malformed entry {} in {}: {}",
                        i,
                        path.display(),
                        e
                    );
                }
            }
        }

        Ok(Snapshot {
            date: raw.date,
            entries,
        })
    }
}

impl SnapshotSource for JsonSnapshotSource {
    fn source_name(&self) -> &'static str {
        "json-dir"
    }

    fn load(&self) -> Result<Vec<Snapshot>> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let mut snapshots = Vec::with_capacity(files.len());
        for path in &files {
            snapshots.push(self.read_file(path)?);
        }
        snapshots.sort_by_key(|s| s.date);
        validate_chronology(&snapshots)?;
        Ok(snapshots)
    }
}
