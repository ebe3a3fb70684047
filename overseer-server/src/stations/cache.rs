//! Disk snapshot of the station registry.
//!
//! The snapshot is a JSON array of stations in ascending id order. Saving
//! merges with what is already on disk, so stations missing from one
//! roster fetch are never dropped from the snapshot.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::{Station, StationId};

use super::error::StationError;

/// Distinguishes temp files of concurrent saves within one process.
static SAVE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Disk snapshot of station data.
#[derive(Debug, Clone)]
pub struct StationCache {
    path: PathBuf,
}

impl StationCache {
    /// Create a snapshot cache at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stations on disk.
    ///
    /// A missing file is an empty snapshot; anything else that goes wrong
    /// is a cache error.
    pub fn load(&self) -> Result<Vec<Station>, StationError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StationError::cache(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        serde_json::from_str(&contents).map_err(|e| {
            StationError::cache(format!("failed to parse {}: {e}", self.path.display()))
        })
    }

    /// Merge `stations` into the snapshot on disk and write it back.
    ///
    /// On an id collision the given station wins. Returns the number of
    /// stations in the written snapshot.
    pub fn save_merged<'a>(
        &self,
        stations: impl IntoIterator<Item = &'a Station>,
    ) -> Result<usize, StationError> {
        let mut merged: BTreeMap<StationId, Station> =
            self.load()?.into_iter().map(|s| (s.id, s)).collect();
        for station in stations {
            merged.insert(station.id, station.clone());
        }

        let snapshot: Vec<&Station> = merged.values().collect();
        self.write(&snapshot)?;

        Ok(snapshot.len())
    }

    /// Replace the snapshot wholesale.
    ///
    /// Writes a sibling temp file and renames it into place, so readers
    /// never see a half-written snapshot. Creates parent directories if
    /// they don't exist.
    fn write(&self, stations: &[&Station]) -> Result<(), StationError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StationError::cache(format!("failed to create cache directory: {e}"))
            })?;
        }

        let json = serde_json::to_string(stations)
            .map_err(|e| StationError::cache(format!("failed to serialize cache: {e}")))?;

        let tmp = self.temp_path();
        std::fs::write(&tmp, json)
            .map_err(|e| StationError::cache(format!("failed to write cache file: {e}")))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            StationError::cache(format!("failed to replace cache file: {e}"))
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "stations.json".into());
        let n = SAVE_COUNTER.fetch_add(1, Ordering::Relaxed);
        name.push(format!(".{}.{n}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}
