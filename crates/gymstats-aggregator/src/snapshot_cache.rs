//! Holders for the latest computed snapshot.
//!
//! [`SnapshotCache`] keeps it in memory behind an atomic pointer swap;
//! [`SnapshotStore`] keeps it on disk as a single JSON file replaced by
//! rename. Both always expose a complete snapshot, the last one written.

use crate::snapshot::StatisticsSnapshot;
use arc_swap::ArcSwapOption;
use gymstats_common::{Result, StatsError};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// In-memory holder of the latest snapshot
#[derive(Debug, Default)]
pub struct SnapshotCache {
    latest: ArcSwapOption<StatisticsSnapshot>,
    updates: AtomicU64,
}

impl SnapshotCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached snapshot, returning the stored value
    pub fn store(&self, snapshot: StatisticsSnapshot) -> Arc<StatisticsSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.latest.store(Some(Arc::clone(&snapshot)));
        self.updates.fetch_add(1, Ordering::Relaxed);
        debug!(computed_at = %snapshot.computed_at, "Cached statistics snapshot");
        snapshot
    }

    /// The most recently stored snapshot, if any
    pub fn latest(&self) -> Option<Arc<StatisticsSnapshot>> {
        self.latest.load_full()
    }

    /// Number of snapshots stored so far
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }
}

/// Single-file persistence of the latest snapshot
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Store writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        self.path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    /// Overwrite the stored snapshot.
    ///
    /// The JSON is written to a temporary file next to the target and
    /// renamed over it, so readers see either the old or the new file.
    #[instrument(skip(self, snapshot), fields(path = %self.path.display()))]
    pub fn save(&self, snapshot: &StatisticsSnapshot) -> Result<()> {
        let directory = self.directory();
        std::fs::create_dir_all(directory)?;

        let mut file = NamedTempFile::new_in(directory)?;
        serde_json::to_writer_pretty(&mut file, snapshot)?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| StatsError::Io(e.error))?;

        info!("Saved statistics snapshot");
        Ok(())
    }

    /// Read the stored snapshot, `None` if nothing was saved yet
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Option<StatisticsSnapshot>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored snapshot");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }
}
