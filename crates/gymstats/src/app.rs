//! Loads the dataset, computes the snapshot and publishes it.

use crate::error::{AppError, AppResult};
use gymstats_aggregator::{
    SnapshotCache, SnapshotStore, StatisticsSnapshot, StatsAggregator, StatsReporter,
};
use gymstats_common::{Dataset, StatsError, Timestamp};
use gymstats_config::{Config, ConfigCache};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Environment variable naming the dataset when no path argument is given.
pub const DATASET_ENV: &str = "GYMSTATS_DATASET";

/// Picks the dataset path from the first argument, then the environment.
pub fn resolve_dataset_path(
    arg: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> AppResult<PathBuf> {
    arg.or_else(|| lookup(DATASET_ENV))
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
        .ok_or(AppError::MissingDataset)
}

/// Reads a JSON dataset.
#[instrument]
pub async fn load_dataset(path: &Path) -> AppResult<Dataset> {
    let bytes = tokio::fs::read(path).await.map_err(|source| AppError::DatasetRead {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset: Dataset =
        serde_json::from_slice(&bytes).map_err(|source| AppError::DatasetParse {
            path: path.to_path_buf(),
            source,
        })?;
    if dataset.is_empty() {
        warn!(path = %path.display(), "Dataset has no records");
    }
    info!(
        events = dataset.events.len(),
        subscriptions = dataset.subscriptions.len(),
        members = dataset.members.len(),
        "Loaded dataset"
    );
    Ok(dataset)
}

/// One statistics run with a fixed configuration.
#[derive(Debug)]
pub struct GymStats {
    config: ConfigCache,
    cache: Arc<SnapshotCache>,
}

impl GymStats {
    /// Creates an application instance, rejecting an invalid configuration.
    pub fn new(config: Config) -> AppResult<Self> {
        let config = ConfigCache::new(config).map_err(StatsError::from)?;
        Ok(Self {
            config,
            cache: Arc::new(SnapshotCache::new()),
        })
    }

    /// Cache holding the latest published snapshot.
    pub fn cache(&self) -> Arc<SnapshotCache> {
        Arc::clone(&self.cache)
    }

    /// Computes and publishes the snapshot for `now`.
    ///
    /// The computation runs on the blocking pool.
    #[instrument(skip(self, dataset))]
    pub async fn run(
        &self,
        dataset: Dataset,
        now: Timestamp,
    ) -> AppResult<Arc<StatisticsSnapshot>> {
        let config = self.config.get();
        let aggregator = StatsAggregator::from_config(&config.reporting)?;
        let mut reporter = StatsReporter::new(dataset, aggregator).with_cache(self.cache());
        if let Some(path) = config.snapshot.path.as_deref() {
            reporter = reporter.with_store(SnapshotStore::new(path));
        }

        let snapshot = tokio::task::spawn_blocking(move || reporter.report(now)).await??;
        info!(computed_at = %snapshot.computed_at, "Statistics ready");
        Ok(snapshot)
    }
}
