//! Recompute-on-read facade publishing each snapshot

use crate::aggregator::StatsAggregator;
use crate::snapshot::StatisticsSnapshot;
use crate::snapshot_cache::{SnapshotCache, SnapshotStore};
use crate::source::DatasetSource;
use gymstats_common::{Result, Timestamp};
use std::sync::Arc;
use tracing::{info, instrument};

/// Computes a fresh snapshot on every request and publishes it
pub struct StatsReporter<S> {
    source: S,
    aggregator: StatsAggregator,
    cache: Arc<SnapshotCache>,
    store: Option<SnapshotStore>,
}

impl<S: DatasetSource> StatsReporter<S> {
    /// Reporter with its own empty cache and no store
    pub fn new(source: S, aggregator: StatsAggregator) -> Self {
        Self {
            source,
            aggregator,
            cache: Arc::new(SnapshotCache::new()),
            store: None,
        }
    }

    /// Publish into a shared cache
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<SnapshotCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Also persist every snapshot
    #[must_use]
    pub fn with_store(mut self, store: SnapshotStore) -> Self {
        self.store = Some(store);
        self
    }

    /// The cache snapshots are published to
    pub fn cache(&self) -> Arc<SnapshotCache> {
        Arc::clone(&self.cache)
    }

    /// Compute the statistics for `now`, persist them if a store is set and
    /// publish them to the cache.
    ///
    /// Nothing is published when computing or persisting fails.
    #[instrument(skip(self))]
    pub fn report(&self, now: Timestamp) -> Result<Arc<StatisticsSnapshot>> {
        let dataset = self.source.fetch()?;
        let snapshot = self.aggregator.compute(&dataset, now)?;
        if let Some(store) = &self.store {
            store.save(&snapshot)?;
        }
        let published = self.cache.store(snapshot);
        info!(persisted = self.store.is_some(), "Published statistics snapshot");
        Ok(published)
    }
}

impl<S> std::fmt::Debug for StatsReporter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsReporter")
            .field("aggregator", &self.aggregator)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
