//! Thread-safe configuration caching with arc-swap for lock-free reads.

use crate::loader::ConfigError;
use crate::schema::Config;
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

/// Thread-safe configuration cache using arc-swap for lock-free reads.
#[derive(Debug)]
pub struct ConfigCache {
    config: ArcSwap<Config>,
}

impl ConfigCache {
    /// Validates `config` and caches it.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!(timezone = %config.reporting.timezone, "Configuration cached");
        Ok(Self {
            config: ArcSwap::from_pointee(config),
        })
    }

    /// Gets the current configuration.
    pub fn get(&self) -> Arc<Config> {
        self.config.load_full()
    }
}
