//! Configuration loading utilities

use crate::Config;
use gymstats_common::{LogFormat, StatsError};
use std::env;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};
use validator::Validate;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "GYMSTATS_CONFIG_PATH";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Offending variable
        var: String,
        /// Parse failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for StatsError {
    fn from(err: ConfigError) -> Self {
        Self::config_with_source("Failed to load configuration", err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        debug!("Read configuration from {}", path.as_ref().display());
        Self::load_str(&content, |key| env::var(key).ok())
    }

    /// Parse YAML, apply overrides from `lookup` and validate
    pub fn load_str<F>(content: &str, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Config = serde_yaml::from_str(content)?;
        Self::apply_overrides(&mut config, lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the environment and the default file locations
    pub fn load() -> Result<Config, StatsError> {
        let config = if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            Self::load_config(&config_path)?
        } else if Path::new("gymstats.yaml").exists() {
            Self::load_config("gymstats.yaml")?
        } else if Path::new("gymstats.yml").exists() {
            Self::load_config("gymstats.yml")?
        } else {
            info!("No configuration file found, using defaults");
            let mut config = Config::default();
            Self::apply_overrides(&mut config, |key| env::var(key).ok())?;
            config.validate().map_err(ConfigError::ValidationError)?;
            config
        };

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config, StatsError> {
        Ok(Self::load_config(path)?)
    }

    /// Apply `GYMSTATS_*` overrides obtained through `lookup`
    pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Reporting overrides
        if let Some(timezone) = lookup("GYMSTATS_TIMEZONE") {
            config.reporting.timezone = timezone;
        }
        if let Some(limit) = parse_var(&lookup, "GYMSTATS_TOP_SPORTS_LIMIT")? {
            config.reporting.top_sports_limit = limit;
        }
        if let Some(limit) = parse_var(&lookup, "GYMSTATS_TOP_HOURS_LIMIT")? {
            config.reporting.top_hours_limit = limit;
        }
        if let Some(days) = parse_var(&lookup, "GYMSTATS_RETENTION_WINDOW_DAYS")? {
            config.reporting.retention_window_days = days;
        }
        if let Some(months) = parse_var(&lookup, "GYMSTATS_TREND_MONTHS")? {
            config.reporting.trend_months = months;
        }

        // Snapshot overrides
        if let Some(path) = lookup("GYMSTATS_SNAPSHOT_PATH") {
            config.snapshot.path = Some(path);
        }

        // Logging overrides
        if let Some(level) = lookup("GYMSTATS_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = lookup("GYMSTATS_LOG_FORMAT") {
            config.logging.format = parse_log_format(&format)?;
        }
        if let Some(file) = lookup("GYMSTATS_LOG_FILE") {
            config.logging.file = Some(file);
        }

        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(var)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::EnvParseError {
                var: var.to_string(),
                source: Box::new(e),
            })
        })
        .transpose()
}

fn parse_log_format(raw: &str) -> Result<LogFormat, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" => Ok(LogFormat::Pretty),
        "compact" => Ok(LogFormat::Compact),
        "json" => Ok(LogFormat::Json),
        other => Err(ConfigError::EnvParseError {
            var: "GYMSTATS_LOG_FORMAT".to_string(),
            source: format!("unknown log format '{other}'").into(),
        }),
    }
}
