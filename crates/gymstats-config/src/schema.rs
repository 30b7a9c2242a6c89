//! Configuration schema definitions using serde with validation attributes.

use chrono_tz::Tz;
use gymstats_common::{LogFormat, LoggingConfig, StatsError};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Main configuration structure for gymstats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// Reporting calendar and statistic parameters.
    #[validate(nested)]
    pub reporting: ReportingConfig,
    /// Persistence of the latest snapshot.
    #[validate(nested)]
    pub snapshot: SnapshotConfig,
    /// Logging configuration.
    #[validate(nested)]
    pub logging: LoggingSettings,
}

/// Reporting calendar and statistic parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReportingConfig {
    /// IANA timezone that defines calendar days, hours and weekdays.
    #[validate(custom(function = "crate::validation::validate_timezone"))]
    pub timezone: String,
    /// Number of sports in the popularity ranking.
    #[validate(range(min = 1, max = 50, message = "Top sports limit must be between 1 and 50"))]
    pub top_sports_limit: usize,
    /// Number of hour bands in the busiest-hours ranking.
    #[validate(range(min = 1, max = 24, message = "Top hours limit must be between 1 and 24"))]
    pub top_hours_limit: usize,
    /// Trailing window, in days, of the retention comparison.
    #[validate(range(
        min = 1,
        max = 3650,
        message = "Retention window must be between 1 and 3650 days"
    ))]
    pub retention_window_days: u32,
    /// Number of months covered by the membership trend.
    #[validate(range(min = 1, max = 120, message = "Trend months must be between 1 and 120"))]
    pub trend_months: u32,
}

impl ReportingConfig {
    /// Parsed reporting timezone.
    pub fn tz(&self) -> Result<Tz, StatsError> {
        self.timezone.parse::<Tz>().map_err(|e| {
            StatsError::validation_field(
                format!("Unknown timezone '{}': {e}", self.timezone),
                "reporting.timezone",
            )
        })
    }
}

/// Persistence of the latest snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SnapshotConfig {
    /// JSON file overwritten with every computed snapshot.
    #[validate(custom(function = "crate::validation::validate_file_path"))]
    pub path: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level filter, a level name or `target=level` directives.
    #[validate(custom(function = "crate::validation::validate_log_level"))]
    pub level: String,
    /// Line format.
    pub format: LogFormat,
    /// Optional log file; stderr when absent.
    #[validate(custom(function = "crate::validation::validate_file_path"))]
    pub file: Option<String>,
    /// Whether span open/close events are logged.
    pub include_spans: bool,
}

impl LoggingSettings {
    /// Settings for [`gymstats_common::init_logging`].
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            format: self.format,
            file_path: self.file.clone(),
            include_spans: self.include_spans,
            ..LoggingConfig::default()
        }
    }
}
