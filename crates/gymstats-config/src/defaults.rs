//! Default values of every configuration section.

use crate::schema::*;
use gymstats_common::LogFormat;

impl Default for Config {
    fn default() -> Self {
        Self {
            reporting: ReportingConfig::default(),
            snapshot: SnapshotConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            top_sports_limit: 3,
            top_hours_limit: 3,
            retention_window_days: 180,
            trend_months: 7,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
            include_spans: false,
        }
    }
}
