//! Custom validators referenced by the schema attributes

use chrono_tz::Tz;
use validator::ValidationError;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Validate an IANA timezone name
pub fn validate_timezone(timezone: &str) -> Result<(), ValidationError> {
    if timezone.is_empty() {
        return Err(ValidationError::new("empty_timezone"));
    }

    match timezone.parse::<Tz>() {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("unknown_timezone")),
    }
}

/// Validate a log filter: a level or comma-separated `target=level` directives
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    if level.trim().is_empty() {
        return Err(ValidationError::new("empty_log_level"));
    }

    let valid = level.split(',').all(|directive| {
        let level = directive
            .rsplit_once('=')
            .map_or(directive, |(_, level)| level)
            .trim()
            .to_ascii_lowercase();
        LOG_LEVELS.contains(&level.as_str())
    });

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

/// Validate file path (basic check for valid path characters)
pub fn validate_file_path(path: &str) -> Result<(), ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::new("empty_file_path"));
    }

    // Colon stays allowed for Windows drive letters
    let invalid_chars = ['<', '>', '"', '|', '?', '*'];
    if path.chars().any(|c| invalid_chars.contains(&c)) {
        return Err(ValidationError::new("invalid_file_path_characters"));
    }

    Ok(())
}
