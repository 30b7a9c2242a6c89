//! Test utilities and shared fixtures for the gymstats workspace.
//!
//! Enabled for other crates through the `testing` feature.

use crate::{AttendanceEvent, MemberId, MemberProfile, Sport, SubscriptionPeriod, Timestamp};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Test fixture for creating a mock timestamp.
pub fn mock_timestamp(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Timestamp {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .unwrap()
}

/// Test fixture for creating a calendar date.
pub fn mock_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Record builders for aggregator tests.
pub mod fixtures {
    use super::*;

    /// A completed visit lasting `minutes`.
    pub fn visit(member: u64, entry: Timestamp, minutes: i64) -> AttendanceEvent {
        AttendanceEvent::new(MemberId(member), entry, Some(entry + Duration::minutes(minutes)))
    }

    /// A visit without check-out.
    pub fn open_visit(member: u64, entry: Timestamp) -> AttendanceEvent {
        AttendanceEvent::new(MemberId(member), entry, None)
    }

    /// `count` one-hour visits starting at `entry`, one per member.
    pub fn visits_at(entry: Timestamp, count: usize) -> Vec<AttendanceEvent> {
        (0..count as u64).map(|member| visit(member, entry, 60)).collect()
    }

    /// A subscription period.
    pub fn period(member: u64, start: Timestamp, end: Timestamp) -> SubscriptionPeriod {
        SubscriptionPeriod::new(MemberId(member), start, end)
    }

    /// A period covering `days` days starting at `start`.
    pub fn period_days(member: u64, start: Timestamp, days: i64) -> SubscriptionPeriod {
        period(member, start, start + Duration::days(days))
    }

    /// A member practicing `sport`.
    pub fn member_with_sport(member: u64, sport_id: u64, sport: &str) -> MemberProfile {
        MemberProfile::new(MemberId(member)).with_sport(Sport::new(sport_id, sport))
    }

    /// A member born on `birth_date`.
    pub fn member_born(member: u64, birth_date: NaiveDate) -> MemberProfile {
        MemberProfile::new(MemberId(member)).with_birth_date(birth_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_init_logging_multiple_calls() {
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_mock_timestamp() {
        let timestamp = mock_timestamp(2024, 1, 1, 12, 0, 0);
        assert_eq!(timestamp.year(), 2024);
        assert_eq!(timestamp.month(), 1);
        assert_eq!(timestamp.day(), 1);
        assert_eq!(timestamp.hour(), 12);
    }

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.0001, 0.001);
        assert_approx_eq(1.0, 0.9999, 0.001);
    }

    #[test]
    #[should_panic]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq(1.0, 1.1, 0.05);
    }

    #[test]
    fn test_fixtures() {
        let entry = mock_timestamp(2024, 3, 4, 18, 0, 0);
        let event = fixtures::visit(1, entry, 90);
        assert_eq!(event.exit_time().unwrap(), Some(mock_timestamp(2024, 3, 4, 19, 30, 0)));
        assert_eq!(fixtures::visits_at(entry, 3).len(), 3);

        let period = fixtures::period_days(1, entry, 30);
        assert_eq!(period.interval().unwrap().1, mock_timestamp(2024, 4, 3, 18, 0, 0));
    }
}
