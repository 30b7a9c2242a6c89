//! The statistics snapshot returned to dashboard readers

use crate::attendance::{HourBandAverage, WeekdayAverage};
use crate::demographics::AgeGroups;
use crate::sports::SportShare;
use crate::trends::MonthlyTrend;
use gymstats_common::Timestamp;
use serde::{Deserialize, Serialize};

/// All club statistics computed for one reference instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    /// Reference instant the statistics were computed for
    pub computed_at: Timestamp,
    /// IANA name of the reporting timezone
    pub timezone: String,
    /// Distinct members with an active subscription
    pub active_members: usize,
    /// Change against the periods active at the start of last month, whole percent
    pub active_members_change_pct: i64,
    /// Members created today
    pub new_members_today: usize,
    /// Today's new members relative to yesterday's, whole percent
    pub new_members_change_pct: i64,
    /// Mean entries per day over days with visits
    pub avg_daily_attendance: f64,
    /// Today's entries against yesterday's, whole percent
    pub attendance_change_pct: i64,
    /// Renewed share of expired subscriptions, whole percent
    pub retention_rate_pct: i64,
    /// Retention rate minus the rate within the retention window
    pub retention_change_pct: i64,
    /// Most practiced sports among active members
    pub top_sports: Vec<SportShare>,
    /// Busiest hour bands
    pub top_attendance_hours: Vec<HourBandAverage>,
    /// Mean entries per day for each weekday, Monday first
    pub attendance_by_weekday: Vec<WeekdayAverage>,
    /// Mean visit length in hours for each weekday, Monday first
    pub avg_hours_by_weekday: Vec<WeekdayAverage>,
    /// Active members per age group
    pub age_groups: AgeGroups,
    /// Daily active periods, grouped by month
    pub membership_trends: Vec<MonthlyTrend>,
}

impl StatisticsSnapshot {
    /// Snapshot with every statistic at its zero value
    pub fn empty(computed_at: Timestamp, timezone: impl Into<String>) -> Self {
        Self {
            computed_at,
            timezone: timezone.into(),
            active_members: 0,
            active_members_change_pct: 0,
            new_members_today: 0,
            new_members_change_pct: 0,
            avg_daily_attendance: 0.0,
            attendance_change_pct: 0,
            retention_rate_pct: 0,
            retention_change_pct: 0,
            top_sports: Vec::new(),
            top_attendance_hours: Vec::new(),
            attendance_by_weekday: Vec::new(),
            avg_hours_by_weekday: Vec::new(),
            age_groups: AgeGroups::default(),
            membership_trends: Vec::new(),
        }
    }

    /// Serializes the snapshot as pretty-printed JSON
    pub fn to_json_pretty(&self) -> gymstats_common::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymstats_common::test_utils::mock_timestamp;

    #[test]
    fn test_empty_snapshot_json_shape() {
        let snapshot = StatisticsSnapshot::empty(mock_timestamp(2024, 3, 15, 12, 0, 0), "UTC");
        let json: serde_json::Value =
            serde_json::from_str(&snapshot.to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["timezone"], "UTC");
        assert_eq!(json["active_members"], 0);
        assert_eq!(json["age_groups"]["18_to_25"], 0);
        assert!(json["top_sports"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let mut snapshot =
            StatisticsSnapshot::empty(mock_timestamp(2024, 3, 15, 12, 0, 0), "Asia/Tehran");
        snapshot.attendance_by_weekday.push(WeekdayAverage {
            weekday: chrono::Weekday::Mon,
            value: 4.0,
        });
        snapshot.membership_trends.push(MonthlyTrend {
            year: 2024,
            month: 3,
            days: [(1, 2), (2, 3)].into_iter().collect(),
        });
        let json = snapshot.to_json_pretty().unwrap();
        let back: StatisticsSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
