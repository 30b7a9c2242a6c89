//! Assembles every statistic into one snapshot

use crate::attendance::{
    attendance_by_weekday, attendance_change, average_daily_attendance, avg_hours_by_weekday,
    top_attendance_hours,
};
use crate::calendar::ReportingCalendar;
use crate::demographics::age_groups;
use crate::membership::{
    active_member_count, active_members, delta_active_members, new_members_by_day,
    prior_month_active_periods,
};
use crate::retention::{retention_delta, retention_rate};
use crate::snapshot::StatisticsSnapshot;
use crate::sports::top_sports;
use crate::trends::membership_trend;
use chrono::Duration;
use gymstats_common::{Dataset, Result, Timestamp};
use gymstats_config::ReportingConfig;
use tracing::{debug, info, instrument};

/// Limits and windows applied while computing a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationSettings {
    /// Sports kept in the ranking
    pub top_sports_limit: usize,
    /// Hour bands kept in the ranking
    pub top_hours_limit: usize,
    /// Window of the retention comparison
    pub retention_window: Duration,
    /// Months covered by the membership trend
    pub trend_months: u32,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            top_sports_limit: 3,
            top_hours_limit: 3,
            retention_window: Duration::days(180),
            trend_months: 7,
        }
    }
}

impl From<&ReportingConfig> for AggregationSettings {
    fn from(config: &ReportingConfig) -> Self {
        Self {
            top_sports_limit: config.top_sports_limit,
            top_hours_limit: config.top_hours_limit,
            retention_window: Duration::days(i64::from(config.retention_window_days)),
            trend_months: config.trend_months,
        }
    }
}

/// Computes statistics snapshots in a fixed reporting calendar.
///
/// The aggregator holds no state between calls and can be shared freely
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct StatsAggregator {
    calendar: ReportingCalendar,
    settings: AggregationSettings,
}

impl StatsAggregator {
    /// Create an aggregator
    pub const fn new(calendar: ReportingCalendar, settings: AggregationSettings) -> Self {
        Self { calendar, settings }
    }

    /// Create an aggregator from the `reporting` configuration section
    pub fn from_config(config: &ReportingConfig) -> Result<Self> {
        let calendar = ReportingCalendar::new(config.tz()?);
        Ok(Self::new(calendar, AggregationSettings::from(config)))
    }

    /// The reporting calendar
    pub const fn calendar(&self) -> &ReportingCalendar {
        &self.calendar
    }

    /// The applied limits and windows
    pub const fn settings(&self) -> &AggregationSettings {
        &self.settings
    }

    /// Computes every statistic for `now`.
    ///
    /// Fails with `InvalidInput` on the first malformed record; empty
    /// collections yield a zeroed snapshot.
    #[instrument(
        skip(self, dataset),
        fields(
            events = dataset.events.len(),
            subscriptions = dataset.subscriptions.len(),
            members = dataset.members.len(),
            timezone = self.calendar.timezone().name(),
        )
    )]
    pub fn compute(&self, dataset: &Dataset, now: Timestamp) -> Result<StatisticsSnapshot> {
        let calendar = &self.calendar;
        let settings = &self.settings;
        let Dataset { events, subscriptions, members } = dataset;

        let active_count = active_member_count(subscriptions, now)?;
        let prior = prior_month_active_periods(subscriptions, now, calendar)?;
        debug!(active_count, prior, "Computed active members");

        let new_members = new_members_by_day(members, now, calendar)?;

        let today = calendar.date_of(now);
        let avg_daily = average_daily_attendance(events, calendar)?;
        let attendance_delta = attendance_change(events, today, calendar)?;

        let retention = retention_rate(subscriptions, now)?;
        let retention_change =
            retention_delta(retention, subscriptions, now, settings.retention_window)?;

        let active = active_members(members, subscriptions, now)?;
        let sports = top_sports(&active, settings.top_sports_limit);
        let ages = age_groups(&active, today)?;

        let snapshot = StatisticsSnapshot {
            computed_at: now,
            timezone: calendar.timezone().name().to_string(),
            active_members: active_count,
            active_members_change_pct: delta_active_members(active_count, prior),
            new_members_today: new_members.today,
            new_members_change_pct: new_members.delta(),
            avg_daily_attendance: avg_daily,
            attendance_change_pct: attendance_delta,
            retention_rate_pct: retention,
            retention_change_pct: retention_change,
            top_sports: sports,
            top_attendance_hours: top_attendance_hours(events, calendar, settings.top_hours_limit)?,
            attendance_by_weekday: attendance_by_weekday(events, calendar)?,
            avg_hours_by_weekday: avg_hours_by_weekday(events, calendar)?,
            age_groups: ages,
            membership_trends: membership_trend(
                subscriptions,
                now,
                settings.trend_months,
                calendar,
            )?,
        };

        info!(
            active_members = snapshot.active_members,
            retention = snapshot.retention_rate_pct,
            "Computed statistics snapshot"
        );
        Ok(snapshot)
    }
}
