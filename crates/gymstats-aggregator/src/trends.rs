//! Day-by-day membership series grouped by month

use crate::calendar::ReportingCalendar;
use chrono::{Datelike, Months, NaiveDate};
use gymstats_common::{Result, SubscriptionPeriod, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Active subscription periods for each day of one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    /// Calendar year
    pub year: i32,
    /// Calendar month (1-12)
    pub month: u32,
    /// Day of month to number of periods covering it, days with no period omitted
    pub days: BTreeMap<u32, usize>,
}

impl MonthlyTrend {
    /// Month key in `YYYY-MM` form
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Number of periods covering each local day from `months` months before
/// `now` through the day of `now`, grouped by month in ascending order.
///
/// A period covers every local date from its start date to its end date
/// inclusive. Days without any period are left out.
#[instrument(skip(subscriptions, calendar), fields(subscriptions = subscriptions.len()))]
pub fn membership_trend(
    subscriptions: &[SubscriptionPeriod],
    now: Timestamp,
    months: u32,
    calendar: &ReportingCalendar,
) -> Result<Vec<MonthlyTrend>> {
    let last_day = calendar.date_of(now);
    let first_day = last_day
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN);

    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for period in subscriptions {
        let (start, end) = period.interval()?;
        let from = calendar.date_of(start).max(first_day);
        let to = calendar.date_of(end).min(last_day);
        for day in from.iter_days().take_while(|day| *day <= to) {
            *per_day.entry(day).or_insert(0) += 1;
        }
    }

    let mut trends: Vec<MonthlyTrend> = Vec::new();
    for (day, count) in per_day {
        match trends.last_mut() {
            Some(trend) if trend.year == day.year() && trend.month == day.month() => {
                trend.days.insert(day.day(), count);
            }
            _ => trends.push(MonthlyTrend {
                year: day.year(),
                month: day.month(),
                days: BTreeMap::from([(day.day(), count)]),
            }),
        }
    }

    debug!(months = trends.len(), "Built membership trend");
    Ok(trends)
}
