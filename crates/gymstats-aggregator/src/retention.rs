//! Retention: how many expired subscriptions were followed by a renewal

use chrono::{DateTime, Duration, Utc};
use gymstats_common::{whole_percent, MemberId, Result, SubscriptionPeriod, Timestamp};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Expired periods and how many of them were renewed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenewalTally {
    /// Periods considered expired
    pub expired: usize,
    /// Expired periods whose member started another period after the end
    pub renewed: usize,
}

impl RenewalTally {
    /// Renewed share in whole percent, 0 when nothing expired
    pub fn rate(&self) -> i64 {
        whole_percent(self.renewed, self.expired)
    }
}

/// Tallies renewals of the periods whose end satisfies `expired`.
///
/// Renewals are searched across all periods of the member.
fn tally_renewals<F>(subscriptions: &[SubscriptionPeriod], expired: F) -> Result<RenewalTally>
where
    F: Fn(Timestamp) -> bool,
{
    let mut intervals = Vec::with_capacity(subscriptions.len());
    let mut latest_start: HashMap<MemberId, Timestamp> = HashMap::new();
    for period in subscriptions {
        let (start, end) = period.interval()?;
        latest_start
            .entry(period.member_id)
            .and_modify(|latest| *latest = (*latest).max(start))
            .or_insert(start);
        intervals.push((period.member_id, end));
    }

    let mut tally = RenewalTally::default();
    for (member_id, end) in intervals.into_iter().filter(|(_, end)| expired(*end)) {
        tally.expired += 1;
        if latest_start.get(&member_id).is_some_and(|start| *start > end) {
            tally.renewed += 1;
        }
    }
    Ok(tally)
}

/// Share of periods that ended before `now` whose member started another
/// period strictly after that end, in whole percent.
#[instrument(skip(subscriptions), fields(subscriptions = subscriptions.len()))]
pub fn retention_rate(subscriptions: &[SubscriptionPeriod], now: Timestamp) -> Result<i64> {
    let tally = tally_renewals(subscriptions, |end| end < now)?;
    debug!(expired = tally.expired, renewed = tally.renewed, "Computed retention rate");
    Ok(tally.rate())
}

/// Retention rate minus the rate over periods that ended within `window`
/// before `now`. The windowed rate is 0 when nothing expired in the window.
#[instrument(skip(subscriptions), fields(subscriptions = subscriptions.len()))]
pub fn retention_delta(
    current_rate: i64,
    subscriptions: &[SubscriptionPeriod],
    now: Timestamp,
    window: Duration,
) -> Result<i64> {
    let window_start = now.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC);
    let tally = tally_renewals(subscriptions, |end| window_start <= end && end < now)?;
    debug!(expired = tally.expired, renewed = tally.renewed, "Computed windowed retention rate");
    Ok(current_rate - tally.rate())
}
