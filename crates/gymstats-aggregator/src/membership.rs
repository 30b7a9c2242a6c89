//! Active-member and new-member counts with their period-over-period deltas

use crate::calendar::ReportingCalendar;
use gymstats_common::{
    percent_change, whole_percent, MemberId, MemberProfile, Result, SubscriptionPeriod, Timestamp,
};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Members holding at least one period that contains `now`
pub fn active_member_ids(
    subscriptions: &[SubscriptionPeriod],
    now: Timestamp,
) -> Result<HashSet<MemberId>> {
    let mut active = HashSet::new();
    for period in subscriptions {
        if period.contains(now)? {
            active.insert(period.member_id);
        }
    }
    Ok(active)
}

/// Number of distinct members with a period containing `now`.
///
/// The end of a period is inclusive: a period ending exactly at `now` counts.
pub fn active_member_count(subscriptions: &[SubscriptionPeriod], now: Timestamp) -> Result<usize> {
    active_member_ids(subscriptions, now).map(|ids| ids.len())
}

/// Profiles of the members active at `now`, one per member, in input order
pub fn active_members<'a>(
    members: &'a [MemberProfile],
    subscriptions: &[SubscriptionPeriod],
    now: Timestamp,
) -> Result<Vec<&'a MemberProfile>> {
    let mut remaining = active_member_ids(subscriptions, now)?;
    Ok(members
        .iter()
        .filter(|profile| remaining.remove(&profile.member_id))
        .collect())
}

/// Number of periods (not members) containing `instant`
pub fn active_periods_at(
    subscriptions: &[SubscriptionPeriod],
    instant: Timestamp,
) -> Result<usize> {
    let mut count = 0;
    for period in subscriptions {
        if period.contains(instant)? {
            count += 1;
        }
    }
    Ok(count)
}

/// Periods active at local midnight of the first day of the month before `now`
pub fn prior_month_active_periods(
    subscriptions: &[SubscriptionPeriod],
    now: Timestamp,
    calendar: &ReportingCalendar,
) -> Result<usize> {
    active_periods_at(subscriptions, calendar.start_of_previous_month(now))
}

/// Month-over-month change of the active member count in whole percent
pub fn delta_active_members(current: usize, prior: usize) -> i64 {
    percent_change(current, prior)
}

/// Profiles created within `[window_start, window_end)`.
///
/// Profiles without a creation instant are never counted.
pub fn new_members_count(
    members: &[MemberProfile],
    window_start: Timestamp,
    window_end: Timestamp,
) -> Result<usize> {
    let mut count = 0;
    for profile in members {
        if let Some(created) = profile.created_time()? {
            if window_start <= created && created < window_end {
                count += 1;
            }
        }
    }
    Ok(count)
}

/// Members created on the local day of `now` and on the day before
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NewMemberCounts {
    /// Created today
    pub today: usize,
    /// Created yesterday
    pub yesterday: usize,
}

impl NewMemberCounts {
    /// Day-over-day change, see [`delta_new_members`]
    pub fn delta(&self) -> i64 {
        delta_new_members(self.today, self.yesterday)
    }
}

/// Counts new members for today and yesterday in the reporting calendar
#[instrument(skip(members, calendar), fields(members = members.len()))]
pub fn new_members_by_day(
    members: &[MemberProfile],
    now: Timestamp,
    calendar: &ReportingCalendar,
) -> Result<NewMemberCounts> {
    let today = calendar.date_of(now);
    let today_start = calendar.start_of_day(today);
    let tomorrow_start = calendar.start_of_next_day(today);
    let yesterday_start = today
        .pred_opt()
        .map_or(today_start, |day| calendar.start_of_day(day));

    let counts = NewMemberCounts {
        today: new_members_count(members, today_start, tomorrow_start)?,
        yesterday: new_members_count(members, yesterday_start, today_start)?,
    };
    debug!(today = counts.today, yesterday = counts.yesterday, "Counted new members");
    Ok(counts)
}

/// Day-over-day change of new members: `round(100 * today / max(yesterday, 1))`
pub fn delta_new_members(today: usize, yesterday: usize) -> i64 {
    whole_percent(today, yesterday.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymstats_common::test_utils::fixtures::period;
    use gymstats_common::test_utils::mock_timestamp;
    use gymstats_common::{MemberId, StatsError};

    fn now() -> Timestamp {
        mock_timestamp(2024, 3, 15, 12, 0, 0)
    }

    #[test]
    fn test_active_member_count_distinct_members() {
        let subs = vec![
            period(1, mock_timestamp(2024, 3, 1, 0, 0, 0), mock_timestamp(2024, 4, 1, 0, 0, 0)),
            period(1, mock_timestamp(2024, 3, 10, 0, 0, 0), mock_timestamp(2024, 5, 1, 0, 0, 0)),
            period(2, mock_timestamp(2024, 2, 1, 0, 0, 0), mock_timestamp(2024, 3, 1, 0, 0, 0)),
            period(3, mock_timestamp(2024, 3, 16, 0, 0, 0), mock_timestamp(2024, 4, 16, 0, 0, 0)),
        ];
        assert_eq!(active_member_count(&subs, now()).unwrap(), 1);
    }

    #[test]
    fn test_period_ending_now_is_active() {
        let subs = vec![period(7, mock_timestamp(2024, 3, 1, 0, 0, 0), now())];
        assert_eq!(active_member_count(&subs, now()).unwrap(), 1);
    }

    #[test]
    fn test_malformed_period_is_rejected() {
        let mut broken = period(9, now(), now());
        broken.start_timestamp = None;
        let err = active_member_count(&[broken], now()).unwrap_err();
        assert!(matches!(err, StatsError::InvalidInput { member_id: MemberId(9), .. }));
    }

    #[test]
    fn test_active_members_one_profile_per_member() {
        let subs = vec![
            period(1, mock_timestamp(2024, 3, 1, 0, 0, 0), mock_timestamp(2024, 4, 1, 0, 0, 0)),
            period(1, mock_timestamp(2024, 3, 2, 0, 0, 0), mock_timestamp(2024, 4, 2, 0, 0, 0)),
        ];
        let members = vec![
            MemberProfile::new(MemberId(1)),
            MemberProfile::new(MemberId(2)),
            MemberProfile::new(MemberId(1)),
        ];
        let active = active_members(&members, &subs, now()).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].member_id, MemberId(1));
    }

    #[test]
    fn test_prior_month_active_periods_counts_periods() {
        let calendar = ReportingCalendar::utc();
        let subs = vec![
            period(1, mock_timestamp(2024, 1, 15, 0, 0, 0), mock_timestamp(2024, 2, 15, 0, 0, 0)),
            period(1, mock_timestamp(2024, 1, 20, 0, 0, 0), mock_timestamp(2024, 2, 20, 0, 0, 0)),
            // starts after Feb 1st
            period(2, mock_timestamp(2024, 2, 2, 0, 0, 0), mock_timestamp(2024, 3, 2, 0, 0, 0)),
        ];
        assert_eq!(prior_month_active_periods(&subs, now(), &calendar).unwrap(), 2);
    }

    #[test]
    fn test_delta_active_members() {
        assert_eq!(delta_active_members(12, 10), 20);
        assert_eq!(delta_active_members(5, 10), -50);
        assert_eq!(delta_active_members(3, 0), 100);
        assert_eq!(delta_active_members(0, 0), 0);
    }

    #[test]
    fn test_new_members_by_day() {
        let calendar = ReportingCalendar::utc();
        let members = vec![
            MemberProfile::new(MemberId(1)).with_created_at(mock_timestamp(2024, 3, 15, 0, 0, 0)),
            MemberProfile::new(MemberId(2))
                .with_created_at(mock_timestamp(2024, 3, 15, 23, 59, 59)),
            MemberProfile::new(MemberId(3)).with_created_at(mock_timestamp(2024, 3, 14, 8, 0, 0)),
            MemberProfile::new(MemberId(4)).with_created_at(mock_timestamp(2024, 3, 16, 0, 0, 0)),
            MemberProfile::new(MemberId(5)),
        ];
        let counts = new_members_by_day(&members, now(), &calendar).unwrap();
        assert_eq!(counts, NewMemberCounts { today: 2, yesterday: 1 });
        assert_eq!(counts.delta(), 200);
    }

    #[test]
    fn test_new_members_in_local_day() {
        let calendar = ReportingCalendar::from_name("Asia/Tehran").unwrap();
        // 21:00 UTC on the 14th is already the 15th in Tehran
        let members = vec![
            MemberProfile::new(MemberId(1)).with_created_at(mock_timestamp(2024, 3, 14, 21, 0, 0)),
        ];
        let counts = new_members_by_day(&members, now(), &calendar).unwrap();
        assert_eq!(counts.today, 1);
        assert_eq!(counts.yesterday, 0);
    }

    #[test]
    fn test_delta_new_members() {
        assert_eq!(delta_new_members(5, 0), 500);
        assert_eq!(delta_new_members(0, 0), 0);
        assert_eq!(delta_new_members(3, 2), 150);
        assert_eq!(delta_new_members(1, 3), 33);
    }
}
