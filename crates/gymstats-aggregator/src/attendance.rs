//! Attendance statistics: daily averages, hourly bands and weekday profiles

use crate::calendar::ReportingCalendar;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use gymstats_common::{
    mean_of_counts, percent_change, round2, AttendanceEvent, RecordKind, Result, StatsError,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

const HOURS_PER_DAY: u32 = 24;

/// Average attendance in one local hour band `[start_hour, start_hour + 1)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourBandAverage {
    /// Band label, e.g. `"18-19"` or `"23-0"`
    pub hour_range: String,
    /// Local hour the band starts at (0-23)
    pub start_hour: u32,
    /// Average visits per day on days the band saw any visit
    pub avg_count: f64,
    /// Visits counted in the band over all days
    pub total_count: usize,
    /// Mean length in hours of the completed visits touching the band,
    /// 0.0 when every such visit is still open
    pub avg_hours: f64,
}

impl HourBandAverage {
    /// Label of the band starting at `start_hour`
    pub fn label(start_hour: u32) -> String {
        format!("{}-{}", start_hour, (start_hour + 1) % HOURS_PER_DAY)
    }
}

/// Average of a per-day statistic for one weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayAverage {
    /// Local weekday
    pub weekday: Weekday,
    /// Average value, rounded to two decimals
    pub value: f64,
}

impl WeekdayAverage {
    /// English name of the weekday, e.g. `"Monday"`
    pub const fn weekday_name(&self) -> &'static str {
        match self.weekday {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }
}

/// Entries per local calendar day, for days with at least one entry
pub fn daily_entry_counts(
    events: &[AttendanceEvent],
    calendar: &ReportingCalendar,
) -> Result<BTreeMap<NaiveDate, usize>> {
    let mut counts = BTreeMap::new();
    for event in events {
        let day = calendar.date_of(event.entry_time()?);
        *counts.entry(day).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Mean entries per day over days with at least one entry, 0.0 without events
#[instrument(skip(events, calendar), fields(events = events.len()))]
pub fn average_daily_attendance(
    events: &[AttendanceEvent],
    calendar: &ReportingCalendar,
) -> Result<f64> {
    let counts = daily_entry_counts(events, calendar)?;
    let average = mean_of_counts(counts.values().copied());
    debug!(days = counts.len(), average, "Computed average daily attendance");
    Ok(average)
}

/// Change of the entries on `today` against the day before, in whole percent
pub fn attendance_change(
    events: &[AttendanceEvent],
    today: NaiveDate,
    calendar: &ReportingCalendar,
) -> Result<i64> {
    let counts = daily_entry_counts(events, calendar)?;
    let on = |day: Option<NaiveDate>| day.and_then(|d| counts.get(&d)).copied().unwrap_or(0);
    Ok(percent_change(on(Some(today)), on(today.pred_opt())))
}

/// Per-band accumulator for [`top_attendance_hours`]
#[derive(Default)]
struct BandTally {
    per_day: HashMap<NaiveDate, usize>,
    completed_visits: usize,
    completed_seconds: i64,
}

/// Top `limit` hour bands by average daily attendance.
///
/// A visit counts once in every band from its entry hour through its exit
/// hour inclusive, wrapping past midnight. Occurrences are attributed to the
/// local date of the entry.
#[allow(clippy::cast_precision_loss)]
#[instrument(skip(events, calendar), fields(events = events.len()))]
pub fn top_attendance_hours(
    events: &[AttendanceEvent],
    calendar: &ReportingCalendar,
    limit: usize,
) -> Result<Vec<HourBandAverage>> {
    let mut tallies: BTreeMap<u32, BandTally> = BTreeMap::new();

    for event in events {
        let entry = event.entry_time()?;
        let exit = event.exit_time()?;
        let last = exit.unwrap_or(entry);
        let duration = exit.map(|exit| (exit - entry).num_seconds());
        let day = calendar.date_of(entry);

        let mut band_start = calendar.start_of_hour(entry).ok_or_else(|| {
            StatsError::invalid_input(
                RecordKind::AttendanceEvent,
                "entry_timestamp",
                event.member_id,
                "entry hour starts before the earliest representable instant",
            )
        })?;
        let mut seen = [false; HOURS_PER_DAY as usize];
        for _ in 0..HOURS_PER_DAY {
            if band_start > last {
                break;
            }
            let hour = calendar.hour_of(band_start);
            // a repeated local hour (DST fall-back) counts once
            if !std::mem::replace(&mut seen[hour as usize], true) {
                let tally = tallies.entry(hour).or_default();
                *tally.per_day.entry(day).or_insert(0) += 1;
                if let Some(seconds) = duration {
                    tally.completed_visits += 1;
                    tally.completed_seconds += seconds;
                }
            }
            match band_start.checked_add_signed(Duration::hours(1)) {
                Some(next) => band_start = next,
                None => break,
            }
        }
    }

    let bands = tallies
        .into_iter()
        .map(|(hour, tally)| {
            let total: usize = tally.per_day.values().sum();
            let avg_hours = if tally.completed_visits == 0 {
                0.0
            } else {
                round2(tally.completed_seconds as f64 / 3600.0 / tally.completed_visits as f64)
            };
            HourBandAverage {
                hour_range: HourBandAverage::label(hour),
                start_hour: hour,
                avg_count: round2(total as f64 / tally.per_day.len() as f64),
                total_count: total,
                avg_hours,
            }
        })
        .collect();

    let ranked = rank_hour_bands(bands, limit);
    debug!(bands = ranked.len(), "Ranked attendance hours");
    Ok(ranked)
}

/// Orders bands by average descending, ties by start hour, and keeps `limit`.
///
/// Ranking an already ranked list returns it unchanged.
pub fn rank_hour_bands(mut bands: Vec<HourBandAverage>, limit: usize) -> Vec<HourBandAverage> {
    bands.sort_by(|a, b| match b.avg_count.total_cmp(&a.avg_count) {
        Ordering::Equal => a.start_hour.cmp(&b.start_hour),
        other => other,
    });
    bands.truncate(limit);
    bands
}

/// Average entries per day for each weekday, Monday first.
///
/// Only days with at least one entry are averaged; weekdays without entries
/// are omitted.
#[instrument(skip(events, calendar), fields(events = events.len()))]
pub fn attendance_by_weekday(
    events: &[AttendanceEvent],
    calendar: &ReportingCalendar,
) -> Result<Vec<WeekdayAverage>> {
    let mut per_weekday: BTreeMap<u32, (Weekday, Vec<usize>)> = BTreeMap::new();
    for (day, count) in daily_entry_counts(events, calendar)? {
        let weekday = day.weekday();
        per_weekday
            .entry(weekday.num_days_from_monday())
            .or_insert_with(|| (weekday, Vec::new()))
            .1
            .push(count);
    }

    Ok(per_weekday
        .into_values()
        .map(|(weekday, counts)| WeekdayAverage {
            weekday,
            value: mean_of_counts(counts),
        })
        .collect())
}

/// Mean visit duration in hours for each weekday of entry, Monday first.
///
/// Visits without an exit are ignored.
#[allow(clippy::cast_precision_loss)]
#[instrument(skip(events, calendar), fields(events = events.len()))]
pub fn avg_hours_by_weekday(
    events: &[AttendanceEvent],
    calendar: &ReportingCalendar,
) -> Result<Vec<WeekdayAverage>> {
    let mut per_weekday: BTreeMap<u32, (Weekday, i64, usize)> = BTreeMap::new();
    for event in events {
        let entry = event.entry_time()?;
        let Some(exit) = event.exit_time()? else {
            continue;
        };
        let weekday = calendar.weekday_of(entry);
        let slot = per_weekday
            .entry(weekday.num_days_from_monday())
            .or_insert((weekday, 0, 0));
        slot.1 += (exit - entry).num_seconds();
        slot.2 += 1;
    }

    Ok(per_weekday
        .into_values()
        .map(|(weekday, seconds, visits)| WeekdayAverage {
            weekday,
            value: round2(seconds as f64 / 3600.0 / visits as f64),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use gymstats_common::test_utils::fixtures::{open_visit, visit, visits_at};
    use gymstats_common::test_utils::{mock_date, mock_timestamp};
    use gymstats_common::SUPPORTED_TIMESTAMP_SECS;
    use proptest::prelude::*;

    fn utc() -> ReportingCalendar {
        ReportingCalendar::utc()
    }

    #[test]
    fn test_average_daily_attendance_empty() {
        assert_eq!(average_daily_attendance(&[], &utc()).unwrap(), 0.0);
    }

    #[test]
    fn test_average_daily_attendance_over_active_days() {
        let mut events = visits_at(mock_timestamp(2024, 3, 4, 10, 0, 0), 3);
        events.extend(visits_at(mock_timestamp(2024, 3, 6, 10, 0, 0), 4));
        // no visits on the 5th, so the mean is over two days
        assert_eq!(average_daily_attendance(&events, &utc()).unwrap(), 3.5);
    }

    #[test]
    fn test_malformed_event_is_rejected() {
        let mut broken = visit(4, mock_timestamp(2024, 3, 4, 10, 0, 0), 30);
        broken.exit_timestamp = broken.entry_timestamp.map(|t| t - 60);
        // daily counts only read the entry
        assert!(average_daily_attendance(&[broken.clone()], &utc()).is_ok());

        let err = top_attendance_hours(&[broken], &utc(), 3).unwrap_err();
        assert!(matches!(err, StatsError::InvalidInput { field: "exit_timestamp", .. }));
    }

    #[test]
    fn test_attendance_change() {
        let mut events = visits_at(mock_timestamp(2024, 3, 4, 10, 0, 0), 4);
        events.extend(visits_at(mock_timestamp(2024, 3, 5, 10, 0, 0), 6));
        assert_eq!(attendance_change(&events, mock_date(2024, 3, 5), &utc()).unwrap(), 50);
        assert_eq!(attendance_change(&events, mock_date(2024, 3, 4), &utc()).unwrap(), 100);
        assert_eq!(attendance_change(&events, mock_date(2024, 3, 9), &utc()).unwrap(), 0);
    }

    #[test]
    fn test_hour_band_label() {
        assert_eq!(HourBandAverage::label(18), "18-19");
        assert_eq!(HourBandAverage::label(23), "23-0");
    }

    #[test]
    fn test_visit_spans_hour_bands_inclusive() {
        // 18:10 to 20:00 touches bands 18, 19 and 20
        let events = vec![visit(1, mock_timestamp(2024, 3, 4, 18, 10, 0), 110)];
        let bands = top_attendance_hours(&events, &utc(), 24).unwrap();
        let hours: Vec<u32> = bands.iter().map(|b| b.start_hour).collect();
        assert_eq!(hours, vec![18, 19, 20]);
        assert!(bands.iter().all(|b| b.avg_count == 1.0));
    }

    #[test]
    fn test_visit_wraps_past_midnight() {
        let events = vec![visit(1, mock_timestamp(2024, 3, 4, 23, 30, 0), 60)];
        let bands = top_attendance_hours(&events, &utc(), 24).unwrap();
        let labels: Vec<&str> = bands.iter().map(|b| b.hour_range.as_str()).collect();
        assert_eq!(labels, vec!["0-1", "23-0"]);
    }

    #[test]
    fn test_open_visit_counts_entry_band_only() {
        let events = vec![open_visit(1, mock_timestamp(2024, 3, 4, 7, 45, 0))];
        let bands = top_attendance_hours(&events, &utc(), 3).unwrap();
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].hour_range, "7-8");
    }

    #[test]
    fn test_long_visit_is_capped_at_one_day_of_bands() {
        let events = vec![visit(1, mock_timestamp(2024, 3, 4, 6, 0, 0), 60 * 72)];
        let bands = top_attendance_hours(&events, &utc(), 100).unwrap();
        assert_eq!(bands.len(), 24);
        assert!(bands.iter().all(|b| b.total_count == 1));
    }

    #[test]
    fn test_top_hours_averages_over_days_with_occurrence() {
        let mut events = visits_at(mock_timestamp(2024, 3, 4, 18, 0, 0), 4);
        events.extend(visits_at(mock_timestamp(2024, 3, 5, 18, 0, 0), 2));
        events.extend(visits_at(mock_timestamp(2024, 3, 5, 9, 0, 0), 5));
        // one-hour visits from 18:00 end at 19:00 and touch band 19 as well
        let bands = top_attendance_hours(&events, &utc(), 3).unwrap();
        assert_eq!(bands.len(), 3);
        assert_eq!(bands[0].hour_range, "9-10");
        assert_eq!(bands[0].avg_count, 5.0);
        assert_eq!(bands[1].hour_range, "10-11");
        assert_eq!(bands[1].avg_count, 5.0);
        assert_eq!(bands[2].hour_range, "18-19");
        assert_eq!(bands[2].avg_count, 3.0);
        assert_eq!(bands[2].total_count, 6);
    }

    #[test]
    fn test_top_hours_fewer_bands_than_limit() {
        let events = vec![open_visit(1, mock_timestamp(2024, 3, 4, 7, 0, 0))];
        assert_eq!(top_attendance_hours(&events, &utc(), 3).unwrap().len(), 1);
        assert!(top_attendance_hours(&[], &utc(), 3).unwrap().is_empty());
    }

    #[test]
    fn test_top_hours_in_local_time() {
        let calendar = ReportingCalendar::from_name("Asia/Tehran").unwrap();
        // 14:30 UTC is 18:00 in Tehran
        let events = vec![open_visit(1, mock_timestamp(2024, 3, 4, 14, 30, 0))];
        let bands = top_attendance_hours(&events, &calendar, 3).unwrap();
        assert_eq!(bands[0].hour_range, "18-19");
    }

    #[test]
    fn test_band_avg_hours_from_completed_visits() {
        let events = vec![
            visit(1, mock_timestamp(2024, 3, 4, 18, 0, 0), 90),
            visit(2, mock_timestamp(2024, 3, 4, 18, 30, 0), 20),
            open_visit(3, mock_timestamp(2024, 3, 4, 20, 15, 0)),
        ];
        let bands = top_attendance_hours(&events, &utc(), 24).unwrap();
        let by_hour = |hour: u32| bands.iter().find(|b| b.start_hour == hour).unwrap();

        // 90 and 20 minutes
        assert_eq!(by_hour(18).avg_hours, 0.92);
        assert_eq!(by_hour(19).avg_hours, 1.5);
        assert_eq!(by_hour(20).avg_hours, 0.0);
        assert_eq!(by_hour(20).total_count, 1);
    }

    #[test]
    fn test_repeated_local_hour_counts_once() {
        let calendar = ReportingCalendar::from_name("America/New_York").unwrap();
        // 01:30 EDT to 01:40 EST across the 2024 fall-back
        let events = vec![visit(1, mock_timestamp(2024, 11, 3, 5, 30, 0), 70)];
        let bands = top_attendance_hours(&events, &calendar, 24).unwrap();

        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].hour_range, "1-2");
        assert_eq!(bands[0].total_count, 1);
        assert_eq!(bands[0].avg_count, 1.0);
        assert_eq!(bands[0].avg_hours, 1.17);
    }

    #[test]
    fn test_extreme_timestamps_are_invalid_input() {
        let tehran = ReportingCalendar::from_name("Asia/Tehran").unwrap();
        for secs in [DateTime::<Utc>::MAX_UTC.timestamp(), DateTime::<Utc>::MIN_UTC.timestamp()] {
            let mut event = open_visit(6, mock_timestamp(2024, 3, 4, 10, 0, 0));
            event.entry_timestamp = Some(secs);
            for calendar in [utc(), tehran] {
                let err = top_attendance_hours(&[event.clone()], &calendar, 3).unwrap_err();
                assert!(matches!(err, StatsError::InvalidInput { field: "entry_timestamp", .. }));
            }
        }
    }

    #[test]
    fn test_supported_range_edges_do_not_overflow() {
        let tehran = ReportingCalendar::from_name("Asia/Tehran").unwrap();
        let new_york = ReportingCalendar::from_name("America/New_York").unwrap();
        for secs in [*SUPPORTED_TIMESTAMP_SECS.start(), *SUPPORTED_TIMESTAMP_SECS.end()] {
            let mut event = open_visit(7, mock_timestamp(2024, 3, 4, 10, 0, 0));
            event.entry_timestamp = Some(secs);
            for calendar in [utc(), tehran, new_york] {
                let bands = top_attendance_hours(&[event.clone()], &calendar, 3).unwrap();
                assert_eq!(bands.len(), 1);
                assert_eq!(bands[0].total_count, 1);
            }
        }
    }

    #[test]
    fn test_attendance_by_weekday_two_mondays() {
        let mut events = visits_at(mock_timestamp(2024, 3, 4, 10, 0, 0), 3);
        events.extend(visits_at(mock_timestamp(2024, 3, 11, 10, 0, 0), 5));
        let weekdays = attendance_by_weekday(&events, &utc()).unwrap();
        assert_eq!(weekdays.len(), 1);
        assert_eq!(weekdays[0].weekday, Weekday::Mon);
        assert_eq!(weekdays[0].weekday_name(), "Monday");
        assert_eq!(weekdays[0].value, 4.0);
    }

    #[test]
    fn test_attendance_by_weekday_ordered_from_monday() {
        let mut events = visits_at(mock_timestamp(2024, 3, 10, 10, 0, 0), 1); // Sunday
        events.extend(visits_at(mock_timestamp(2024, 3, 6, 10, 0, 0), 2)); // Wednesday
        events.extend(visits_at(mock_timestamp(2024, 3, 4, 10, 0, 0), 3)); // Monday
        let order: Vec<Weekday> = attendance_by_weekday(&events, &utc())
            .unwrap()
            .into_iter()
            .map(|w| w.weekday)
            .collect();
        assert_eq!(order, vec![Weekday::Mon, Weekday::Wed, Weekday::Sun]);
    }

    #[test]
    fn test_avg_hours_by_weekday() {
        let events = vec![
            visit(1, mock_timestamp(2024, 3, 4, 10, 0, 0), 60),
            visit(2, mock_timestamp(2024, 3, 4, 11, 0, 0), 120),
            visit(3, mock_timestamp(2024, 3, 5, 11, 0, 0), 100),
            open_visit(4, mock_timestamp(2024, 3, 6, 9, 0, 0)),
        ];
        let hours = avg_hours_by_weekday(&events, &utc()).unwrap();
        assert_eq!(hours.len(), 2);
        assert_eq!(hours[0].weekday, Weekday::Mon);
        assert_eq!(hours[0].value, 1.5);
        assert_eq!(hours[1].weekday, Weekday::Tue);
        assert_eq!(hours[1].value, 1.67);
    }

    fn band_strategy() -> impl Strategy<Value = Vec<HourBandAverage>> {
        prop::collection::vec((0u32..24, 0u32..1000), 0..24).prop_map(|raw| {
            raw.into_iter()
                .map(|(hour, hundredths)| HourBandAverage {
                    hour_range: HourBandAverage::label(hour),
                    start_hour: hour,
                    avg_count: f64::from(hundredths) / 100.0,
                    total_count: hundredths as usize,
                    avg_hours: 1.0,
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn rank_hour_bands_is_idempotent(bands in band_strategy(), limit in 0usize..30) {
            let ranked = rank_hour_bands(bands, limit);
            let reranked = rank_hour_bands(ranked.clone(), limit);
            prop_assert_eq!(ranked, reranked);
        }

        #[test]
        fn ranked_bands_never_exceed_limit(bands in band_strategy(), limit in 0usize..30) {
            let len = bands.len();
            prop_assert_eq!(rank_hour_bands(bands, limit).len(), len.min(limit));
        }
    }
}
