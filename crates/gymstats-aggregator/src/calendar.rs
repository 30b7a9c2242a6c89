//! Local calendar in which days, hours, weekdays and months are evaluated

use chrono::{
    DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveTime, TimeZone, Timelike, Utc,
    Weekday,
};
use chrono_tz::Tz;
use gymstats_common::{Result, StatsError, Timestamp};

/// Converts instants to the local dates and hours of the reporting timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingCalendar {
    tz: Tz,
}

impl ReportingCalendar {
    /// Calendar in the given timezone
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Calendar in UTC
    pub const fn utc() -> Self {
        Self::new(Tz::UTC)
    }

    /// Calendar for an IANA timezone name
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse::<Tz>().map(Self::new).map_err(|e| {
            StatsError::validation_field(format!("Unknown timezone '{name}': {e}"), "timezone")
        })
    }

    /// The reporting timezone
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// The instant in local time
    pub fn local(&self, instant: Timestamp) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }

    /// Local calendar date of the instant
    pub fn date_of(&self, instant: Timestamp) -> NaiveDate {
        self.local(instant).date_naive()
    }

    /// Local hour of day (0-23) of the instant
    pub fn hour_of(&self, instant: Timestamp) -> u32 {
        self.local(instant).hour()
    }

    /// Local weekday of the instant
    pub fn weekday_of(&self, instant: Timestamp) -> Weekday {
        self.local(instant).weekday()
    }

    /// Start of the local hour containing the instant, `None` if it falls
    /// before the earliest instant chrono can represent
    pub fn start_of_hour(&self, instant: Timestamp) -> Option<Timestamp> {
        let local = self.local(instant);
        let into_hour = Duration::seconds(i64::from(local.minute() * 60 + local.second()))
            + Duration::nanoseconds(i64::from(local.nanosecond()));
        instant.checked_sub_signed(into_hour)
    }

    /// First instant of the local date.
    ///
    /// A midnight skipped by a DST transition resolves to the first valid
    /// local time of that day.
    pub fn start_of_day(&self, date: NaiveDate) -> Timestamp {
        let midnight = date.and_time(NaiveTime::MIN);
        (0..=96)
            .filter_map(|quarter| midnight.checked_add_signed(Duration::minutes(15 * quarter)))
            .find_map(|local| self.tz.from_local_datetime(&local).earliest())
            .unwrap_or_else(|| self.tz.from_utc_datetime(&midnight))
            .with_timezone(&Utc)
    }

    /// First instant of the local day after `date`
    pub fn start_of_next_day(&self, date: NaiveDate) -> Timestamp {
        date.succ_opt().map_or_else(
            || {
                let start = self.start_of_day(date);
                start.checked_add_signed(Duration::days(1)).unwrap_or(start)
            },
            |next| self.start_of_day(next),
        )
    }

    /// First instant of the calendar month preceding the one containing `instant`
    pub fn start_of_previous_month(&self, instant: Timestamp) -> Timestamp {
        let first_of_month = first_of_month(self.date_of(instant));
        let first_of_previous = first_of_month
            .checked_sub_months(Months::new(1))
            .unwrap_or(first_of_month);
        self.start_of_day(first_of_previous)
    }
}

impl Default for ReportingCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

/// First day of the month containing `date`
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}
