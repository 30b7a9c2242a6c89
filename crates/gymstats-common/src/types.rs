//! Source records consumed by the statistics aggregator.
//!
//! Timestamps arrive as Unix seconds straight from the check-in/out and
//! payment workflows. They stay optional here so a gap in the source data is
//! reported as [`StatsError::InvalidInput`] instead of failing
//! deserialization of the whole dataset.

use crate::error::{Result, StatsError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Timestamp type used throughout the workspace
pub type Timestamp = DateTime<Utc>;

/// A gym member ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub u64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A sport ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SportId(pub u64);

impl fmt::Display for SportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of source record, used for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// An [`AttendanceEvent`].
    AttendanceEvent,
    /// A [`SubscriptionPeriod`].
    SubscriptionPeriod,
    /// A [`MemberProfile`].
    MemberProfile,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttendanceEvent => write!(f, "attendance event"),
            Self::SubscriptionPeriod => write!(f, "subscription period"),
            Self::MemberProfile => write!(f, "member profile"),
        }
    }
}

/// Unix seconds accepted in source records: 0001-01-01T00:00:00Z through
/// 9999-12-31T23:59:59Z.
///
/// Every local date and hour of an instant in this range, and the day and
/// hour arithmetic the statistics do around it, stay within chrono's limits.
pub const SUPPORTED_TIMESTAMP_SECS: RangeInclusive<i64> = -62_135_596_800..=253_402_300_799;

/// Convert Unix seconds into a UTC timestamp, if within
/// [`SUPPORTED_TIMESTAMP_SECS`].
pub fn timestamp_from_secs(secs: i64) -> Option<Timestamp> {
    if !SUPPORTED_TIMESTAMP_SECS.contains(&secs) {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}

fn require_timestamp(
    value: Option<i64>,
    record: RecordKind,
    field: &'static str,
    member_id: MemberId,
) -> Result<Timestamp> {
    let secs = value.ok_or_else(|| {
        StatsError::invalid_input(record, field, member_id, "timestamp is missing")
    })?;
    timestamp_from_secs(secs).ok_or_else(|| {
        StatsError::invalid_input(
            record,
            field,
            member_id,
            format!("{secs} is outside the supported range (years 1 to 9999)"),
        )
    })
}

/// One gym visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    /// Visiting member.
    pub member_id: MemberId,
    /// Check-in instant in Unix seconds.
    pub entry_timestamp: Option<i64>,
    /// Check-out instant in Unix seconds, absent while checked in.
    #[serde(default)]
    pub exit_timestamp: Option<i64>,
}

impl AttendanceEvent {
    /// Create a visit from typed timestamps.
    pub fn new(member_id: MemberId, entry: Timestamp, exit: Option<Timestamp>) -> Self {
        Self {
            member_id,
            entry_timestamp: Some(entry.timestamp()),
            exit_timestamp: exit.map(|t| t.timestamp()),
        }
    }

    /// Entry instant of the visit.
    pub fn entry_time(&self) -> Result<Timestamp> {
        require_timestamp(
            self.entry_timestamp,
            RecordKind::AttendanceEvent,
            "entry_timestamp",
            self.member_id,
        )
    }

    /// Exit instant of the visit, `None` while the member is still checked in.
    ///
    /// An exit before the entry is rejected.
    pub fn exit_time(&self) -> Result<Option<Timestamp>> {
        if self.exit_timestamp.is_none() {
            return Ok(None);
        }
        let entry = self.entry_time()?;
        let exit = require_timestamp(
            self.exit_timestamp,
            RecordKind::AttendanceEvent,
            "exit_timestamp",
            self.member_id,
        )?;
        if exit < entry {
            return Err(StatsError::invalid_input(
                RecordKind::AttendanceEvent,
                "exit_timestamp",
                self.member_id,
                format!("exit {exit} precedes entry {entry}"),
            ));
        }
        Ok(Some(exit))
    }
}

/// One paid membership interval, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPeriod {
    /// Subscribed member.
    pub member_id: MemberId,
    /// First covered instant in Unix seconds.
    pub start_timestamp: Option<i64>,
    /// Last covered instant in Unix seconds.
    pub end_timestamp: Option<i64>,
}

impl SubscriptionPeriod {
    /// Create a period from typed timestamps.
    pub fn new(member_id: MemberId, start: Timestamp, end: Timestamp) -> Self {
        Self {
            member_id,
            start_timestamp: Some(start.timestamp()),
            end_timestamp: Some(end.timestamp()),
        }
    }

    /// The `(start, end)` instants of the period.
    pub fn interval(&self) -> Result<(Timestamp, Timestamp)> {
        let start = require_timestamp(
            self.start_timestamp,
            RecordKind::SubscriptionPeriod,
            "start_timestamp",
            self.member_id,
        )?;
        let end = require_timestamp(
            self.end_timestamp,
            RecordKind::SubscriptionPeriod,
            "end_timestamp",
            self.member_id,
        )?;
        if end < start {
            return Err(StatsError::invalid_input(
                RecordKind::SubscriptionPeriod,
                "end_timestamp",
                self.member_id,
                format!("end {end} precedes start {start}"),
            ));
        }
        Ok((start, end))
    }

    /// Whether `instant` lies within `[start, end]`.
    pub fn contains(&self, instant: Timestamp) -> Result<bool> {
        let (start, end) = self.interval()?;
        Ok(start <= instant && instant <= end)
    }
}

/// A sport a member practices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sport {
    /// Sport ID.
    pub id: SportId,
    /// Display name.
    pub name: String,
}

impl Sport {
    /// Create a sport.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: SportId(id),
            name: name.into(),
        }
    }
}

/// Demographic and enrolment data of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
    /// Member ID.
    pub member_id: MemberId,
    /// Birth date, when known.
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Practiced sport, when assigned.
    #[serde(default)]
    pub sport: Option<Sport>,
    /// Member-creation instant in Unix seconds.
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl MemberProfile {
    /// Create a profile with no optional data.
    pub const fn new(member_id: MemberId) -> Self {
        Self {
            member_id,
            birth_date: None,
            sport: None,
            created_at: None,
        }
    }

    /// Set the birth date.
    #[must_use]
    pub const fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    /// Set the practiced sport.
    #[must_use]
    pub fn with_sport(mut self, sport: Sport) -> Self {
        self.sport = Some(sport);
        self
    }

    /// Set the creation instant.
    #[must_use]
    pub fn with_created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at.timestamp());
        self
    }

    /// Creation instant of the member record, if one was recorded.
    pub fn created_time(&self) -> Result<Option<Timestamp>> {
        match self.created_at {
            None => Ok(None),
            some => require_timestamp(
                some,
                RecordKind::MemberProfile,
                "created_at",
                self.member_id,
            )
            .map(Some),
        }
    }
}

/// The three source collections read by one aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Attendance log.
    #[serde(default)]
    pub events: Vec<AttendanceEvent>,
    /// Subscription history.
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionPeriod>,
    /// Member profiles.
    #[serde(default)]
    pub members: Vec<MemberProfile>,
}

impl Dataset {
    /// Whether all three collections are empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.subscriptions.is_empty() && self.members.is_empty()
    }
}
