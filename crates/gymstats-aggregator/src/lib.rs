//! # Gymstats Aggregator
//!
//! Club statistics computed from the attendance log, the subscription
//! history and member profiles.
//!
//! Every statistic is a pure function of its inputs and a reference instant,
//! evaluated in a [`ReportingCalendar`]. [`StatsAggregator`] assembles them
//! into a [`StatisticsSnapshot`]; [`SnapshotCache`] and [`SnapshotStore`]
//! keep the latest snapshot without the aggregator knowing about them.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod attendance;
pub mod calendar;
pub mod demographics;
pub mod membership;
pub mod reporter;
pub mod retention;
pub mod snapshot;
pub mod snapshot_cache;
pub mod source;
pub mod sports;
pub mod trends;

pub use aggregator::{AggregationSettings, StatsAggregator};
pub use attendance::{HourBandAverage, WeekdayAverage};
pub use calendar::ReportingCalendar;
pub use demographics::AgeGroups;
pub use reporter::StatsReporter;
pub use snapshot::StatisticsSnapshot;
pub use snapshot_cache::{SnapshotCache, SnapshotStore};
pub use source::DatasetSource;
pub use sports::SportShare;
pub use trends::MonthlyTrend;
