//! # Gymstats Common
//!
//! Shared records, errors and utilities for the gymstats workspace.
//!
//! This crate provides the input records consumed by the statistics
//! aggregator, the workspace error type and the logging bootstrap used by
//! the binary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{Result, StatsError};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use types::*;
pub use utils::*;
