//! # Gymstats
//!
//! Command-line front end of the club statistics engine: loads a dataset,
//! computes one snapshot and publishes it.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod error;

pub use app::*;
pub use error::*;
