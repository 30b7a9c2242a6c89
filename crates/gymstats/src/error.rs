//! Application-wide error types using thiserror.

use gymstats_common::StatsError;
use std::path::PathBuf;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Statistics, configuration or snapshot store error.
    #[error(transparent)]
    Stats(#[from] StatsError),

    /// No dataset path given on the command line or in the environment.
    #[error("No dataset given: pass a path or set GYMSTATS_DATASET")]
    MissingDataset,

    /// The dataset file could not be read.
    #[error("Failed to read dataset {path:?}: {source}")]
    DatasetRead {
        /// Dataset location
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The dataset file is not valid JSON for a dataset.
    #[error("Failed to parse dataset {path:?}: {source}")]
    DatasetParse {
        /// Dataset location
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// The computation task did not complete.
    #[error("Statistics task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for the application.
pub type AppResult<T> = Result<T, AppError>;
