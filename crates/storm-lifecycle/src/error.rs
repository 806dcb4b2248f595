//! Error types for lifecycle analysis.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, LifecycleError>;

#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Observations must be strictly increasing in time.
    #[error("observation {index} at {current} does not follow {previous}")]
    NonIncreasingTime {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    /// A family without observations cannot be classified.
    #[error("family {0} has no observations")]
    EmptyFamily(String),
}
