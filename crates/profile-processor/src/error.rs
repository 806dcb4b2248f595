//! Error types for profile processing.

use thiserror::Error;

/// Errors that can occur while aggregating or encoding a storm-cell profile.
///
/// Every variant is scoped to a single (cell, timestamp) computation; batch
/// drivers skip the cell and carry on.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Fewer than two vertical levels were supplied.
    #[error("insufficient data: need at least 2 levels, got {levels}")]
    InsufficientData { levels: usize },

    /// A level or the footprint mask disagrees with the volume grid shape.
    #[error("shape mismatch at {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: String,
        expected: String,
        found: String,
    },

    /// A scaled value does not fit the 16-bit storage type.
    #[error("scaled value {value} at index {index} does not fit in i16")]
    ScaledOverflow { index: usize, value: f64 },

    /// Packed array bytes could not be decoded.
    #[error("invalid packed array: {0}")]
    InvalidPackedArray(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// Footprint geometry error.
    #[error("footprint error: {0}")]
    Footprint(#[from] storm_common::GeoError),
}

impl ProfileError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(
        what: impl Into<String>,
        expected: impl ToString,
        found: impl ToString,
    ) -> Self {
        Self::ShapeMismatch {
            what: what.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Create an InvalidPackedArray error.
    pub fn invalid_packed(msg: impl Into<String>) -> Self {
        Self::InvalidPackedArray(msg.into())
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Result type for profile processing operations.
pub type Result<T> = std::result::Result<T, ProfileError>;
