//! Error types for CAPPI reading operations.

use thiserror::Error;

/// Result type for CAPPI reader operations.
pub type CappiResult<T> = Result<T, CappiError>;

/// Error types for CAPPI reading.
#[derive(Error, Debug)]
pub enum CappiError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Gzip stream could not be inflated
    #[error("Decompression failed: {0}")]
    Decompression(String),

    /// Payload does not match the configured volume dimensions
    #[error("Size mismatch: expected {expected} bytes for {levels}x{rows}x{cols} float32, found {found}")]
    SizeMismatch {
        expected: usize,
        found: usize,
        levels: usize,
        rows: usize,
        cols: usize,
    },

    /// Invalid reader configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Requested window does not overlap the radar grid
    #[error("Window {0} does not overlap the radar grid")]
    EmptyWindow(String),

    /// Grid geometry error
    #[error("Geometry error: {0}")]
    Geo(#[from] storm_common::GeoError),

    /// Volume could not be assembled
    #[error("Volume error: {0}")]
    Volume(#[from] profile_processor::ProfileError),
}
