//! Error types for geometry operations.

use thiserror::Error;

/// Result type alias using GeoError.
pub type GeoResult<T> = Result<T, GeoError>;

/// Errors raised while building grids, transforms and polygons.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Invalid extent: {0}")]
    InvalidExtent(String),

    #[error("Invalid grid shape {width}x{height}")]
    InvalidShape { width: usize, height: usize },

    #[error("Polygon needs at least 3 vertices, got {0}")]
    DegeneratePolygon(usize),

    #[error("Non-finite coordinate at vertex {0}")]
    NonFiniteVertex(usize),
}
