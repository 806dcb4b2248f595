//! Common types shared across the storm-profiles crates.
//!
//! Geometry of the radar grid (extents, geotransforms, storm polygons),
//! the shared error type and timestamp parsing used by manifests.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod polygon;
pub mod time;

pub use bbox::BoundingBox;
pub use error::{GeoError, GeoResult};
pub use grid::{GeoTransform, GridShape};
pub use polygon::Polygon;
pub use time::{parse_timestamp, timestamp_from_filename, TimeParseError};
