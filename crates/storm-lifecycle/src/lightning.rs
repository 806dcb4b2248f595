//! Lightning strokes inside storm polygons.

use serde::{Deserialize, Serialize};
use storm_common::Polygon;

/// A located lightning stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub lon: f64,
    pub lat: f64,
}

/// Number of strokes strictly inside `polygon` (lon/lat coordinates).
///
/// Strokes exactly on the outline are not counted.
pub fn count_strikes(polygon: &Polygon, strokes: &[Stroke]) -> u32 {
    let bbox = polygon.bbox();
    strokes
        .iter()
        .filter(|s| bbox.contains_point(s.lon, s.lat))
        .filter(|s| polygon.contains(s.lon, s.lat) && !polygon.on_boundary(s.lon, s.lat, 1e-9))
        .count() as u32
}
