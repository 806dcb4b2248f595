//! Grid shape and geotransform for radar CAPPI grids.

use crate::{BoundingBox, GeoError, GeoResult};
use serde::{Deserialize, Serialize};

/// Shape of one 2-D level: `height` rows by `width` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    pub width: usize,
    pub height: usize,
}

impl GridShape {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Check if grid is empty.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Row-major flat index of `(row, col)`.
    #[inline]
    pub fn flat_index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }
}

impl std::fmt::Display for GridShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// Affine transform between geographic coordinates and grid indices.
///
/// Same layout as a GDAL geotransform for a north-up grid:
/// `x = origin_x + col * res_x`, `y = origin_y + row * res_y` with
/// `res_y < 0` (row 0 is the northern edge).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub res_x: f64,
    pub origin_y: f64,
    pub res_y: f64,
}

impl GeoTransform {
    /// Build the transform of a `width` x `height` grid covering `extent`.
    pub fn from_extent(extent: &BoundingBox, width: usize, height: usize) -> GeoResult<Self> {
        if width == 0 || height == 0 {
            return Err(GeoError::InvalidShape { width, height });
        }
        if !extent.is_valid() {
            return Err(GeoError::InvalidExtent(format!("{:?}", extent)));
        }

        Ok(Self {
            origin_x: extent.min_x,
            res_x: extent.width() / width as f64,
            origin_y: extent.max_y,
            res_y: -extent.height() / height as f64,
        })
    }

    /// Fractional `(row, col)` of a geographic point.
    pub fn geo_to_grid_f64(&self, x: f64, y: f64) -> (f64, f64) {
        ((y - self.origin_y) / self.res_y, (x - self.origin_x) / self.res_x)
    }

    /// Integer `(row, col)` of a geographic point, truncated toward zero.
    ///
    /// Points outside the grid produce out-of-range (possibly negative) indices.
    pub fn geo_to_grid(&self, x: f64, y: f64) -> (i64, i64) {
        let (row, col) = self.geo_to_grid_f64(x, y);
        (row.trunc() as i64, col.trunc() as i64)
    }

    /// Geographic coordinate of the upper-left corner of pixel `(row, col)`.
    pub fn grid_to_geo(&self, row: f64, col: f64) -> (f64, f64) {
        (self.origin_x + col * self.res_x, self.origin_y + row * self.res_y)
    }
}
