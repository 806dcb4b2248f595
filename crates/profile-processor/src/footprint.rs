//! Storm-cell footprints rasterized onto the radar grid.

use storm_common::{GeoTransform, GridShape, Polygon};
use tracing::debug;

use crate::error::Result;
use crate::types::Grid;

/// Boolean grid marking the pixels inside a storm cell.
#[derive(Debug, Clone, PartialEq)]
pub struct FootprintMask {
    inner: Grid<bool>,
}

impl FootprintMask {
    /// Wrap an existing boolean grid.
    pub fn new(inner: Grid<bool>) -> Self {
        Self { inner }
    }

    /// Mask with every pixel inside the footprint.
    pub fn full(shape: GridShape) -> Self {
        Self::new(Grid::filled(shape, true))
    }

    /// Rasterize a polygon given in `(row, col)` grid coordinates.
    ///
    /// Pixel `(r, c)` is inside when the point `(r, c)` lies inside the
    /// polygon or on its boundary.
    pub fn from_grid_polygon(shape: GridShape, polygon: &Polygon) -> Self {
        let mut inner = Grid::filled(shape, false);
        if shape.is_empty() {
            return Self::new(inner);
        }

        // Only scan the polygon's bounding rows/cols
        let bbox = polygon.bbox();
        let r0 = bbox.min_x.ceil().max(0.0) as usize;
        let r1 = (bbox.max_x.floor() as i64).min(shape.height as i64 - 1);
        let c0 = bbox.min_y.ceil().max(0.0) as usize;
        let c1 = (bbox.max_y.floor() as i64).min(shape.width as i64 - 1);
        if r1 < 0 || c1 < 0 {
            return Self::new(inner);
        }

        for r in r0..=r1 as usize {
            for c in c0..=c1 as usize {
                if polygon.covers(r as f64, c as f64) {
                    inner.data[shape.flat_index(r, c)] = true;
                }
            }
        }

        Self::new(inner)
    }

    /// Rasterize a polygon given in geographic `(lon, lat)` coordinates.
    ///
    /// Vertices are first snapped to integer grid indices with
    /// [`GeoTransform::geo_to_grid`].
    pub fn from_geo_polygon(
        shape: GridShape,
        polygon: &Polygon,
        transform: &GeoTransform,
    ) -> Result<Self> {
        Self::from_geo_polygon_at(shape, polygon, transform, (0, 0))
    }

    /// Rasterize a geographic polygon onto a sub-grid of a larger grid.
    ///
    /// `transform` maps the full grid and `offset` is the `(row, col)` of the
    /// sub-grid's first pixel in it. Vertices are snapped on the full grid and
    /// then shifted by whole pixels, so the mask matches the full-grid mask
    /// pixel for pixel.
    pub fn from_geo_polygon_at(
        shape: GridShape,
        polygon: &Polygon,
        transform: &GeoTransform,
        offset: (usize, usize),
    ) -> Result<Self> {
        let (row0, col0) = (offset.0 as i64, offset.1 as i64);
        let grid_polygon = polygon.map(|lon, lat| {
            let (row, col) = transform.geo_to_grid(lon, lat);
            ((row - row0) as f64, (col - col0) as f64)
        })?;
        let mask = Self::from_grid_polygon(shape, &grid_polygon);
        debug!(
            pixels = mask.count(),
            shape = %shape,
            row_offset = offset.0,
            col_offset = offset.1,
            "Rasterized storm footprint"
        );
        Ok(mask)
    }

    pub fn shape(&self) -> GridShape {
        self.inner.shape()
    }

    /// True when pixel at flat index `idx` is inside the footprint.
    #[inline]
    pub fn contains_index(&self, idx: usize) -> bool {
        self.inner.data.get(idx).copied().unwrap_or(false)
    }

    /// Number of pixels inside the footprint.
    pub fn count(&self) -> usize {
        self.inner.data.iter().filter(|&&v| v).count()
    }

    pub fn as_grid(&self) -> &Grid<bool> {
        &self.inner
    }
}
