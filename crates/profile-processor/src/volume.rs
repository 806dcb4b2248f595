//! Radar volumes and their storm-cell masked views.

use std::sync::Arc;

use storm_common::GridShape;
use tracing::debug;

use crate::error::{ProfileError, Result};
use crate::footprint::FootprintMask;
use crate::types::Grid;

/// Reflectivity sentinel written by the CAPPI product for "no data".
pub const NO_DATA_SENTINEL: f32 = -99.0;

/// Multi-level reflectivity volume in dBZ, ordered bottom to top.
///
/// Missing values are NaN. All levels share one grid shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarVolume {
    levels: Vec<Grid<f32>>,
}

impl RadarVolume {
    /// Build a volume, checking that every level has the shape of the first.
    pub fn new(levels: Vec<Grid<f32>>) -> Result<Self> {
        if let Some(first) = levels.first() {
            let expected = first.shape();
            for (i, level) in levels.iter().enumerate().skip(1) {
                if level.shape() != expected {
                    return Err(ProfileError::shape_mismatch(
                        format!("level {}", i),
                        expected,
                        level.shape(),
                    ));
                }
            }
        }
        Ok(Self { levels })
    }

    /// Build a volume from raw level data, turning `sentinel` into NaN.
    pub fn from_raw(levels: Vec<Vec<f32>>, shape: GridShape, sentinel: f32) -> Result<Self> {
        let grids = levels
            .into_iter()
            .map(|data| {
                let grid = Grid::new(data, shape.width, shape.height)?;
                Ok(grid.map(|v| if v == sentinel { f32::NAN } else { v }))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(grids)
    }

    /// Number of vertical levels.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Shape of one level (empty shape for an empty volume).
    pub fn shape(&self) -> GridShape {
        self.levels
            .first()
            .map_or(GridShape::new(0, 0), Grid::shape)
    }

    pub fn level(&self, index: usize) -> Option<&Grid<f32>> {
        self.levels.get(index)
    }

    pub fn levels(&self) -> &[Grid<f32>] {
        &self.levels
    }

    /// Drop the lowest `count` levels.
    pub fn skip_lowest(mut self, count: usize) -> Self {
        let count = count.min(self.levels.len());
        self.levels.drain(..count);
        self
    }
}

/// A radar volume seen through a storm-cell footprint.
///
/// Pixels outside the footprint read as missing, exactly like NaN pixels.
/// The volume is shared, so every cell of one radar scan can be masked out
/// of a single decoded copy.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedVolume {
    volume: Arc<RadarVolume>,
    mask: FootprintMask,
}

impl MaskedVolume {
    /// Apply `mask` to every level of `volume`.
    pub fn new(volume: impl Into<Arc<RadarVolume>>, mask: FootprintMask) -> Result<Self> {
        let volume = volume.into();
        if volume.level_count() > 0 && mask.shape() != volume.shape() {
            return Err(ProfileError::shape_mismatch(
                "footprint mask",
                volume.shape(),
                mask.shape(),
            ));
        }
        Ok(Self { volume, mask })
    }

    /// Volume with no footprint restriction.
    pub fn unmasked(volume: impl Into<Arc<RadarVolume>>) -> Self {
        let volume = volume.into();
        let mask = FootprintMask::full(volume.shape());
        Self { volume, mask }
    }

    pub fn level_count(&self) -> usize {
        self.volume.level_count()
    }

    pub fn shape(&self) -> GridShape {
        self.volume.shape()
    }

    pub fn mask(&self) -> &FootprintMask {
        &self.mask
    }

    /// The underlying, unmasked volume.
    pub fn volume(&self) -> &RadarVolume {
        &self.volume
    }

    /// Reflectivity at flat index `idx` of `level`, or `None` when missing.
    #[inline]
    pub fn value(&self, level: usize, idx: usize) -> Option<f32> {
        if !self.mask.contains_index(idx) {
            return None;
        }
        self.volume
            .level(level)
            .and_then(|grid| grid.data.get(idx).copied())
            .filter(|v| !v.is_nan())
    }

    /// Iterator over the non-missing values of one level.
    pub fn valid_values(&self, level: usize) -> impl Iterator<Item = f32> + '_ {
        let len = self.shape().len();
        (0..len).filter_map(move |idx| self.value(level, idx))
    }

    /// Number of non-missing pixels in one level.
    pub fn valid_count(&self, level: usize) -> usize {
        self.valid_values(level).count()
    }

    /// Trim rows and columns that are missing everywhere in `reference_level`.
    ///
    /// The same rows and columns are removed from every level and from the
    /// mask. When the reference level does not exist or has no valid pixel
    /// at all, the volume is returned unchanged so downstream grids keep the
    /// footprint's full shape.
    pub fn crop_to_reference(self, reference_level: usize) -> Result<Self> {
        if reference_level >= self.level_count() {
            debug!(
                reference_level,
                levels = self.level_count(),
                "Crop reference level out of range, keeping full grid"
            );
            return Ok(self);
        }

        let shape = self.shape();
        let valid = |r: usize, c: usize| self.value(reference_level, shape.flat_index(r, c)).is_some();

        let rows: Vec<usize> = (0..shape.height)
            .filter(|&r| (0..shape.width).any(|c| valid(r, c)))
            .collect();
        let cols: Vec<usize> = (0..shape.width)
            .filter(|&c| (0..shape.height).any(|r| valid(r, c)))
            .collect();

        if rows.is_empty() || cols.is_empty() {
            debug!(reference_level, "Reference level has no valid pixels, keeping full grid");
            return Ok(self);
        }
        if rows.len() == shape.height && cols.len() == shape.width {
            return Ok(self);
        }

        let levels = self
            .volume
            .levels()
            .iter()
            .map(|level| level.select(&rows, &cols))
            .collect();
        let mask = FootprintMask::new(self.mask.as_grid().select(&rows, &cols));

        debug!(
            from = %shape,
            to = %GridShape::new(cols.len(), rows.len()),
            "Cropped masked volume to reference level"
        );
        Self::new(RadarVolume::new(levels)?, mask)
    }
}
