//! Decoding of raw CAPPI payloads into radar volumes.

use std::borrow::Cow;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use flate2::read::GzDecoder;
use profile_processor::{FootprintMask, RadarVolume};
use storm_common::{BoundingBox, GeoTransform, GridShape, Polygon};
use tracing::{debug, instrument};

use crate::config::CappiConfig;
use crate::error::{CappiError, CappiResult};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A decoded CAPPI volume, or a window of one, with its geo-referencing.
#[derive(Debug, Clone)]
pub struct CappiVolume {
    /// Reflectivity levels, north-up, missing values as NaN. Shared between
    /// every cell masked out of this scan.
    pub volume: Arc<RadarVolume>,
    /// Pixel to lon/lat mapping of the full product grid.
    pub transform: GeoTransform,
    /// `(row, col)` of `volume`'s first pixel in the full product grid.
    pub offset: (usize, usize),
    /// Extent covered by `volume`.
    pub extent: BoundingBox,
}

impl CappiVolume {
    pub fn shape(&self) -> GridShape {
        self.volume.shape()
    }

    /// Rasterize a storm polygon onto this volume.
    ///
    /// Vertices are always snapped on the full product grid, so a window
    /// and the full volume mark exactly the same pixels.
    pub fn footprint(&self, polygon: &Polygon) -> CappiResult<FootprintMask> {
        Ok(FootprintMask::from_geo_polygon_at(
            self.shape(),
            polygon,
            &self.transform,
            self.offset,
        )?)
    }

    /// Cut the pixels covering `window` out of every level.
    ///
    /// Corners are snapped to pixel indices the same way storm polygons
    /// are, and the end row/column is inclusive, so every pixel a polygon
    /// with this bounding box can cover lies inside the result.
    pub fn window(&self, window: &BoundingBox) -> CappiResult<CappiVolume> {
        let shape = self.shape();
        let (row0, col0) = (self.offset.0 as i64, self.offset.1 as i64);
        let (top, left) = self.transform.geo_to_grid(window.min_x, window.max_y);
        let (bottom, right) = self.transform.geo_to_grid(window.max_x, window.min_y);

        let clamp = |v: i64, max: usize| v.clamp(0, max as i64) as usize;
        let r0 = clamp(top - row0, shape.height);
        let r1 = clamp(bottom - row0 + 1, shape.height);
        let c0 = clamp(left - col0, shape.width);
        let c1 = clamp(right - col0 + 1, shape.width);
        if r0 >= r1 || c0 >= c1 {
            return Err(CappiError::EmptyWindow(format!("{:?}", window)));
        }

        let rows: Vec<usize> = (r0..r1).collect();
        let cols: Vec<usize> = (c0..c1).collect();
        let levels = self
            .volume
            .levels()
            .iter()
            .map(|level| level.select(&rows, &cols))
            .collect();

        let offset = (self.offset.0 + r0, self.offset.1 + c0);
        let (min_x, max_y) = self.transform.grid_to_geo(offset.0 as f64, offset.1 as f64);
        let (max_x, min_y) = self
            .transform
            .grid_to_geo((offset.0 + rows.len()) as f64, (offset.1 + cols.len()) as f64);

        Ok(CappiVolume {
            volume: Arc::new(RadarVolume::new(levels)?),
            transform: self.transform,
            offset,
            extent: BoundingBox::new(min_x, min_y, max_x, max_y),
        })
    }
}

/// Read a CAPPI file (gzip-compressed or raw) from disk.
#[instrument(skip(config), fields(path = %path.display()))]
pub fn read_cappi(path: &Path, config: &CappiConfig) -> CappiResult<CappiVolume> {
    let bytes = std::fs::read(path)?;
    decode_cappi(&bytes, config)
}

/// Decode an in-memory CAPPI payload.
pub fn decode_cappi(bytes: &[u8], config: &CappiConfig) -> CappiResult<CappiVolume> {
    config.validate()?;
    let raw = decompress(bytes)?;

    let expected = config.expected_bytes();
    if raw.len() != expected {
        return Err(CappiError::SizeMismatch {
            expected,
            found: raw.len(),
            levels: config.levels,
            rows: config.rows,
            cols: config.cols,
        });
    }

    let level_len = config.rows * config.cols;
    let values: Vec<f32> = raw
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    let levels: Vec<Vec<f32>> = values
        .chunks_exact(level_len)
        .map(|level| {
            if config.flip_rows {
                flip_rows(level, config.cols)
            } else {
                level.to_vec()
            }
        })
        .collect();

    let shape = GridShape::new(config.cols, config.rows);
    let volume =
        RadarVolume::from_raw(levels, shape, config.sentinel)?.skip_lowest(config.skip_levels);
    let transform = GeoTransform::from_extent(&config.extent, config.cols, config.rows)?;

    debug!(
        levels = volume.level_count(),
        shape = %shape,
        compressed = matches!(raw, Cow::Owned(_)),
        "Decoded CAPPI volume"
    );

    Ok(CappiVolume {
        volume: Arc::new(volume),
        transform,
        offset: (0, 0),
        extent: config.extent,
    })
}

fn decompress(bytes: &[u8]) -> CappiResult<Cow<'_, [u8]>> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(Cow::Borrowed(bytes));
    }
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| CappiError::Decompression(e.to_string()))?;
    Ok(Cow::Owned(out))
}

/// Reverse the row order of one row-major level.
fn flip_rows(level: &[f32], cols: usize) -> Vec<f32> {
    level
        .chunks_exact(cols)
        .rev()
        .flat_map(|row| row.iter().copied())
        .collect()
}
