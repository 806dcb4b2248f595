//! Layout of raw CAPPI volume files.

use serde::{Deserialize, Serialize};
use storm_common::BoundingBox;

use crate::error::{CappiError, CappiResult};

/// Dimensions and conventions of a raw CAPPI product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CappiConfig {
    /// Rows per level.
    pub rows: usize,

    /// Columns per level.
    pub cols: usize,

    /// Levels stored in the file (bottom to top).
    pub levels: usize,

    /// Value written for "no data".
    pub sentinel: f32,

    /// Lowest levels to discard after reading.
    pub skip_levels: usize,

    /// Row 0 of the file is the southernmost row; flip to north-up.
    pub flip_rows: bool,

    /// Geographic extent of the full grid (lon/lat degrees).
    pub extent: BoundingBox,
}

impl Default for CappiConfig {
    fn default() -> Self {
        Self {
            rows: 500,
            cols: 500,
            levels: 15,
            sentinel: -99.0,
            skip_levels: 1,
            flip_rows: true,
            extent: BoundingBox::new(-62.0, -5.0, -58.0, -1.0),
        }
    }
}

impl CappiConfig {
    /// Apply `CAPPI_*` environment variables on top of this configuration.
    pub fn with_env_overrides(mut self) -> Self {
        fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
            std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
        }

        if let Some(v) = parsed("CAPPI_ROWS") {
            self.rows = v;
        }
        if let Some(v) = parsed("CAPPI_COLS") {
            self.cols = v;
        }
        if let Some(v) = parsed("CAPPI_LEVELS") {
            self.levels = v;
        }
        if let Some(v) = parsed("CAPPI_SKIP_LEVELS") {
            self.skip_levels = v;
        }
        if let Ok(val) = std::env::var("CAPPI_EXTENT") {
            if let Ok(extent) = BoundingBox::from_csv_string(&val) {
                self.extent = extent;
            }
        }

        self
    }

    /// Number of bytes a decompressed file must have.
    pub fn expected_bytes(&self) -> usize {
        self.levels * self.rows * self.cols * std::mem::size_of::<f32>()
    }

    pub fn validate(&self) -> CappiResult<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(CappiError::InvalidConfig(format!(
                "grid must be non-empty, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.levels == 0 {
            return Err(CappiError::InvalidConfig("levels must be > 0".to_string()));
        }
        if self.skip_levels >= self.levels {
            return Err(CappiError::InvalidConfig(format!(
                "skip_levels ({}) must be smaller than levels ({})",
                self.skip_levels, self.levels
            )));
        }
        if !self.extent.is_valid() {
            return Err(CappiError::InvalidConfig(format!(
                "invalid extent {:?}",
                self.extent
            )));
        }
        Ok(())
    }
}
