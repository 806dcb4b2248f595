//! Common test fixtures for storm-profile tests.
//!
//! This module provides pre-defined radar grids, timestamps and manifest
//! snippets shared by the workspace tests.

/// Radar grid definitions for testing.
pub mod radar {
    /// Extent of the SIPAM Manaus CAPPI product (min_lon, min_lat, max_lon, max_lat).
    pub const MANAUS_EXTENT: (f64, f64, f64, f64) = (-62.0, -5.0, -58.0, -1.0);

    /// Operational CAPPI grid size.
    pub const CAPPI_WIDTH: usize = 500;
    pub const CAPPI_HEIGHT: usize = 500;

    /// Levels in a raw CAPPI file (2 to 16 km, 1 km spacing).
    pub const CAPPI_LEVELS: usize = 15;

    /// A small grid over the same extent with an exact power-of-two resolution.
    pub const SMALL_WIDTH: usize = 64;
    pub const SMALL_HEIGHT: usize = 64;

    /// No-data sentinel of the CAPPI product.
    pub const SENTINEL: f32 = -99.0;
}

/// Common time values for testing.
pub mod time {
    /// CAPPI file name of a wet season scan (2014-03-02T14:24:00Z).
    pub const REFERENCE_FILE: &str = "cappi_201403021424.dat.gz";

    /// Nominal interval between radar volumes in seconds.
    pub const SCAN_INTERVAL_SECS: i64 = 720;
}

/// Storm cell names and JSON snippets.
pub mod cells {
    pub const CELL_NAME: &str = "fam-0001";

    /// Lightning strokes file with two strokes near the grid centre and one far away.
    pub const STROKES_JSON: &str = r#"[
  {"lon": -60.0, "lat": -3.0},
  {"lon": -60.01, "lat": -2.99},
  {"lon": -58.5, "lat": -1.5}
]"#;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_file_embeds_time() {
        assert!(time::REFERENCE_FILE.contains("201403021424"));
    }
}
