//! Contoured Frequency by Altitude Diagram (CFAD) histograms.
//!
//! Each level's non-missing reflectivities are counted in fixed-width dBZ
//! bins. Values below the first edge land in the first bin and values at
//! or above the last edge land in the last bin, so the counts of a level
//! always add up to its number of valid pixels.

use serde::{Deserialize, Serialize};

use crate::config::AggregatorConfig;
use crate::types::Grid;
use crate::volume::MaskedVolume;

/// Bin layout of a CFAD histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CfadBins {
    /// Lower edge of the first bin (dBZ).
    pub min_dbz: f32,
    /// Width of every bin (dBZ).
    pub width: f32,
    /// Number of bins.
    pub count: usize,
}

impl CfadBins {
    pub fn from_config(config: &AggregatorConfig) -> Self {
        Self {
            min_dbz: config.cfad_min_dbz,
            width: config.cfad_bin_width,
            count: config.cfad_bin_count(),
        }
    }

    /// Bin index of a reflectivity value, clamped to the edge bins.
    #[inline]
    pub fn index_of(&self, dbz: f32) -> usize {
        let pos = ((dbz - self.min_dbz) / self.width).floor();
        if pos <= 0.0 {
            0
        } else {
            (pos as usize).min(self.count - 1)
        }
    }

    /// Lower edge of bin `i`.
    pub fn lower_edge(&self, i: usize) -> f32 {
        self.min_dbz + i as f32 * self.width
    }
}

/// Count valid reflectivities per (level, bin).
///
/// The result has one row per level and one column per bin.
pub fn compute_cfad(volume: &MaskedVolume, bins: &CfadBins) -> Grid<u32> {
    let levels = volume.level_count();
    let mut counts = vec![0u32; levels * bins.count];

    for level in 0..levels {
        let row = &mut counts[level * bins.count..(level + 1) * bins.count];
        for value in volume.valid_values(level) {
            row[bins.index_of(value)] += 1;
        }
    }

    Grid {
        data: counts,
        width: bins.count,
        height: levels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::RadarVolume;
    use storm_common::GridShape;

    fn default_bins() -> CfadBins {
        CfadBins::from_config(&AggregatorConfig::default())
    }

    #[test]
    fn test_bin_edges_are_half_open() {
        let bins = default_bins();
        assert_eq!(bins.index_of(-10.0), 0);
        assert_eq!(bins.index_of(-5.0001), 0);
        assert_eq!(bins.index_of(-5.0), 1);
        assert_eq!(bins.index_of(0.0), 2);
        assert_eq!(bins.index_of(64.999), 14);
        assert_eq!(bins.index_of(65.0), 15);
        assert_eq!(bins.lower_edge(2), 0.0);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let bins = default_bins();
        assert_eq!(bins.index_of(-30.0), 0);
        assert_eq!(bins.index_of(70.0), 15);
        assert_eq!(bins.index_of(85.0), 15);
    }

    #[test]
    fn test_counts_sum_to_valid_pixels() {
        let nan = f32::NAN;
        let l0 = Grid::from_rows(vec![vec![-20.0, 0.0, 5.0], vec![nan, 70.0, 45.5]]).unwrap();
        let l1 = Grid::filled(GridShape::new(3, 2), nan);
        let volume = MaskedVolume::unmasked(RadarVolume::new(vec![l0, l1]).unwrap());

        let cfad = compute_cfad(&volume, &default_bins());
        assert_eq!(cfad.height, 2);
        assert_eq!(cfad.width, 16);

        let level0: u32 = cfad.row(0).iter().sum();
        assert_eq!(level0 as usize, volume.valid_count(0));
        assert_eq!(level0, 5);
        assert_eq!(cfad.get(0, 0), Some(1));
        assert_eq!(cfad.get(0, 2), Some(1));
        assert_eq!(cfad.get(0, 3), Some(1));
        assert_eq!(cfad.get(0, 11), Some(1));
        assert_eq!(cfad.get(0, 15), Some(1));

        assert!(cfad.row(1).iter().all(|&c| c == 0));
    }
}
