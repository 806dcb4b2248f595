//! The vertical profile aggregator.

use serde::Serialize;
use tracing::debug;

use crate::cfad::{compute_cfad, CfadBins};
use crate::config::AggregatorConfig;
use crate::echotop::{compute_echo_tops, EchoTops};
use crate::error::{ProfileError, Result};
use crate::integrated::compute_integrated;
use crate::types::Grid;
use crate::volume::MaskedVolume;

/// Everything the aggregator derives from one masked volume.
///
/// Water grids are physical values in kg/m^2 and share the shape of one
/// (possibly cropped) level. Echo tops are in km, `0.0` when not found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    /// Counts per (level, dBZ bin).
    pub cfad: Grid<u32>,
    pub vil: Grid<f64>,
    pub vii: Grid<f64>,
    pub viwl: Grid<f64>,
    pub max_vil: f64,
    pub max_vii: f64,
    pub max_viwl: f64,
    pub echotop_0: f64,
    pub echotop_20: f64,
    pub echotop_40: f64,
}

impl ProfileSummary {
    pub fn echo_tops(&self) -> EchoTops {
        EchoTops {
            echotop_0: self.echotop_0,
            echotop_20: self.echotop_20,
            echotop_40: self.echotop_40,
        }
    }
}

/// Computes CFAD, integrated water and echo tops for storm cells.
///
/// Stateless apart from its configuration; one instance can be shared by
/// any number of worker threads.
#[derive(Debug, Clone)]
pub struct VerticalProfileAggregator {
    config: AggregatorConfig,
    bins: CfadBins,
}

impl VerticalProfileAggregator {
    /// Create an aggregator, validating the configuration.
    pub fn new(config: AggregatorConfig) -> Result<Self> {
        config.validate()?;
        let bins = CfadBins::from_config(&config);
        Ok(Self { config, bins })
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn bins(&self) -> &CfadBins {
        &self.bins
    }

    /// Summarize one masked volume.
    ///
    /// Echo tops are taken from the full footprint. CFAD and integrated
    /// water are computed after the optional crop to the reference level.
    pub fn aggregate(&self, volume: &MaskedVolume) -> Result<ProfileSummary> {
        let levels = volume.level_count();
        if levels < 2 {
            return Err(ProfileError::InsufficientData { levels });
        }

        let tops = compute_echo_tops(volume, &self.config);

        let cropped;
        let working = match self.config.crop_reference_level {
            Some(reference) => {
                cropped = volume.clone().crop_to_reference(reference)?;
                &cropped
            }
            None => volume,
        };

        let cfad = compute_cfad(working, &self.bins);
        let water = compute_integrated(working, &self.config);

        let summary = ProfileSummary {
            max_vil: water.vil.max_value(),
            max_vii: water.vii.max_value(),
            max_viwl: water.viwl.max_value(),
            cfad,
            vil: water.vil,
            vii: water.vii,
            viwl: water.viwl,
            echotop_0: tops.echotop_0,
            echotop_20: tops.echotop_20,
            echotop_40: tops.echotop_40,
        };

        debug!(
            levels,
            shape = %working.shape(),
            max_vil = summary.max_vil,
            max_vii = summary.max_vii,
            echotop_40 = summary.echotop_40,
            "Aggregated vertical profile"
        );

        Ok(summary)
    }
}
