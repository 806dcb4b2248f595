//! Vertically integrated liquid, ice and warm-layer liquid water.
//!
//! Each adjacent level pair contributes `mean^(4/7)` of its NaN-aware mean
//! reflectivity. The whole column feeds VIL, layers from `vii_min_level`
//! up feed VII (with the ice scaling inside the power), and layers up to
//! `viwl_max_level` feed VIWL. Layers between the two thresholds only
//! count towards VIL.
//!
//! A layer whose lower or upper level has no valid pixel at all inside the
//! footprint contributes zero everywhere; partial gaps fall back to the
//! NaN-aware mean.
//!
//! The mean is taken on dBZ values directly, not on linear Z.

use serde::Serialize;

use crate::config::AggregatorConfig;
use crate::types::Grid;
use crate::volume::MaskedVolume;

/// Exponent of the reflectivity-to-mass relation.
pub const MASS_EXPONENT: f64 = 4.0 / 7.0;

/// Liquid water coefficient of the VIL relation.
pub const VIL_COEFFICIENT: f64 = 3.44e-6;

/// Factor applied to the mean reflectivity inside the VII power.
pub const VII_REFLECTIVITY_FACTOR: f64 = 5.28e-18 / 720.0;

/// Density of ice (kg/m^3).
pub const ICE_DENSITY: f64 = 917.0;

/// Intercept parameter of the ice particle size distribution (m^-4).
pub const ICE_INTERCEPT: f64 = 4.0e6;

/// g to kg scaling applied to every integrated quantity.
pub const UNIT_SCALE: f64 = 1000.0;

/// Integrated water grids in kg/m^2, one value per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegratedWater {
    pub vil: Grid<f64>,
    pub vii: Grid<f64>,
    pub viwl: Grid<f64>,
}

/// Multiplier turning the raw VIL/VIWL sums into kg/m^2.
pub fn liquid_scale() -> f64 {
    VIL_COEFFICIENT * UNIT_SCALE
}

/// Multiplier turning the raw VII sum into kg/m^2.
pub fn ice_scale() -> f64 {
    std::f64::consts::PI * ICE_DENSITY * ICE_INTERCEPT.powf(3.0 / 7.0) * UNIT_SCALE
}

/// NaN-aware mean of two reflectivities. Both missing gives zero.
#[inline]
pub fn layer_mean(lower: Option<f32>, upper: Option<f32>) -> f64 {
    match (lower, upper) {
        (Some(a), Some(b)) => (a as f64 + b as f64) / 2.0,
        (Some(a), None) => a as f64,
        (None, Some(b)) => b as f64,
        (None, None) => 0.0,
    }
}

/// `value^(4/7)`; non-positive values contribute nothing.
#[inline]
fn mass_term(value: f64) -> f64 {
    if value > 0.0 {
        value.powf(MASS_EXPONENT)
    } else {
        0.0
    }
}

/// Integrate the masked volume column by column.
///
/// Volumes with fewer than two levels yield all-zero grids; the
/// aggregator rejects them before getting here.
pub fn compute_integrated(volume: &MaskedVolume, config: &AggregatorConfig) -> IntegratedWater {
    let shape = volume.shape();
    let mut vil = Grid::filled(shape, 0.0f64);
    let mut vii = Grid::filled(shape, 0.0f64);
    let mut viwl = Grid::filled(shape, 0.0f64);

    let has_data: Vec<bool> = (0..volume.level_count())
        .map(|level| volume.valid_values(level).next().is_some())
        .collect();

    for layer in 0..volume.level_count().saturating_sub(1) {
        if !(has_data[layer] && has_data[layer + 1]) {
            continue;
        }
        let to_vii = layer >= config.vii_min_level;
        let to_viwl = !to_vii && layer <= config.viwl_max_level;

        for idx in 0..shape.len() {
            let mean = layer_mean(volume.value(layer, idx), volume.value(layer + 1, idx));
            let term = mass_term(mean);
            if to_vii {
                vii.data[idx] += mass_term(VII_REFLECTIVITY_FACTOR * mean);
            } else if to_viwl {
                viwl.data[idx] += term;
            }
            vil.data[idx] += term;
        }
    }

    let liquid = liquid_scale();
    let ice = ice_scale();
    vil.data.iter_mut().for_each(|v| *v *= liquid);
    viwl.data.iter_mut().for_each(|v| *v *= liquid);
    vii.data.iter_mut().for_each(|v| *v *= ice);

    IntegratedWater { vil, vii, viwl }
}
