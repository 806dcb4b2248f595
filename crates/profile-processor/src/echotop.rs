//! Echo-top heights.

use serde::{Deserialize, Serialize};

use crate::config::AggregatorConfig;
use crate::volume::MaskedVolume;

/// Echo-top altitudes in km for the three configured thresholds.
///
/// A value of `0.0` means the threshold was never reached.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EchoTops {
    pub echotop_0: f64,
    pub echotop_20: f64,
    pub echotop_40: f64,
}

/// Scan from the top level down to level 1 and record, per threshold, the
/// altitude of the highest level where any valid pixel reaches it.
///
/// Level 0 is never scanned.
pub fn compute_echo_tops(volume: &MaskedVolume, config: &AggregatorConfig) -> EchoTops {
    let thresholds = config.echo_top_thresholds;
    let mut found: [Option<usize>; 3] = [None; 3];

    for level in (1..volume.level_count()).rev() {
        if found.iter().all(Option::is_some) {
            break;
        }
        let peak = volume
            .valid_values(level)
            .fold(f32::NEG_INFINITY, f32::max);
        for (slot, &threshold) in found.iter_mut().zip(&thresholds) {
            if slot.is_none() && peak >= threshold {
                *slot = Some(level);
            }
        }
    }

    let height = |slot: Option<usize>| slot.map_or(0.0, |l| config.level_height_km(l));
    EchoTops {
        echotop_0: height(found[0]),
        echotop_20: height(found[1]),
        echotop_40: height(found[2]),
    }
}
