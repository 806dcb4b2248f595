//! Time derivatives along a storm family's life.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LifecycleError, Result};
use crate::observation::Observation;

/// Rates of change between an observation and the one before it.
///
/// The first observation of a family has every rate set to `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleRates {
    pub timestamp: DateTime<Utc>,
    /// Normalized area expansion, `(dA/dt) / A` in 1/s.
    pub nae_s_1: Option<f64>,
    /// Lightning strokes per minute.
    pub lightning_str_min: Option<f64>,
    /// Echo-top rise rates in km/min.
    pub echotop0_km_min: Option<f64>,
    pub echotop20_km_min: Option<f64>,
    pub echotop40_km_min: Option<f64>,
}

impl LifecycleRates {
    fn initial(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            nae_s_1: None,
            lightning_str_min: None,
            echotop0_km_min: None,
            echotop20_km_min: None,
            echotop40_km_min: None,
        }
    }
}

/// Derive lifecycle rates for time-ordered observations.
///
/// NAE is `None` when the current area is zero; the lightning rate is
/// `None` when either count is missing.
pub fn derive_rates(observations: &[Observation]) -> Result<Vec<LifecycleRates>> {
    let mut rates = Vec::with_capacity(observations.len());
    let Some(first) = observations.first() else {
        return Ok(rates);
    };
    rates.push(LifecycleRates::initial(first.timestamp));

    for (index, pair) in observations.windows(2).enumerate() {
        let (prev, curr) = (&pair[0], &pair[1]);
        let dt = (curr.timestamp - prev.timestamp).num_milliseconds() as f64 / 1000.0;
        if dt <= 0.0 {
            return Err(LifecycleError::NonIncreasingTime {
                index: index + 1,
                previous: prev.timestamp,
                current: curr.timestamp,
            });
        }

        let per_minute = |delta: f64| delta / dt * 60.0;
        let nae = (curr.area_px != 0.0).then(|| (curr.area_px - prev.area_px) / curr.area_px / dt);
        let lightning = match (prev.lightning, curr.lightning) {
            (Some(a), Some(b)) => Some(per_minute(b as f64 - a as f64)),
            _ => None,
        };

        rates.push(LifecycleRates {
            timestamp: curr.timestamp,
            nae_s_1: nae,
            lightning_str_min: lightning,
            echotop0_km_min: Some(per_minute(curr.echotop_0 - prev.echotop_0)),
            echotop20_km_min: Some(per_minute(curr.echotop_20 - prev.echotop_20)),
            echotop40_km_min: Some(per_minute(curr.echotop_40 - prev.echotop_40)),
        });
    }

    Ok(rates)
}
