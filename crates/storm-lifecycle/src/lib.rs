//! Lifecycle analysis of tracked storm families.
//!
//! Works on the per-timestamp records of a family (area, peak reflectivity,
//! tracker event, lightning, echo tops) and produces:
//!
//! - lightning stroke counts inside a cell outline ([`count_strikes`])
//! - rates of change between consecutive observations ([`derive_rates`])
//! - a categorical classification of the whole family ([`classify`])

pub mod classify;
pub mod error;
pub mod lightning;
pub mod observation;
pub mod rates;

pub use classify::{
    classify, AreaClass, Classification, ClassificationConfig, DurationClass, IntensityClass,
    LifeClass, LightningClass, Season, TimeOfDay,
};
pub use error::{LifecycleError, Result};
pub use lightning::{count_strikes, Stroke};
pub use observation::{Family, Observation, TrackEvent};
pub use rates::{derive_rates, LifecycleRates};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Rates and classification of one family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilySummary {
    pub name: String,
    pub rates: Vec<LifecycleRates>,
    pub classification: Classification,
}

/// Sort a family's observations by time, then derive rates and classify it.
pub fn summarize_family(family: &Family, config: &ClassificationConfig) -> Result<FamilySummary> {
    let mut observations = family.observations.clone();
    observations.sort_by_key(|o| o.timestamp);

    let rates = derive_rates(&observations)?;
    let classification = classify(&family.name, &observations, config)?;

    debug!(
        family = %family.name,
        observations = observations.len(),
        ?classification,
        "Summarized storm family"
    );

    Ok(FamilySummary {
        name: family.name.clone(),
        rates,
        classification,
    })
}
