//! Categorical classification of storm families.

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{LifecycleError, Result};
use crate::observation::Observation;

/// Thresholds used by [`classify`].
///
/// Every boundary is inclusive on the "small/intense/short" side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Largest peak area (px) still classified as small.
    pub small_area_max_px: f64,
    /// Peak reflectivity (dBZ) from which a family is intense.
    pub intense_min_dbz: f32,
    /// Longest duration (s) still classified as short.
    pub short_max_secs: i64,
    /// Longest duration (s) still classified as medium.
    pub medium_max_secs: i64,
    /// First UTC hour of initiation counted as diurnal.
    pub diurnal_start_hour: u32,
    /// Last UTC hour of initiation counted as diurnal.
    pub diurnal_end_hour: u32,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            small_area_max_px: 1000.0,
            intense_min_dbz: 55.0,
            short_max_secs: 3600,
            medium_max_secs: 3 * 3600,
            diurnal_start_hour: 6,
            diurnal_end_hour: 17,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaClass {
    Small,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityClass {
    Intense,
    NotIntense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeClass {
    WithSplitMerge,
    NoSplitMerge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationClass {
    Short,
    Medium,
    Long,
}

/// Amazon seasons by month of initiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    /// January to March.
    Wet,
    /// August to October.
    Dry,
    /// November and December.
    DryToWet,
    Unclassified,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            1..=3 => Self::Wet,
            8..=10 => Self::Dry,
            11 | 12 => Self::DryToWet,
            _ => Self::Unclassified,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Diurnal,
    Nocturnal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightningClass {
    WithLightning,
    WithoutLightning,
}

/// Every category assigned to one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub area: AreaClass,
    pub intensity: IntensityClass,
    pub life: LifeClass,
    pub duration: DurationClass,
    pub season: Season,
    pub time_of_day: TimeOfDay,
    pub lightning: LightningClass,
}

/// Classify a family from all of its observations.
///
/// Initiation is the earliest timestamp and duration runs from the earliest
/// to the latest one, so the input need not be sorted.
pub fn classify(
    name: &str,
    observations: &[Observation],
    config: &ClassificationConfig,
) -> Result<Classification> {
    let first = observations
        .iter()
        .map(|o| o.timestamp)
        .min()
        .ok_or_else(|| LifecycleError::EmptyFamily(name.to_string()))?;
    let last = observations
        .iter()
        .map(|o| o.timestamp)
        .max()
        .unwrap_or(first);

    let max_area = observations
        .iter()
        .map(|o| o.area_px)
        .fold(f64::NEG_INFINITY, f64::max);
    let max_dbz = observations
        .iter()
        .map(|o| o.max_dbz)
        .fold(f32::NEG_INFINITY, f32::max);
    let strokes: u64 = observations
        .iter()
        .filter_map(|o| o.lightning)
        .map(u64::from)
        .sum();
    let duration = (last - first).num_seconds();
    let hour = first.hour();

    Ok(Classification {
        area: if max_area <= config.small_area_max_px {
            AreaClass::Small
        } else {
            AreaClass::Large
        },
        intensity: if max_dbz >= config.intense_min_dbz {
            IntensityClass::Intense
        } else {
            IntensityClass::NotIntense
        },
        life: if observations.iter().any(|o| o.event.is_split_or_merge()) {
            LifeClass::WithSplitMerge
        } else {
            LifeClass::NoSplitMerge
        },
        duration: if duration <= config.short_max_secs {
            DurationClass::Short
        } else if duration <= config.medium_max_secs {
            DurationClass::Medium
        } else {
            DurationClass::Long
        },
        season: Season::from_month(first.month()),
        time_of_day: if (config.diurnal_start_hour..=config.diurnal_end_hour).contains(&hour) {
            TimeOfDay::Diurnal
        } else {
            TimeOfDay::Nocturnal
        },
        lightning: if strokes > 0 {
            LightningClass::WithLightning
        } else {
            LightningClass::WithoutLightning
        },
    })
}
