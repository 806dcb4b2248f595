//! Per-timestamp attributes of tracked storm families.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the tracker linked a cell to the previous time step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TrackEvent {
    SpontaneousGeneration,
    Continuity,
    Split,
    Merge,
    /// Any other label, kept verbatim.
    Other(String),
}

impl TrackEvent {
    /// Parse from the tracker's label (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "SPONTANEOUS_GENERATION" => Self::SpontaneousGeneration,
            "CONTINUITY" => Self::Continuity,
            "SPLIT" => Self::Split,
            "MERGE" => Self::Merge,
            _ => Self::Other(s.trim().to_string()),
        }
    }

    /// The tracker's label.
    pub fn as_str(&self) -> &str {
        match self {
            Self::SpontaneousGeneration => "SPONTANEOUS_GENERATION",
            Self::Continuity => "CONTINUITY",
            Self::Split => "SPLIT",
            Self::Merge => "MERGE",
            Self::Other(s) => s,
        }
    }

    pub fn is_split_or_merge(&self) -> bool {
        matches!(self, Self::Split | Self::Merge)
    }
}

impl From<String> for TrackEvent {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}

impl From<TrackEvent> for String {
    fn from(event: TrackEvent) -> Self {
        event.as_str().to_string()
    }
}

/// One member of a storm family at one timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    /// Cell area in pixels.
    pub area_px: f64,
    /// Maximum reflectivity in dBZ.
    pub max_dbz: f32,
    pub event: TrackEvent,
    /// Lightning strokes inside the cell, if counted.
    #[serde(default)]
    pub lightning: Option<u32>,
    #[serde(default)]
    pub echotop_0: f64,
    #[serde(default)]
    pub echotop_20: f64,
    #[serde(default)]
    pub echotop_40: f64,
}

/// All observations of one tracked family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
    pub name: String,
    pub observations: Vec<Observation>,
}
