//! Configuration for the vertical profile aggregator.

use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};

/// Configuration for [`crate::VerticalProfileAggregator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Altitude of level 0 in km.
    pub base_height_km: f64,

    /// Vertical spacing between consecutive levels in km.
    pub level_spacing_km: f64,

    /// Lower edge of the first CFAD bin (dBZ).
    pub cfad_min_dbz: f32,

    /// Upper edge of the last CFAD bin (dBZ).
    pub cfad_max_dbz: f32,

    /// Width of each CFAD bin (dBZ).
    pub cfad_bin_width: f32,

    /// Echo-top thresholds in dBZ, reported as echotop_0/20/40.
    pub echo_top_thresholds: [f32; 3],

    /// Lowest layer index that contributes to VII.
    pub vii_min_level: usize,

    /// Highest layer index that contributes to VIWL.
    pub viwl_max_level: usize,

    /// Level used to trim all-missing rows/columns. `None` disables cropping.
    pub crop_reference_level: Option<usize>,

    /// Multiplier applied before narrowing VIL/VII/VIWL to i16.
    pub storage_scale: f64,

    /// What to do when a scaled value does not fit in i16.
    pub overflow_policy: OverflowPolicy,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            base_height_km: 2.0,
            level_spacing_km: 1.0,
            cfad_min_dbz: -10.0,
            cfad_max_dbz: 70.0,
            cfad_bin_width: 5.0,
            echo_top_thresholds: [0.0, 20.0, 40.0],
            vii_min_level: 7,
            viwl_max_level: 5,
            crop_reference_level: Some(1),
            storage_scale: 10_000.0,
            overflow_policy: OverflowPolicy::Saturate,
        }
    }
}

impl AggregatorConfig {
    /// Load configuration from `PROFILE_*` environment variables on top of the defaults.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `PROFILE_*` environment variables to an existing configuration.
    pub fn with_env_overrides(mut self) -> Self {
        fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
            std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
        }

        if let Some(v) = parsed("PROFILE_BASE_HEIGHT_KM") {
            self.base_height_km = v;
        }
        if let Some(v) = parsed("PROFILE_LEVEL_SPACING_KM") {
            self.level_spacing_km = v;
        }
        if let Some(v) = parsed("PROFILE_CFAD_MIN_DBZ") {
            self.cfad_min_dbz = v;
        }
        if let Some(v) = parsed("PROFILE_CFAD_MAX_DBZ") {
            self.cfad_max_dbz = v;
        }
        if let Some(v) = parsed("PROFILE_CFAD_BIN_WIDTH") {
            self.cfad_bin_width = v;
        }
        if let Some(v) = parsed("PROFILE_VII_MIN_LEVEL") {
            self.vii_min_level = v;
        }
        if let Some(v) = parsed("PROFILE_VIWL_MAX_LEVEL") {
            self.viwl_max_level = v;
        }
        if let Ok(val) = std::env::var("PROFILE_CROP_REFERENCE_LEVEL") {
            self.crop_reference_level = match val.trim().to_lowercase().as_str() {
                "" | "none" | "off" => None,
                other => other.parse().ok().or(self.crop_reference_level),
            };
        }
        if let Some(v) = parsed("PROFILE_STORAGE_SCALE") {
            self.storage_scale = v;
        }
        if let Ok(val) = std::env::var("PROFILE_OVERFLOW_POLICY") {
            self.overflow_policy = OverflowPolicy::from_str(&val);
        }

        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.level_spacing_km > 0.0) {
            return Err(ProfileError::invalid_config("level_spacing_km must be > 0"));
        }
        if !self.base_height_km.is_finite() {
            return Err(ProfileError::invalid_config("base_height_km must be finite"));
        }
        if !(self.cfad_bin_width > 0.0) {
            return Err(ProfileError::invalid_config("cfad_bin_width must be > 0"));
        }
        if !(self.cfad_max_dbz > self.cfad_min_dbz) {
            return Err(ProfileError::invalid_config(
                "cfad_max_dbz must be greater than cfad_min_dbz",
            ));
        }
        if !(self.storage_scale > 0.0) || !self.storage_scale.is_finite() {
            return Err(ProfileError::invalid_config("storage_scale must be > 0"));
        }
        if self.echo_top_thresholds.iter().any(|t| !t.is_finite()) {
            return Err(ProfileError::invalid_config(
                "echo_top_thresholds must be finite",
            ));
        }
        Ok(())
    }

    /// Altitude in km of `level`.
    pub fn level_height_km(&self, level: usize) -> f64 {
        self.base_height_km + level as f64 * self.level_spacing_km
    }

    /// Number of CFAD bins covering `[cfad_min_dbz, cfad_max_dbz)`.
    pub fn cfad_bin_count(&self) -> usize {
        let span = (self.cfad_max_dbz - self.cfad_min_dbz) / self.cfad_bin_width;
        (span.ceil() as usize).max(1)
    }
}

/// Behaviour when a scaled value falls outside the i16 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Fail the encode with [`ProfileError::ScaledOverflow`].
    Reject,
    /// Clamp to `i16::MIN..=i16::MAX` and report how many cells were clamped.
    #[default]
    Saturate,
}

impl OverflowPolicy {
    /// Parse from string (case-insensitive). Unknown values fall back to the default.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "reject" | "error" => Self::Reject,
            _ => Self::Saturate,
        }
    }
}
