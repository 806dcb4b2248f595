//! Persisted column layout of a storm-cell profile.
//!
//! One [`ProfileRecord`] per (cell, timestamp). Array columns hold NPY
//! packed `i16` arrays; in JSON they travel base64-encoded.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::aggregator::ProfileSummary;
use crate::config::AggregatorConfig;
use crate::error::Result;
use crate::packing::{encode_counts, npy, ScaledGrid};
use crate::types::Grid;

/// Output row for one storm cell at one timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub name: String,
    pub timestamp: DateTime<Utc>,

    /// VIL x 10^4, packed.
    #[serde(with = "packed_bytes")]
    pub vil_kgm2: Bytes,
    /// VII x 10^4, packed.
    #[serde(with = "packed_bytes")]
    pub vii_kgm2: Bytes,
    /// VIWL x 10^4, packed.
    #[serde(with = "packed_bytes")]
    pub viwl_kgm2: Bytes,
    /// CFAD counts, packed.
    #[serde(with = "packed_bytes")]
    pub z_freq: Bytes,

    pub maxvil_kgm2: f64,
    pub maxvii_kgm2: f64,
    pub maxviwl_kgm2: f64,

    pub echotop_0: f64,
    pub echotop_20: f64,
    pub echotop_40: f64,

    /// Lightning strokes inside the cell, when a stroke file was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lightning: Option<u32>,
}

impl ProfileRecord {
    /// Encode a summary into its storage columns.
    ///
    /// Overflow handling follows `config.overflow_policy`; saturated cells
    /// are logged.
    pub fn from_summary(
        name: impl Into<String>,
        timestamp: DateTime<Utc>,
        summary: &ProfileSummary,
        config: &AggregatorConfig,
    ) -> Result<Self> {
        let name = name.into();
        let scale = config.storage_scale;
        let policy = config.overflow_policy;

        let vil = ScaledGrid::encode(&summary.vil, scale, policy)?;
        let vii = ScaledGrid::encode(&summary.vii, scale, policy)?;
        let viwl = ScaledGrid::encode(&summary.viwl, scale, policy)?;
        let cfad = encode_counts(&summary.cfad, policy)?;

        for (column, grid) in [
            ("vil_kgm2", &vil),
            ("vii_kgm2", &vii),
            ("viwl_kgm2", &viwl),
            ("z_freq", &cfad),
        ] {
            if grid.saturated > 0 {
                warn!(
                    cell = %name,
                    %timestamp,
                    column,
                    saturated = grid.saturated,
                    "Values clamped to i16 range"
                );
            }
        }

        Ok(Self {
            name,
            timestamp,
            vil_kgm2: vil.to_packed(),
            vii_kgm2: vii.to_packed(),
            viwl_kgm2: viwl.to_packed(),
            z_freq: cfad.to_packed(),
            maxvil_kgm2: summary.max_vil,
            maxvii_kgm2: summary.max_vii,
            maxviwl_kgm2: summary.max_viwl,
            echotop_0: summary.echotop_0,
            echotop_20: summary.echotop_20,
            echotop_40: summary.echotop_40,
            lightning: None,
        })
    }

    pub fn with_lightning(mut self, strokes: Option<u32>) -> Self {
        self.lightning = strokes;
        self
    }

    /// Physical VIL grid (kg/m^2).
    pub fn vil(&self, scale: f64) -> Result<Grid<f64>> {
        Ok(ScaledGrid::from_packed(&self.vil_kgm2, scale)?.decode())
    }

    /// Physical VII grid (kg/m^2).
    pub fn vii(&self, scale: f64) -> Result<Grid<f64>> {
        Ok(ScaledGrid::from_packed(&self.vii_kgm2, scale)?.decode())
    }

    /// Physical VIWL grid (kg/m^2).
    pub fn viwl(&self, scale: f64) -> Result<Grid<f64>> {
        Ok(ScaledGrid::from_packed(&self.viwl_kgm2, scale)?.decode())
    }

    /// CFAD counts as stored.
    pub fn cfad(&self) -> Result<Grid<i16>> {
        npy::unpack(&self.z_freq)
    }
}

mod packed_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD
            .decode(text.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::VerticalProfileAggregator;
    use crate::volume::{MaskedVolume, RadarVolume};
    use chrono::TimeZone;
    use storm_common::GridShape;

    fn summary() -> ProfileSummary {
        let shape = GridShape::new(3, 2);
        let volume = RadarVolume::new(vec![Grid::filled(shape, 10.0), Grid::filled(shape, 30.0)])
            .unwrap();
        VerticalProfileAggregator::new(AggregatorConfig::default())
            .unwrap()
            .aggregate(&MaskedVolume::unmasked(volume))
            .unwrap()
    }

    #[test]
    fn test_record_columns_decode() {
        let summary = summary();
        let ts = Utc.with_ymd_and_hms(2014, 3, 2, 14, 24, 0).unwrap();
        let record =
            ProfileRecord::from_summary("cell-1", ts, &summary, &AggregatorConfig::default())
                .unwrap();

        let vil = record.vil(10_000.0).unwrap();
        assert_eq!(vil.shape(), summary.vil.shape());
        for (a, b) in vil.data.iter().zip(&summary.vil.data) {
            assert!((a - b).abs() <= 0.5e-4);
        }

        let cfad = record.cfad().unwrap();
        assert_eq!(cfad.height, 2);
        assert_eq!(cfad.get(0, 4), Some(6));
        assert_eq!(record.maxvil_kgm2, summary.max_vil);
    }

    #[test]
    fn test_json_round_trip() {
        let ts = Utc.with_ymd_and_hms(2014, 3, 2, 14, 24, 0).unwrap();
        let record =
            ProfileRecord::from_summary("cell-1", ts, &summary(), &AggregatorConfig::default())
                .unwrap()
                .with_lightning(Some(4));

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"lightning\":4"));
        let back: ProfileRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_lightning_omitted_when_absent() {
        let ts = Utc.with_ymd_and_hms(2014, 3, 2, 14, 24, 0).unwrap();
        let record =
            ProfileRecord::from_summary("cell-1", ts, &summary(), &AggregatorConfig::default())
                .unwrap();
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("lightning"));
    }
}
