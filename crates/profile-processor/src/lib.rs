//! Vertical Profile Aggregation for Storm Cells
//!
//! This crate turns a multi-level CAPPI reflectivity volume, clipped to a
//! storm-cell footprint, into the per-cell summaries stored by the tracking
//! database:
//!
//! - **CFAD**: per-level histograms of reflectivity in fixed dBZ bins
//! - **VIL / VII / VIWL**: vertically integrated liquid, ice and warm-layer
//!   liquid water, one value per grid column
//! - **Echo tops**: highest level reaching 0, 20 and 40 dBZ
//!
//! # Architecture
//!
//! ```text
//! RadarVolume + FootprintMask
//!      │
//!      ▼
//! MaskedVolume
//!      │
//!      ▼
//! VerticalProfileAggregator::aggregate()
//!      │
//!      ├─► Echo tops (full footprint)
//!      │
//!      ├─► Crop to reference level (optional)
//!      │         │
//!      │         ├─► CFAD counts
//!      │         │
//!      │         └─► VIL / VII / VIWL + maxima
//!      │
//!      ▼
//! ProfileSummary
//!      │
//!      ▼
//! ProfileRecord::from_summary()  (x10^4 → i16 → NPY bytes)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use profile_processor::{
//!     AggregatorConfig, FootprintMask, MaskedVolume, ProfileRecord, VerticalProfileAggregator,
//! };
//!
//! let aggregator = VerticalProfileAggregator::new(AggregatorConfig::default())?;
//! let mask = FootprintMask::from_geo_polygon(volume.shape(), &polygon, &transform)?;
//! let summary = aggregator.aggregate(&MaskedVolume::new(volume, mask)?)?;
//! let record = ProfileRecord::from_summary("cell-1", timestamp, &summary, aggregator.config())?;
//! ```

pub mod aggregator;
pub mod cfad;
pub mod config;
pub mod echotop;
pub mod error;
pub mod footprint;
pub mod integrated;
pub mod packing;
pub mod record;
pub mod types;
pub mod volume;

// Re-export commonly used types at crate root
pub use aggregator::{ProfileSummary, VerticalProfileAggregator};
pub use cfad::{compute_cfad, CfadBins};
pub use config::{AggregatorConfig, OverflowPolicy};
pub use echotop::{compute_echo_tops, EchoTops};
pub use error::{ProfileError, Result};
pub use footprint::FootprintMask;
pub use integrated::{compute_integrated, IntegratedWater};
pub use packing::{encode_counts, npy, ScaledGrid};
pub use record::ProfileRecord;
pub use types::Grid;
pub use volume::{MaskedVolume, RadarVolume, NO_DATA_SENTINEL};
