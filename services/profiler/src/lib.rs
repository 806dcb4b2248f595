//! Batch driver that turns tracked storm cells into stored profiles.
//!
//! Two jobs are exposed:
//!
//! - `profile`: read a manifest of (cell, CAPPI file, polygon) entries and
//!   write one [`ProfileRecord`](profile_processor::ProfileRecord) per line
//! - `lifecycle`: read tracked families and write their rates and
//!   classification

pub mod batch;
pub mod config;
pub mod lifecycle;
pub mod manifest;

pub use batch::{write_records, BatchReport, ProfileBatch};
pub use config::{BatchConfig, LoggingConfig, ProfilerConfig};
pub use lifecycle::{load_families, summarize_all, write_summaries};
pub use manifest::{load_manifest, ManifestEntry};
