//! Reader for raw CAPPI radar volumes.
//!
//! A CAPPI file holds `levels x rows x cols` little-endian float32
//! reflectivities (dBZ), optionally gzip-compressed, with row 0 at the
//! southern edge and `-99.0` marking missing data. Reading produces a
//! north-up [`RadarVolume`](profile_processor::RadarVolume) with NaN for
//! missing pixels and the lowest level(s) discarded, plus the
//! [`GeoTransform`](storm_common::GeoTransform) needed to rasterize storm
//! polygons onto it.
//!
//! Timestamps are carried in file names (`...YYYYmmddHHMM...`); see
//! [`storm_common::timestamp_from_filename`].

pub mod config;
pub mod error;
pub mod reader;

pub use config::CappiConfig;
pub use error::{CappiError, CappiResult};
pub use reader::{decode_cappi, read_cappi, CappiVolume};
