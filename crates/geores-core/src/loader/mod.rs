// crates/geores-core/src/loader/mod.rs

//! # Data Loader
//!
//! Handles the Physical Layer (I/O, Decompression) and the GeoNames dump
//! formats. Index construction lives in [`crate::memory`].

pub mod common_io;
pub mod geonames;
pub mod snapshot;

pub use common_io::{open_stream, CompressionMode};
pub use geonames::{for_each_record, read_alternate_names, AlternateName, ReadStats};
pub use snapshot::SNAPSHOT_SUFFIX;
