// crates/geores-core/src/lib.rs

#[cfg(feature = "json")]
pub mod api; // JSON views
pub mod common;
pub mod config;
pub mod distance;
pub mod error;
pub mod gazetteer; // Query orchestration over any index
pub mod loader; // GeoNames dumps and snapshots
pub mod memory; // The reference index
pub mod model;
pub mod resolver;
pub mod text;
pub mod util;
// Shared raw input (used by the index builder and record parsing)
#[doc(hidden)]
pub mod raw;

// Re-exports
pub use crate::common::IndexStats;
pub use crate::config::{IndexOptions, ResolverConfig};
pub use crate::error::{GeoError, Result};
pub use crate::gazetteer::{
    AncestryMode, FuzzyMode, Gazetteer, GazetteerIndex, GazetteerQuery, IndexGazetteer,
    QueryBuilder,
};
pub use crate::memory::{MemoryIndex, MemoryIndexBuilder};
pub use model::*;
pub use crate::resolver::multipart::{
    MultipartLocationName, MultipartLocationResolver, ResolvedMultipartLocation,
};
pub use crate::resolver::LocationResolver;
