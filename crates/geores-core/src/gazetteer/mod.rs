// crates/geores-core/src/gazetteer/mod.rs

//! # Gazetteer
//!
//! Turns a location occurrence into ranked, ancestry-aware candidate
//! records. [`IndexGazetteer`] implements the orchestration on top of any
//! [`GazetteerIndex`].

use std::fmt;

use crate::error::Result;
use crate::model::{GeoNameRef, ResolvedLocation};

mod engine;
pub mod index;
pub mod query;

pub use engine::IndexGazetteer;
pub use index::{GazetteerIndex, IndexFilter, IndexHit, IndexQuery, IndexRecord, SearchCursor};
pub use query::{
    AncestryMode, FuzzyMode, GazetteerQuery, QueryBuilder, ADMIN_CODES, ANCESTRY_ADMIN_CODES,
    CITY_CODES, COUNTRY_CODES,
};

/// Query-time access to gazetteer records.
pub trait Gazetteer: Send + Sync + fmt::Debug {
    /// Best matches for the query's occurrence, best first.
    fn closest_locations(&self, query: &GazetteerQuery) -> Result<Vec<ResolvedLocation>>;

    /// Looks a record up by id, attaching ancestry according to `mode`.
    fn geoname(&self, id: i64, mode: AncestryMode) -> Result<Option<GeoNameRef>>;

    /// Resolves the full ancestry of every unresolved record in `geonames`,
    /// fetching each distinct ancestor once.
    fn load_ancestry(&self, geonames: &[GeoNameRef]) -> Result<()>;

    /// [`Gazetteer::geoname`] with lazily-loaded ancestry.
    fn geoname_by_id(&self, id: i64) -> Result<Option<GeoNameRef>> {
        self.geoname(id, AncestryMode::Lazy)
    }
}
