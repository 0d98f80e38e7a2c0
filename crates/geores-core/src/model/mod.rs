// crates/geores-core/src/model/mod.rs

//! Domain model: gazetteer records, their ancestry, and resolution results.

pub mod ancestry;
pub mod country;
pub mod feature;
pub mod geoname;
pub mod occurrence;
pub mod resolved;

pub use ancestry::{Ancestry, GeoNameRef, LazyAncestryGeoName};
pub use country::CountryCode;
pub use feature::{FeatureClass, FeatureCode};
pub use geoname::GeoName;
pub use occurrence::LocationOccurrence;
pub use resolved::ResolvedLocation;
