// crates/geores-core/src/model/resolved.rs
use std::fmt;
use std::hash::{Hash, Hasher};

use super::ancestry::GeoNameRef;
use super::occurrence::LocationOccurrence;
use crate::distance::damerau_levenshtein_ci;

/// A location occurrence matched to a gazetteer record.
///
/// Two resolved locations are equal when they point at the same record,
/// whatever text or name produced the match.
#[derive(Debug, Clone)]
pub struct ResolvedLocation {
    location: LocationOccurrence,
    geoname: GeoNameRef,
    matched_name: String,
    fuzzy: bool,
    confidence: f32,
}

impl ResolvedLocation {
    pub fn new(
        location: LocationOccurrence,
        geoname: GeoNameRef,
        matched_name: impl Into<String>,
        fuzzy: bool,
    ) -> Self {
        let matched_name = matched_name.into();
        // exact matches are fully trusted; fuzzy ones decay with edit distance
        let confidence = if fuzzy {
            1.0 / (damerau_levenshtein_ci(&location.text, &matched_name) as f32 + 0.5)
        } else {
            1.0
        };
        Self {
            location,
            geoname,
            matched_name,
            fuzzy,
            confidence,
        }
    }

    pub fn location(&self) -> &LocationOccurrence {
        &self.location
    }

    pub fn geoname(&self) -> &GeoNameRef {
        &self.geoname
    }

    /// The index-side name the occurrence was matched against.
    pub fn matched_name(&self) -> &str {
        &self.matched_name
    }

    pub fn is_fuzzy(&self) -> bool {
        self.fuzzy
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}

impl PartialEq for ResolvedLocation {
    fn eq(&self, other: &Self) -> bool {
        self.geoname.id() == other.geoname.id()
    }
}

impl Eq for ResolvedLocation {}

impl Hash for ResolvedLocation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.geoname.id().hash(state);
    }
}

impl fmt::Display for ResolvedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Resolved \"{}\" as: \"{}\" {{{}}}, position: {}, confidence: {:.6}, fuzzy: {}",
            self.location.text,
            self.matched_name,
            self.geoname.geoname(),
            self.location.position,
            self.confidence,
            self.fuzzy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeoName;
    use std::collections::HashSet;

    const BOSTON: &str = "4930956\tBoston\tBoston\tBostonas,Bostono\t42.35843\t-71.05977\tP\tPPLA\tUS\t\tMA\t025\t\t\t667137\t14\t38\tAmerica/New_York\t2017-05-23";
    const SPRINGFIELD: &str = "4951788\tSpringfield\tSpringfield\t\t42.10148\t-72.58981\tP\tPPLA2\tUS\t\tMA\t013\t\t\t155929\t21\t23\tAmerica/New_York\t2017-05-23";

    #[test]
    fn confidence_depends_on_fuzziness() {
        let boston: GeoNameRef = GeoName::parse_record(BOSTON, None).unwrap();
        let exact = ResolvedLocation::new(LocationOccurrence::new("Boston", 0), boston.clone(), "boston", false);
        assert_eq!(exact.confidence(), 1.0);

        let fuzzy = ResolvedLocation::new(LocationOccurrence::new("Bostn", 0), boston.clone(), "boston", true);
        assert!((fuzzy.confidence() - 1.0 / 1.5).abs() < f32::EPSILON);

        let same = ResolvedLocation::new(LocationOccurrence::new("BOSTON", 0), boston, "Boston", true);
        assert_eq!(same.confidence(), 2.0);
    }

    #[test]
    fn equality_uses_geoname_only() {
        let boston: GeoNameRef = GeoName::parse_record(BOSTON, None).unwrap();
        let springfield: GeoNameRef = GeoName::parse_record(SPRINGFIELD, None).unwrap();

        let a = ResolvedLocation::new(LocationOccurrence::new("Boston", 0), boston.clone(), "boston", false);
        let b = ResolvedLocation::new(LocationOccurrence::new("Bostono", 42), boston, "bostono", true);
        let c = ResolvedLocation::new(LocationOccurrence::new("Boston", 0), springfield, "springfield", false);

        assert_eq!(a, b);
        assert_ne!(a, c);
        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
