// crates/geores-core/src/gazetteer/query.rs

//! Query parameters for [`Gazetteer::closest_locations`](super::Gazetteer::closest_locations).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::GeoError;
use crate::model::{FeatureCode, LocationOccurrence};

/// Political entities and top-level territories.
pub const COUNTRY_CODES: &[FeatureCode] = &[
    FeatureCode::PCL,
    FeatureCode::PCLD,
    FeatureCode::PCLF,
    FeatureCode::PCLH,
    FeatureCode::PCLI,
    FeatureCode::PCLIX,
    FeatureCode::PCLS,
    FeatureCode::TERRI,
];

/// Administrative divisions that can take part in an ancestry chain.
pub const ANCESTRY_ADMIN_CODES: &[FeatureCode] = &[
    FeatureCode::ADM1,
    FeatureCode::ADM1H,
    FeatureCode::ADM2,
    FeatureCode::ADM2H,
    FeatureCode::ADM3,
    FeatureCode::ADM3H,
    FeatureCode::ADM4,
    FeatureCode::ADM4H,
];

/// All sub-national administrative divisions.
pub const ADMIN_CODES: &[FeatureCode] = &[
    FeatureCode::ADM1,
    FeatureCode::ADM1H,
    FeatureCode::ADM2,
    FeatureCode::ADM2H,
    FeatureCode::ADM3,
    FeatureCode::ADM3H,
    FeatureCode::ADM4,
    FeatureCode::ADM4H,
    FeatureCode::ADM5,
    FeatureCode::ADMD,
    FeatureCode::ADMDH,
    FeatureCode::TERR,
    FeatureCode::PRSH,
];

/// Populated places.
pub const CITY_CODES: &[FeatureCode] = &[
    FeatureCode::PPL,
    FeatureCode::PPLA,
    FeatureCode::PPLA2,
    FeatureCode::PPLA3,
    FeatureCode::PPLA4,
    FeatureCode::PPLC,
    FeatureCode::PPLCH,
    FeatureCode::PPLF,
    FeatureCode::PPLG,
    FeatureCode::PPLH,
    FeatureCode::PPLL,
    FeatureCode::PPLQ,
    FeatureCode::PPLR,
    FeatureCode::PPLS,
    FeatureCode::PPLW,
    FeatureCode::PPLX,
    FeatureCode::STLMT,
];

/// When edit-distance-tolerant matching supplements exact matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FuzzyMode {
    /// Exact matches only.
    #[default]
    Off,
    /// Fuzzy matching only when there are no exact matches.
    NoExact,
    /// Fuzzy matches top up the exact matches to the requested maximum.
    Fill,
}

impl FuzzyMode {
    pub fn use_fuzzy_matching(&self, max_results: usize, exact_results: usize) -> bool {
        match self {
            FuzzyMode::Off => false,
            FuzzyMode::NoExact => exact_results == 0,
            FuzzyMode::Fill => exact_results < max_results,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FuzzyMode::Off => "OFF",
            FuzzyMode::NoExact => "NO_EXACT",
            FuzzyMode::Fill => "FILL",
        }
    }
}

/// When a record's parent chain is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AncestryMode {
    /// The whole chain is resolved while the query runs.
    OnCreate,
    /// Each parent is fetched on first access.
    #[default]
    Lazy,
    /// Nothing is fetched until [`Gazetteer::load_ancestry`](super::Gazetteer::load_ancestry) is called.
    Manual,
}

impl AncestryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AncestryMode::OnCreate => "ON_CREATE",
            AncestryMode::Lazy => "LAZY",
            AncestryMode::Manual => "MANUAL",
        }
    }
}

fn normalize_mode(s: &str) -> String {
    s.trim().to_ascii_uppercase().replace('-', "_")
}

impl FromStr for FuzzyMode {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_mode(s).as_str() {
            "OFF" => Ok(FuzzyMode::Off),
            "NO_EXACT" | "NOEXACT" => Ok(FuzzyMode::NoExact),
            "FILL" => Ok(FuzzyMode::Fill),
            _ => Err(GeoError::InvalidParameter(format!("Unknown fuzzy mode: {s}"))),
        }
    }
}

impl FromStr for AncestryMode {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_mode(s).as_str() {
            "ON_CREATE" | "ONCREATE" => Ok(AncestryMode::OnCreate),
            "LAZY" => Ok(AncestryMode::Lazy),
            "MANUAL" => Ok(AncestryMode::Manual),
            _ => Err(GeoError::InvalidParameter(format!("Unknown ancestry mode: {s}"))),
        }
    }
}

impl fmt::Display for FuzzyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AncestryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable gazetteer query. Build one with [`QueryBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct GazetteerQuery {
    occurrence: LocationOccurrence,
    max_results: usize,
    fuzzy_mode: FuzzyMode,
    ancestry_mode: AncestryMode,
    include_historical: bool,
    filter_dupes: bool,
    parent_ids: BTreeSet<i64>,
    feature_codes: HashSet<FeatureCode>,
}

impl GazetteerQuery {
    pub fn occurrence(&self) -> &LocationOccurrence {
        &self.occurrence
    }

    /// Requested result cap; `0` means the gazetteer's default.
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn fuzzy_mode(&self) -> FuzzyMode {
        self.fuzzy_mode
    }

    pub fn ancestry_mode(&self) -> AncestryMode {
        self.ancestry_mode
    }

    pub fn include_historical(&self) -> bool {
        self.include_historical
    }

    pub fn filter_dupes(&self) -> bool {
        self.filter_dupes
    }

    /// Results must descend from at least one of these records.
    pub fn parent_ids(&self) -> &BTreeSet<i64> {
        &self.parent_ids
    }

    /// Results must have one of these codes; empty means any.
    pub fn feature_codes(&self) -> &HashSet<FeatureCode> {
        &self.feature_codes
    }
}

/// Reusable builder for [`GazetteerQuery`].
///
/// ```rust
/// use geores_core::gazetteer::{FuzzyMode, QueryBuilder};
///
/// let query = QueryBuilder::new()
///     .location("Springfield")
///     .max_results(3)
///     .fuzzy_mode(FuzzyMode::Fill)
///     .add_city_codes()
///     .build();
/// assert_eq!(query.max_results(), 3);
/// assert!(query.include_historical());
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    location: Option<LocationOccurrence>,
    max_results: usize,
    fuzzy_mode: FuzzyMode,
    ancestry_mode: AncestryMode,
    include_historical: bool,
    filter_dupes: bool,
    parent_ids: BTreeSet<i64>,
    feature_codes: HashSet<FeatureCode>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            location: None,
            max_results: QueryBuilder::DEFAULT_MAX_RESULTS,
            fuzzy_mode: FuzzyMode::Off,
            ancestry_mode: AncestryMode::Lazy,
            include_historical: true,
            filter_dupes: false,
            parent_ids: BTreeSet::new(),
            feature_codes: HashSet::new(),
        }
    }
}

impl QueryBuilder {
    pub const DEFAULT_MAX_RESULTS: usize = 10;

    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current settings. A missing location yields a query
    /// with empty text, which matches nothing.
    pub fn build(&self) -> GazetteerQuery {
        GazetteerQuery {
            occurrence: self
                .location
                .clone()
                .unwrap_or_else(|| LocationOccurrence::new("", 0)),
            max_results: self.max_results,
            fuzzy_mode: self.fuzzy_mode,
            ancestry_mode: self.ancestry_mode,
            include_historical: self.include_historical,
            filter_dupes: self.filter_dupes,
            parent_ids: self.parent_ids.clone(),
            feature_codes: self.feature_codes.clone(),
        }
    }

    pub fn occurrence(&mut self, occurrence: LocationOccurrence) -> &mut Self {
        self.location = Some(occurrence);
        self
    }

    /// Sets the location by name, at position 0.
    pub fn location(&mut self, name: &str) -> &mut Self {
        self.location = Some(LocationOccurrence::new(name, 0));
        self
    }

    pub fn max_results(&mut self, max: usize) -> &mut Self {
        self.max_results = max;
        self
    }

    pub fn fuzzy_mode(&mut self, mode: FuzzyMode) -> &mut Self {
        self.fuzzy_mode = mode;
        self
    }

    pub fn ancestry_mode(&mut self, mode: AncestryMode) -> &mut Self {
        self.ancestry_mode = mode;
        self
    }

    pub fn include_historical(&mut self, include: bool) -> &mut Self {
        self.include_historical = include;
        self
    }

    pub fn filter_dupes(&mut self, filter: bool) -> &mut Self {
        self.filter_dupes = filter;
        self
    }

    // --- parent ids ---

    pub fn parent_ids(&mut self, ids: impl IntoIterator<Item = i64>) -> &mut Self {
        self.parent_ids = ids.into_iter().collect();
        self
    }

    pub fn add_parent_ids(&mut self, ids: impl IntoIterator<Item = i64>) -> &mut Self {
        self.parent_ids.extend(ids);
        self
    }

    pub fn remove_parent_ids(&mut self, ids: impl IntoIterator<Item = i64>) -> &mut Self {
        for id in ids {
            self.parent_ids.remove(&id);
        }
        self
    }

    pub fn clear_parent_ids(&mut self) -> &mut Self {
        self.parent_ids.clear();
        self
    }

    // --- feature codes ---

    pub fn feature_codes(&mut self, codes: impl IntoIterator<Item = FeatureCode>) -> &mut Self {
        self.feature_codes = codes.into_iter().collect();
        self
    }

    pub fn add_feature_codes(&mut self, codes: impl IntoIterator<Item = FeatureCode>) -> &mut Self {
        self.feature_codes.extend(codes);
        self
    }

    pub fn remove_feature_codes(
        &mut self,
        codes: impl IntoIterator<Item = FeatureCode>,
    ) -> &mut Self {
        for code in codes {
            self.feature_codes.remove(&code);
        }
        self
    }

    pub fn clear_feature_codes(&mut self) -> &mut Self {
        self.feature_codes.clear();
        self
    }

    pub fn add_country_codes(&mut self) -> &mut Self {
        self.add_feature_codes(COUNTRY_CODES.iter().copied())
    }

    pub fn remove_country_codes(&mut self) -> &mut Self {
        self.remove_feature_codes(COUNTRY_CODES.iter().copied())
    }

    pub fn add_admin_codes(&mut self) -> &mut Self {
        self.add_feature_codes(ADMIN_CODES.iter().copied())
    }

    pub fn remove_admin_codes(&mut self) -> &mut Self {
        self.remove_feature_codes(ADMIN_CODES.iter().copied())
    }

    pub fn add_ancestry_admin_codes(&mut self) -> &mut Self {
        self.add_feature_codes(ANCESTRY_ADMIN_CODES.iter().copied())
    }

    pub fn remove_ancestry_admin_codes(&mut self) -> &mut Self {
        self.remove_feature_codes(ANCESTRY_ADMIN_CODES.iter().copied())
    }

    pub fn add_city_codes(&mut self) -> &mut Self {
        self.add_feature_codes(CITY_CODES.iter().copied())
    }

    pub fn remove_city_codes(&mut self) -> &mut Self {
        self.remove_feature_codes(CITY_CODES.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuzzy_mode_decides_when_to_run_fuzzy() {
        assert!(!FuzzyMode::Off.use_fuzzy_matching(5, 0));
        assert!(FuzzyMode::NoExact.use_fuzzy_matching(5, 0));
        assert!(!FuzzyMode::NoExact.use_fuzzy_matching(5, 1));
        assert!(FuzzyMode::Fill.use_fuzzy_matching(5, 4));
        assert!(!FuzzyMode::Fill.use_fuzzy_matching(5, 5));
    }

    #[test]
    fn modes_parse_leniently() {
        assert_eq!("no-exact".parse::<FuzzyMode>().unwrap(), FuzzyMode::NoExact);
        assert_eq!("Fill".parse::<FuzzyMode>().unwrap(), FuzzyMode::Fill);
        assert_eq!("on_create".parse::<AncestryMode>().unwrap(), AncestryMode::OnCreate);
        assert_eq!(" MANUAL ".parse::<AncestryMode>().unwrap(), AncestryMode::Manual);
        assert!("eager".parse::<AncestryMode>().is_err());
        assert_eq!(AncestryMode::OnCreate.to_string(), "ON_CREATE");
    }

    #[test]
    fn builder_defaults_and_code_sets() {
        let mut builder = QueryBuilder::new();
        let query = builder.build();
        assert_eq!(query.occurrence().text, "");
        assert_eq!(query.max_results(), 10);
        assert_eq!(query.fuzzy_mode(), FuzzyMode::Off);
        assert_eq!(query.ancestry_mode(), AncestryMode::Lazy);
        assert!(query.include_historical());
        assert!(!query.filter_dupes());

        builder.add_admin_codes().add_country_codes().remove_admin_codes();
        assert_eq!(builder.build().feature_codes().len(), COUNTRY_CODES.len());

        builder.add_parent_ids([1, 2, 3]).remove_parent_ids([2]);
        let ids: Vec<i64> = builder.build().parent_ids().iter().copied().collect();
        assert_eq!(ids, vec![1, 3]);

        builder.clear_parent_ids().clear_feature_codes();
        let query = builder.build();
        assert!(query.parent_ids().is_empty());
        assert!(query.feature_codes().is_empty());
    }
}
