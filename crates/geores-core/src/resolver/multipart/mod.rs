// crates/geores-core/src/resolver/multipart/mod.rs

//! # Multi-part resolver
//!
//! Resolves an explicit hierarchy of names, such as
//! `("Reston", "Virginia", "United States")`, to one record whose ancestry
//! is consistent with every part.
//!
//! Two entry points:
//!
//! - [`MultipartLocationResolver::resolve_multipart_location`] takes a fixed
//!   city / state / country triple and resolves each part independently,
//!   constrained by the broader ones.
//! - [`MultipartLocationResolver::resolve_location`] takes any number of
//!   terms, narrowest first, and searches every way of assigning them to
//!   administrative levels, tolerating skipped levels.

use log::debug;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::error::Result;
use crate::gazetteer::{AncestryMode, FuzzyMode, Gazetteer, QueryBuilder};
use crate::model::{CountryCode, ResolvedLocation};

mod level;
mod matched;
mod scorer;

pub use level::SearchLevel;
pub use matched::{Match, MatchedLocation, SearchResult};
pub use scorer::{DefaultScorer, Scorer};

/// Hits fetched per query.
const MAX_RESULTS: usize = 200;

/// The parts of a city / state / country triple that could be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedMultipartLocation {
    pub city: Option<ResolvedLocation>,
    pub state: Option<ResolvedLocation>,
    pub country: Option<ResolvedLocation>,
}

/// Input names of a city / state / country triple. Blank parts are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MultipartLocationName {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl MultipartLocationName {
    pub fn new(city: impl Into<String>, state: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
            country: country.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MultipartLocationResolver {
    gazetteer: Arc<dyn Gazetteer>,
    scorer: Arc<dyn Scorer>,
}

impl MultipartLocationResolver {
    pub fn new(gazetteer: Arc<dyn Gazetteer>) -> Self {
        Self::with_scorer(gazetteer, Arc::new(DefaultScorer))
    }

    pub fn with_scorer(gazetteer: Arc<dyn Gazetteer>, scorer: Arc<dyn Scorer>) -> Self {
        Self { gazetteer, scorer }
    }

    pub fn gazetteer(&self) -> &Arc<dyn Gazetteer> {
        &self.gazetteer
    }

    fn base_query(fuzzy: bool) -> QueryBuilder {
        let mut builder = QueryBuilder::new();
        builder
            .fuzzy_mode(if fuzzy { FuzzyMode::NoExact } else { FuzzyMode::Off })
            .ancestry_mode(AncestryMode::OnCreate)
            .include_historical(true)
            .max_results(MAX_RESULTS);
        builder
    }

    // -----------------------------------------------------------------------
    // FIXED CITY / STATE / COUNTRY
    // -----------------------------------------------------------------------

    /// Resolves each part of `name`, keeping only records consistent with
    /// the broader parts.
    ///
    /// The most populous matching city wins; the state is the first matching
    /// state it descends from and the country the first matching country the
    /// city (or, without a city, the state) descends from.
    pub fn resolve_multipart_location(
        &self,
        name: &MultipartLocationName,
        fuzzy: bool,
    ) -> Result<ResolvedMultipartLocation> {
        let mut query = Self::base_query(fuzzy);

        // 1. countries: only true top-level divisions
        query.location(&name.country).add_country_codes();
        let countries: Vec<ResolvedLocation> = self
            .gazetteer
            .closest_locations(&query.build())?
            .into_iter()
            .filter(|c| c.geoname().geoname().is_top_level_admin_division())
            .collect();

        // 2. states below any found country
        let mut found_countries: HashSet<Option<CountryCode>> = HashSet::new();
        query.location(&name.state).clear_feature_codes().add_admin_codes();
        for country in &countries {
            query.add_parent_ids([country.geoname().id()]);
            found_countries.insert(country.geoname().geoname().primary_country_code());
        }
        let states = self.gazetteer.closest_locations(&query.build())?;

        // 3. cities below the first state of each country, else below the
        //    countries, else anywhere
        query.location(&name.city).clear_feature_codes().add_city_codes();
        if !states.is_empty() {
            let mut state_countries: HashSet<Option<CountryCode>> = HashSet::new();
            query.clear_parent_ids();
            for state in &states {
                let code = state.geoname().geoname().primary_country_code();
                if state_countries.insert(code) {
                    query.add_parent_ids([state.geoname().id()]);
                }
                if !found_countries.is_empty() && found_countries == state_countries {
                    break;
                }
            }
        }
        let cities = self.gazetteer.closest_locations(&query.build())?;

        // 4. pick a consistent triple
        let city = cities.into_iter().next();

        let state = match &city {
            None => states.first().cloned(),
            Some(city) => states
                .iter()
                .find(|s| city.geoname().is_descendant_of(&**s.geoname()))
                .cloned(),
        };

        let country = match city.as_ref().or(state.as_ref()) {
            None => countries.first().cloned(),
            Some(best) => countries
                .iter()
                .find(|c| best.geoname().is_descendant_of(&**c.geoname()))
                .cloned(),
        };

        Ok(ResolvedMultipartLocation { city, state, country })
    }

    // -----------------------------------------------------------------------
    // GENERIC N-PART
    // -----------------------------------------------------------------------

    /// Resolves a comma-separated name such as `"Reston, Virginia, US"`.
    pub fn resolve_location_str(&self, location: &str, fuzzy: bool) -> Result<Option<ResolvedLocation>> {
        let parts: Vec<&str> = location.split(',').collect();
        self.resolve_location(fuzzy, &parts)
    }

    /// Resolves `parts`, given narrowest first.
    ///
    /// Returns the most specific location of the best-scoring candidate, but
    /// only if that candidate matched every term or is fully specified.
    pub fn resolve_location<S: AsRef<str>>(&self, fuzzy: bool, parts: &[S]) -> Result<Option<ResolvedLocation>> {
        // broadest first
        let terms: Vec<String> = parts
            .iter()
            .rev()
            .map(|p| p.as_ref().trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        if terms.is_empty() {
            return Ok(None);
        }

        let mut candidates: Vec<MatchedLocation> = Vec::new();
        let mut stack: Vec<SearchResult> = Vec::new();
        let mut query = Self::base_query(fuzzy);
        self.find_candidates(
            &mut candidates,
            &terms,
            Some(SearchLevel::Country),
            &mut stack,
            &mut query,
        )?;

        let mut scored: Vec<(f64, MatchedLocation)> = candidates
            .into_iter()
            .map(|c| (self.scorer.score(&terms, &c), c))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        debug!("Found {} candidates", scored.len());
        for (score, candidate) in &scored {
            debug!("[{:.3}] {}", score, candidate);
        }

        let best = scored.into_iter().next().map(|(_, c)| c);
        Ok(best
            .filter(|b| b.is_fully_specified() || b.match_count() == terms.len())
            .and_then(|b| b.most_specific_match().map(|m| m.location().clone())))
    }

    /// Depth-first search over (level, remaining terms).
    ///
    /// A term with no hits at a level is retried one level narrower, and
    /// the next term is tried at the same level. A term with hits is pushed
    /// and the search continues with the next term one level narrower; the
    /// same term is then also tried one level narrower without it.
    fn find_candidates(
        &self,
        candidates: &mut Vec<MatchedLocation>,
        terms: &[String],
        level: Option<SearchLevel>,
        stack: &mut Vec<SearchResult>,
        query: &mut QueryBuilder,
    ) -> Result<()> {
        let (Some(term), Some(level)) = (terms.first(), level) else {
            if let Some(candidate) = MatchedLocation::from_results(stack) {
                debug!("Adding candidate {}", candidate);
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
            return Ok(());
        };
        let next_terms = &terms[1..];

        level.apply(query).location(term).clear_parent_ids();
        let last = stack.last();
        if let Some(last) = last {
            query.parent_ids(last.parent_ids.iter().copied());
        }
        let results = self.gazetteer.closest_locations(&query.build())?;

        if results.is_empty() {
            self.find_candidates(candidates, terms, level.narrow(), stack, query)?;
            return self.find_candidates(candidates, next_terms, Some(level), stack, query);
        }

        // filters for the next level: the best hit under each distinct parent
        let mut parent_ids = BTreeSet::new();
        let mut parent_codes = HashSet::new();
        let mut found_parents: HashSet<Option<String>> = HashSet::new();
        for location in &results {
            let geoname = location.geoname().geoname();
            let parent_code = last.and_then(|l| l.level.code(geoname));
            if last.is_none() || !found_parents.contains(&parent_code) {
                parent_ids.insert(geoname.id());
                parent_codes.insert(level.code(geoname));
                found_parents.insert(parent_code);
            }
            if last.is_some_and(|l| found_parents == l.parent_codes) {
                break;
            }
        }

        stack.push(SearchResult {
            level,
            locations: results,
            parent_ids,
            parent_codes,
        });
        self.find_candidates(candidates, next_terms, level.narrow(), stack, query)?;
        stack.pop();
        self.find_candidates(candidates, terms, level.narrow(), stack, query)
    }
}
