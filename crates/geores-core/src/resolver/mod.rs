// crates/geores-core/src/resolver/mod.rs

//! # Resolvers
//!
//! [`LocationResolver`] picks one record per occurrence in free text, using
//! the other occurrences of the same document as context.
//! [`MultipartLocationResolver`] resolves explicit city/state/country style
//! hierarchies.

use log::debug;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::ResolverConfig;
use crate::error::Result;
use crate::gazetteer::{FuzzyMode, Gazetteer, QueryBuilder};
use crate::model::{CountryCode, LocationOccurrence, ResolvedLocation};
use crate::util::chunkify_list;

pub mod multipart;

pub use multipart::{MultipartLocationResolver, ResolvedMultipartLocation};

/// Nationality and resident adjectives that entity taggers often mistake
/// for place names, one per line.
const DEMONYMS: &str = include_str!("../../data/demonyms.txt");

/// Candidate depth the heuristic starts from.
const INITIAL_CANDIDATE_DEPTH: usize = 3;

/// Resolves location occurrences from one document.
#[derive(Debug, Clone)]
pub struct LocationResolver {
    gazetteer: Arc<dyn Gazetteer>,
    demonyms: HashSet<String>,
}

impl LocationResolver {
    pub fn new(gazetteer: Arc<dyn Gazetteer>) -> Self {
        Self::with_demonyms(gazetteer, DEMONYMS.lines())
    }

    /// Uses `demonyms` instead of the built-in list.
    pub fn with_demonyms<I, S>(gazetteer: Arc<dyn Gazetteer>, demonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let demonyms = demonyms
            .into_iter()
            .map(|d| d.as_ref().trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();
        Self { gazetteer, demonyms }
    }

    pub fn gazetteer(&self) -> &Arc<dyn Gazetteer> {
        &self.gazetteer
    }

    /// Exact, case-sensitive match against the demonym list.
    pub fn is_demonym(&self, occurrence: &LocationOccurrence) -> bool {
        self.demonyms.contains(&occurrence.text)
    }

    /// Resolves `occurrences` with the default settings.
    pub fn resolve(&self, occurrences: &[LocationOccurrence], fuzzy: bool) -> Result<Vec<ResolvedLocation>> {
        self.resolve_locations(
            occurrences,
            &ResolverConfig {
                fuzzy,
                ..ResolverConfig::default()
            },
        )
    }

    /// Picks the best record for each occurrence.
    ///
    /// Occurrences that are demonyms or match nothing are left out of the
    /// result; everything else comes back in input order.
    pub fn resolve_locations(
        &self,
        occurrences: &[LocationOccurrence],
        config: &ResolverConfig,
    ) -> Result<Vec<ResolvedLocation>> {
        let filtered: Vec<&LocationOccurrence> = occurrences
            .iter()
            .filter(|occurrence| !self.is_demonym(occurrence))
            .collect();
        if filtered.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::new();
        builder
            .max_results(config.max_hit_depth)
            .fuzzy_mode(if config.fuzzy { FuzzyMode::NoExact } else { FuzzyMode::Off })
            .ancestry_mode(config.ancestry_mode)
            .include_historical(true);

        if config.max_hit_depth <= 1 {
            // no context: most relevant, most populous hit wins
            let mut resolved = Vec::with_capacity(filtered.len());
            for occurrence in filtered {
                let candidates = self
                    .gazetteer
                    .closest_locations(&builder.occurrence(occurrence.clone()).build())?;
                if let Some(best) = candidates.into_iter().next() {
                    resolved.push(best);
                }
            }
            return Ok(resolved);
        }

        let mut all_candidates: Vec<Vec<ResolvedLocation>> = Vec::with_capacity(filtered.len());
        for occurrence in filtered {
            let candidates = self
                .gazetteer
                .closest_locations(&builder.occurrence(occurrence.clone()).build())?;
            if !candidates.is_empty() {
                all_candidates.push(candidates);
            }
        }
        if all_candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut best = Vec::with_capacity(all_candidates.len());
        for chunk in chunkify_list(&all_candidates, config.max_context_window)? {
            best.extend(pick_best(chunk));
        }
        Ok(best)
    }
}

/// Chooses one candidate per occurrence, favoring combinations that share
/// countries and first-level divisions.
///
/// Combinations of the top `depth` candidates are scored, starting at a
/// depth of 3 and going one deeper for as long as the best score strictly
/// improves. This is a heuristic; deeper combinations are never explored
/// once a level fails to beat the previous one.
pub fn pick_best(all_candidates: &[Vec<ResolvedLocation>]) -> Vec<ResolvedLocation> {
    if all_candidates.is_empty() || all_candidates.iter().any(Vec::is_empty) {
        return all_candidates.iter().filter_map(|c| c.first().cloned()).collect();
    }

    let mut best: Vec<&ResolvedLocation> = Vec::new();
    let mut new_max = 0f32;
    let mut depth = INITIAL_CANDIDATE_DEPTH;

    loop {
        let old_max = new_max;
        for combo in Combinations::new(all_candidates, depth) {
            let score = combination_score(&combo, all_candidates.len(), depth);
            if score > new_max {
                new_max = score;
                best = combo;
            }
        }
        debug!("Candidate depth {}: best score {:.4}", depth, new_max);
        depth += 1;
        if new_max <= old_max {
            break;
        }
    }

    best.into_iter().cloned().collect()
}

/// `(occurrences / (countries + states)) / depth`.
fn combination_score(combo: &[&ResolvedLocation], occurrences: usize, depth: usize) -> f32 {
    let mut countries: HashSet<Option<CountryCode>> = HashSet::new();
    let mut states: HashSet<String> = HashSet::new();
    for location in combo {
        let geoname = location.geoname().geoname();
        let country = geoname.primary_country_code();
        countries.insert(country);
        states.insert(format!(
            "{}{}",
            country.as_ref().map_or("NULL", |c| c.as_str()),
            geoname.admin1_code()
        ));
    }
    (occurrences as f32 / (countries.len() + states.len()) as f32) / depth as f32
}

/// Cross product of the first `depth` candidates of each list. The first
/// list varies slowest.
struct Combinations<'a> {
    lists: &'a [Vec<ResolvedLocation>],
    limits: Vec<usize>,
    positions: Vec<usize>,
    done: bool,
}

impl<'a> Combinations<'a> {
    fn new(lists: &'a [Vec<ResolvedLocation>], depth: usize) -> Self {
        let limits: Vec<usize> = lists.iter().map(|l| l.len().min(depth)).collect();
        let done = limits.iter().any(|&l| l == 0);
        Self {
            lists,
            positions: vec![0; limits.len()],
            limits,
            done,
        }
    }
}

impl<'a> Iterator for Combinations<'a> {
    type Item = Vec<&'a ResolvedLocation>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let combo = self
            .positions
            .iter()
            .zip(self.lists)
            .map(|(&pos, list)| &list[pos])
            .collect();

        // odometer step, last position fastest
        let mut idx = self.positions.len();
        loop {
            if idx == 0 {
                self.done = true;
                break;
            }
            idx -= 1;
            self.positions[idx] += 1;
            if self.positions[idx] < self.limits[idx] {
                break;
            }
            self.positions[idx] = 0;
        }
        Some(combo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeoName, GeoNameRef};

    fn candidate(text: &str, line: &str) -> ResolvedLocation {
        let geoname: GeoNameRef = GeoName::parse_record(line, None).unwrap();
        ResolvedLocation::new(LocationOccurrence::new(text, 0), geoname, text, false)
    }

    const SPRINGFIELD_MO: &str = "4409896\tSpringfield\tSpringfield\t\t37.21533\t-93.29824\tP\tPPLA2\tUS\t\tMO\t077\t\t\t166810\t\t396\tAmerica/Chicago\t2017-05-23";
    const SPRINGFIELD_IL: &str = "4250542\tSpringfield\tSpringfield\t\t39.80172\t-89.64371\tP\tPPLA\tUS\t\tIL\t167\t\t\t116250\t\t179\tAmerica/Chicago\t2017-05-23";
    const SPRINGFIELD_MA: &str = "4951788\tSpringfield\tSpringfield\t\t42.10148\t-72.58981\tP\tPPLA2\tUS\t\tMA\t013\t\t\t154341\t\t21\tAmerica/New_York\t2017-05-23";
    const BOSTON: &str = "4930956\tBoston\tBoston\t\t42.35843\t-71.05977\tP\tPPLA\tUS\t\tMA\t025\t\t\t617594\t\t14\tAmerica/New_York\t2016-07-06";
    const BOSTON_UK: &str = "2655138\tBoston\tBoston\t\t52.97633\t-0.02664\tP\tPPL\tGB\t\tENG\tH7\t\t\t41340\t\t8\tEurope/London\t2017-06-12";

    #[test]
    fn shared_state_beats_population() {
        let springfields = vec![
            candidate("Springfield", SPRINGFIELD_MO),
            candidate("Springfield", SPRINGFIELD_IL),
            candidate("Springfield", SPRINGFIELD_MA),
        ];
        let bostons = vec![candidate("Boston", BOSTON), candidate("Boston", BOSTON_UK)];

        let best = pick_best(&[bostons, springfields]);
        let ids: Vec<i64> = best.iter().map(|r| r.geoname().id()).collect();
        assert_eq!(ids, vec![4930956, 4951788]);
    }

    #[test]
    fn first_list_varies_slowest() {
        let a = vec![candidate("a", SPRINGFIELD_MO), candidate("a", SPRINGFIELD_IL)];
        let b = vec![candidate("b", BOSTON), candidate("b", BOSTON_UK)];
        let lists = [a, b];
        let order: Vec<(i64, i64)> = Combinations::new(&lists, 3)
            .map(|c| (c[0].geoname().id(), c[1].geoname().id()))
            .collect();
        assert_eq!(
            order,
            vec![(4409896, 4930956), (4409896, 2655138), (4250542, 4930956), (4250542, 2655138)]
        );
        assert_eq!(Combinations::new(&lists, 1).count(), 1);
    }

    #[test]
    fn score_counts_distinct_countries_and_states() {
        let boston = candidate("Boston", BOSTON);
        let springfield = candidate("Springfield", SPRINGFIELD_MA);
        let boston_uk = candidate("Boston", BOSTON_UK);
        // one country + one state
        assert_eq!(combination_score(&[&boston, &springfield], 2, 3), (2.0 / 2.0) / 3.0);
        // two countries + two states
        assert_eq!(combination_score(&[&boston_uk, &springfield], 2, 3), (2.0 / 4.0) / 3.0);
    }
}
