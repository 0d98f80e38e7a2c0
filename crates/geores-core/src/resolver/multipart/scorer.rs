// crates/geores-core/src/resolver/multipart/scorer.rs
use std::fmt;

use super::level::SearchLevel;
use super::matched::MatchedLocation;
use crate::distance::damerau_levenshtein_ci;

/// Ranks multi-part candidates; higher is better.
pub trait Scorer: Send + Sync + fmt::Debug {
    fn score(&self, terms: &[String], candidate: &MatchedLocation) -> f64;

    fn minimum_score(&self) -> f64 {
        0.0
    }

    fn maximum_score(&self) -> f64 {
        1.0
    }
}

/// Weighted blend of term coverage, level importance, name similarity and
/// hit rank, in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultScorer;

impl DefaultScorer {
    const MATCH_RATIO_WEIGHT: f64 = 0.40;
    const COMPONENT_SCORE_WEIGHT: f64 = 0.25;
    const DL_DISTANCE_WEIGHT: f64 = 0.20;
    const SEARCH_DEPTH_WEIGHT: f64 = 0.15;

    /// Level weights when more than one level matched.
    fn component_weight(level: SearchLevel) -> u32 {
        match level {
            SearchLevel::City => 5,
            SearchLevel::Country => 4,
            SearchLevel::Admin1 => 3,
            _ => 1,
        }
    }

    /// Level weights when a single level matched.
    fn single_component_weight(level: SearchLevel) -> u32 {
        match level {
            SearchLevel::Country => 5,
            SearchLevel::Admin1 => 4,
            SearchLevel::City => 3,
            SearchLevel::Admin2 => 2,
            _ => 1,
        }
    }

    fn max_weight(weight: fn(SearchLevel) -> u32) -> u32 {
        SearchLevel::ALL.into_iter().map(weight).sum()
    }
}

impl Scorer for DefaultScorer {
    fn score(&self, terms: &[String], candidate: &MatchedLocation) -> f64 {
        let match_count = candidate.match_count();
        if match_count == 0 || terms.is_empty() {
            return self.minimum_score();
        }
        let weight: fn(SearchLevel) -> u32 = if match_count > 1 {
            Self::component_weight
        } else {
            Self::single_component_weight
        };

        let mut total_dl = 0.0;
        let mut component = 0u32;
        let mut total_depth = 0.0;
        for m in candidate.matches() {
            let dl = damerau_levenshtein_ci(&m.location().location().text, m.location().matched_name());
            total_dl += if dl > 0 { 1.0 / dl as f64 } else { 1.0 };
            component += weight(m.level());
            // depths are 0-based
            total_depth += 1.0 / (m.depth() + 1) as f64;
        }

        let count = match_count as f64;
        let match_ratio = count / terms.len() as f64;
        let avg_dl = total_dl / count;
        let component_score = component as f64 / Self::max_weight(weight) as f64;
        let avg_depth = total_depth / count;

        Self::MATCH_RATIO_WEIGHT * match_ratio
            + Self::DL_DISTANCE_WEIGHT * avg_dl
            + Self::COMPONENT_SCORE_WEIGHT * component_score
            + Self::SEARCH_DEPTH_WEIGHT * avg_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeoName, GeoNameRef, LocationOccurrence, ResolvedLocation};
    use crate::resolver::multipart::SearchResult;
    use std::collections::{BTreeSet, HashSet};

    const VA: &str = "6254928\tVirginia\tVirginia\t\t37.54812\t-77.44675\tA\tADM1\tUS\t\tVA\t\t\t\t8001024\t\t95\tAmerica/New_York\t2016-06-14";

    fn candidate(text: &str, matched: &str) -> MatchedLocation {
        let geoname: GeoNameRef = GeoName::parse_record(VA, None).unwrap();
        let hit = ResolvedLocation::new(LocationOccurrence::new(text, 0), geoname, matched, text != matched);
        MatchedLocation::from_results(&[SearchResult {
            level: SearchLevel::Admin1,
            locations: vec![hit],
            parent_ids: BTreeSet::new(),
            parent_codes: HashSet::new(),
        }])
        .unwrap()
    }

    #[test]
    fn perfect_single_level_match() {
        let terms = vec!["Virginia".to_string()];
        let score = DefaultScorer.score(&terms, &candidate("Virginia", "Virginia"));
        let expected = 0.40 + 0.20 + 0.25 * (4.0 / 17.0) + 0.15;
        assert!((score - expected).abs() < 1e-9, "{score} vs {expected}");
    }

    #[test]
    fn typos_and_missing_terms_lower_the_score() {
        let one = vec!["Virginia".to_string()];
        let two = vec!["Virginia".to_string(), "Reston".to_string()];
        let exact = DefaultScorer.score(&one, &candidate("Virginia", "Virginia"));
        let typo = DefaultScorer.score(&one, &candidate("Virgna", "Virginia"));
        let partial = DefaultScorer.score(&two, &candidate("Virginia", "Virginia"));
        assert!(typo < exact);
        assert!(partial < exact);
        assert!((exact - partial - 0.20).abs() < 1e-9);
    }
}
