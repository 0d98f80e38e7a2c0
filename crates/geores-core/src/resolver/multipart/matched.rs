// crates/geores-core/src/resolver/multipart/matched.rs
use log::error;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use super::level::SearchLevel;
use crate::model::{Ancestry, ResolvedLocation};

/// Hits for one term at one level, plus the filters handed to the next
/// (narrower) level.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub level: SearchLevel,
    pub locations: Vec<ResolvedLocation>,
    /// Records the next level must descend from.
    pub parent_ids: BTreeSet<i64>,
    /// This level's codes of the records in `parent_ids`.
    pub parent_codes: HashSet<Option<String>>,
}

impl SearchResult {
    pub fn best_location(&self) -> Option<&ResolvedLocation> {
        self.locations.first()
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.best_location() {
            Some(best) => write!(f, "{}: {}", self.level, best),
            None => write!(f, "{}: NULL", self.level),
        }
    }
}

/// The location chosen at one level and its rank in that level's hits.
#[derive(Debug, Clone)]
pub struct Match {
    level: SearchLevel,
    location: ResolvedLocation,
    depth: usize,
}

impl Match {
    pub fn level(&self) -> SearchLevel {
        self.level
    }

    pub fn location(&self) -> &ResolvedLocation {
        &self.location
    }

    /// 0-based position in the level's hit list.
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn key(&self) -> (SearchLevel, i64, usize) {
        (self.level, self.location.geoname().id(), self.depth)
    }
}

impl PartialEq for Match {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Match {}

impl Hash for Match {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// One complete path through the levels: the most specific hit plus every
/// ancestor of it that was also found at its own level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchedLocation {
    matches: BTreeMap<SearchLevel, Match>,
}

impl MatchedLocation {
    /// Builds a candidate from the result stack, innermost result last.
    ///
    /// Returns `None` for an empty stack.
    pub fn from_results(results: &[SearchResult]) -> Option<Self> {
        let top = results.last()?;
        let best = top.best_location()?;

        let mut matches = BTreeMap::new();
        matches.insert(
            top.level,
            Match {
                level: top.level,
                location: best.clone(),
                depth: 0,
            },
        );

        // without a resolved chain there is no way to tell which hit above
        // is the parent of the best one
        if best.geoname().is_ancestry_resolved() {
            let by_level: BTreeMap<SearchLevel, &[ResolvedLocation]> = results
                .iter()
                .map(|r| (r.level, r.locations.as_slice()))
                .collect();

            let mut parent = best.geoname().parent();
            while let Some(node) = parent {
                if let Some(level) = SearchLevel::for_geoname(node.geoname()) {
                    if let Some(hits) = by_level.get(&level) {
                        match hits.iter().position(|h| h.geoname().id() == node.id()) {
                            Some(depth) => {
                                matches.insert(
                                    level,
                                    Match {
                                        level,
                                        location: hits[depth].clone(),
                                        depth,
                                    },
                                );
                            }
                            None => error!(
                                "Missing parent [{}] in search results for match: {}.",
                                node.geoname(),
                                best
                            ),
                        }
                    }
                }
                parent = node.parent();
            }
        }

        Some(Self { matches })
    }

    pub fn get(&self, level: SearchLevel) -> Option<&Match> {
        self.matches.get(&level)
    }

    /// The match at the narrowest level.
    pub fn most_specific_match(&self) -> Option<&Match> {
        self.matches.values().next_back()
    }

    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.values()
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// One match at every level.
    pub fn is_fully_specified(&self) -> bool {
        self.match_count() == SearchLevel::ALL.len()
    }
}

impl fmt::Display for MatchedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Match: { ")?;
        for level in SearchLevel::ALL {
            write!(f, "{}: ", level)?;
            match self.matches.get(&level) {
                Some(m) => write!(
                    f,
                    "[{}] {} (d:{})",
                    m.location.geoname().id(),
                    m.location.geoname().geoname().name(),
                    m.depth
                )?,
                None => f.write_str("NULL")?,
            }
            if level.can_narrow() {
                f.write_str(", ")?;
            }
        }
        f.write_str(" }")
    }
}
