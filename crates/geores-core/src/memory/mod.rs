// crates/geores-core/src/memory/mod.rs

//! # In-memory index
//!
//! Gazetteer names behind [`GazetteerIndex`]. Every distinct name of a
//! record is its own document, so a hit reports which name matched.
//!
//! Names are folded with [`fold_key`](crate::text::fold_key) and split on
//! whitespace. Exact queries match a contiguous token phrase; fuzzy queries
//! match every query token against some name token within a length-scaled
//! edit distance. Hits are ranked by score, then by a population sort key
//! that boosts cities and countries, then by insertion order.
//!
//! Records and names are the serialized state. Term lookup goes through a
//! tantivy index built from them on the first search.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::common::IndexStats;
use crate::distance::{damerau_levenshtein, is_edit_distance_1};
use crate::error::Result;
use crate::gazetteer::{GazetteerIndex, IndexFilter, IndexHit, IndexQuery, IndexRecord, SearchCursor};
use crate::model::FeatureCode;
use crate::text::tokenize;
use terms::TermIndex;

mod builder;
mod terms;

pub use builder::{IndexOptions, MemoryIndexBuilder};

/// A record plus the fields the index filters and sorts on.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    record: IndexRecord,
    /// Parent, grandparent, ... up to the top of the known chain.
    ancestor_ids: Vec<i64>,
    feature_code: FeatureCode,
    historical: bool,
    sort_pop: i64,
}

/// One searchable name of a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NameDoc {
    record: u32,
    name: String,
    tokens: Vec<String>,
}

/// Ranked candidate before it is turned into a hit.
#[derive(Debug, Clone, Copy)]
struct Scored {
    score: f32,
    sort_pop: i64,
    doc: u32,
}

impl Scored {
    fn cursor(&self) -> SearchCursor {
        SearchCursor {
            score: self.score,
            sort_pop: self.sort_pop,
            doc: self.doc,
        }
    }
}

/// `Less` when `a` ranks ahead of `b`.
fn rank(a: (f32, i64, u32), b: (f32, i64, u32)) -> Ordering {
    b.0.total_cmp(&a.0)
        .then_with(|| b.1.cmp(&a.1))
        .then_with(|| a.2.cmp(&b.2))
}

/// Edits tolerated when fuzzily matching a token of `len` characters.
fn max_edits(len: usize) -> usize {
    match len {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryIndex {
    records: Vec<StoredRecord>,
    ids: HashMap<i64, u32>,
    docs: Vec<NameDoc>,
    #[serde(skip)]
    terms: OnceCell<TermIndex>,
}

impl MemoryIndex {
    pub fn builder() -> MemoryIndexBuilder {
        MemoryIndexBuilder::default()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            records: self.records.len(),
            documents: self.docs.len(),
            tokens: self
                .docs
                .iter()
                .flat_map(|doc| &doc.tokens)
                .collect::<HashSet<_>>()
                .len(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The stored record for `id`, if indexed.
    pub fn record(&self, id: i64) -> Option<&IndexRecord> {
        self.ids.get(&id).map(|&idx| &self.records[idx as usize].record)
    }

    /// Every stored record, in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &IndexRecord> {
        self.records.iter().map(|r| &r.record)
    }

    pub(crate) fn push_record(
        &mut self,
        record: IndexRecord,
        ancestor_ids: Vec<i64>,
        feature_code: FeatureCode,
        sort_pop: i64,
        names: &[String],
    ) {
        self.terms.take();
        let idx = self.records.len() as u32;
        self.ids.insert(record.id, idx);
        self.records.push(StoredRecord {
            record,
            ancestor_ids,
            feature_code,
            historical: feature_code.is_historical(),
            sort_pop,
        });

        for name in names {
            let tokens = tokenize(name);
            if tokens.is_empty() {
                continue;
            }
            self.docs.push(NameDoc {
                record: idx,
                name: name.clone(),
                tokens,
            });
        }
    }

    fn passes(&self, doc: u32, filter: &IndexFilter) -> bool {
        let stored = &self.records[self.docs[doc as usize].record as usize];
        if !filter.include_historical && stored.historical {
            return false;
        }
        if !filter.ancestor_ids.is_empty()
            && !stored
                .ancestor_ids
                .iter()
                .any(|id| filter.ancestor_ids.contains(id))
        {
            return false;
        }
        if filter.restricts_feature_codes() && !filter.feature_codes.contains(&stored.feature_code) {
            return false;
        }
        true
    }

    fn length_norm(&self, doc: u32) -> f32 {
        1.0 / (self.docs[doc as usize].tokens.len() as f32).sqrt()
    }

    fn terms(&self) -> Result<&TermIndex> {
        self.terms.get_or_try_init(|| TermIndex::build(&self.docs))
    }

    /// Documents containing `tokens` as a contiguous phrase.
    fn exact_matches(&self, tokens: &[String]) -> Result<Vec<(u32, f32)>> {
        Ok(self
            .terms()?
            .phrase(tokens)?
            .into_iter()
            .map(|doc| (doc, self.length_norm(doc)))
            .collect())
    }

    /// Documents where every query token is within [`max_edits`] of some
    /// name token, scored by mean similarity.
    fn fuzzy_matches(&self, tokens: &[String]) -> Result<Vec<(u32, f32)>> {
        let budgets: Vec<(&str, usize)> = tokens
            .iter()
            .map(|token| (token.as_str(), max_edits(token.chars().count())))
            .collect();

        let candidates = self.terms()?.fuzzy(&budgets)?;
        Ok(candidates
            .into_iter()
            .filter_map(|doc| {
                let name_tokens = &self.docs[doc as usize].tokens;
                let mut total = 0.0;
                for &(token, budget) in &budgets {
                    let distance = name_tokens
                        .iter()
                        .filter_map(|term| bounded_distance(token, term, budget))
                        .min()?;
                    total += 1.0 - distance as f32 / token.chars().count().max(1) as f32;
                }
                let mean = total / tokens.len() as f32;
                Some((doc, mean * self.length_norm(doc)))
            })
            .collect())
    }
}

/// Edit distance between `a` and `b` if it is at most `budget`.
fn bounded_distance(a: &str, b: &str, budget: usize) -> Option<usize> {
    if a == b {
        return Some(0);
    }
    if budget == 0 || a.chars().count().abs_diff(b.chars().count()) > budget {
        return None;
    }
    if budget == 1 {
        return is_edit_distance_1(a, b).then_some(1);
    }
    let distance = damerau_levenshtein(a, b);
    (distance <= budget).then_some(distance)
}

impl GazetteerIndex for MemoryIndex {
    fn search(&self, query: &IndexQuery<'_>) -> Result<Vec<IndexHit>> {
        let tokens = tokenize(query.text);
        if tokens.is_empty() || query.max_results == 0 {
            return Ok(Vec::new());
        }

        let matches = if query.exact {
            self.exact_matches(&tokens)?
        } else {
            self.fuzzy_matches(&tokens)?
        };

        let mut ranked: Vec<Scored> = matches
            .into_iter()
            .filter(|&(doc, _)| self.passes(doc, query.filter))
            .map(|(doc, score)| Scored {
                score,
                sort_pop: self.records[self.docs[doc as usize].record as usize].sort_pop,
                doc,
            })
            .collect();

        if let Some(after) = query.after {
            let cursor = (after.score, after.sort_pop, after.doc);
            ranked.retain(|s| rank((s.score, s.sort_pop, s.doc), cursor) == Ordering::Greater);
        }
        ranked.sort_by(|a, b| rank((a.score, a.sort_pop, a.doc), (b.score, b.sort_pop, b.doc)));
        ranked.truncate(query.max_results);

        Ok(ranked
            .into_iter()
            .map(|s| {
                let doc = &self.docs[s.doc as usize];
                IndexHit {
                    record: self.records[doc.record as usize].record.clone(),
                    matched_name: doc.name.clone(),
                    cursor: s.cursor(),
                }
            })
            .collect())
    }

    fn get_by_id(&self, id: i64) -> Result<Option<IndexRecord>> {
        Ok(self.record(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64) -> IndexRecord {
        IndexRecord {
            id,
            record_text: String::new(),
            preferred_name: None,
            parent_id: None,
        }
    }

    fn index() -> MemoryIndex {
        let mut index = MemoryIndex::default();
        index.push_record(record(1), vec![10], FeatureCode::PPL, 100, &["Springfield".into()]);
        index.push_record(record(2), vec![20], FeatureCode::PPL, 900, &["Springfield".into(), "West Springfield".into()]);
        index.push_record(record(3), vec![10], FeatureCode::PPLH, 50, &["Sprinfield".into()]);
        index.push_record(record(4), vec![], FeatureCode::ADM1, 5000, &["New York".into()]);
        index
    }

    fn search(index: &MemoryIndex, text: &str, exact: bool, filter: &IndexFilter) -> Vec<(i64, String)> {
        index
            .search(&IndexQuery {
                text,
                exact,
                max_results: 10,
                filter,
                after: None,
            })
            .unwrap()
            .into_iter()
            .map(|h| (h.record.id, h.matched_name))
            .collect()
    }

    fn everything() -> IndexFilter {
        IndexFilter {
            include_historical: true,
            ..IndexFilter::default()
        }
    }

    #[test]
    fn exact_search_ranks_by_length_then_population() {
        let hits = search(&index(), "springfield", true, &everything());
        assert_eq!(
            hits,
            vec![
                (2, "Springfield".to_string()),
                (1, "Springfield".to_string()),
                (2, "West Springfield".to_string()),
            ]
        );
        assert!(search(&index(), "york new", true, &everything()).is_empty());
        assert_eq!(search(&index(), "NEW york", true, &everything()).len(), 1);
    }

    #[test]
    fn fuzzy_search_tolerates_typos() {
        let hits = search(&index(), "springfeld", false, &everything());
        let ids: Vec<i64> = hits.iter().map(|h| h.0).collect();
        assert!(ids.contains(&1) && ids.contains(&2) && ids.contains(&3));
        // short tokens must match exactly
        assert!(search(&index(), "nw york", false, &everything()).is_empty());
    }

    #[test]
    fn filters_restrict_hits() {
        let index = index();
        let no_history = IndexFilter::default();
        let ids: Vec<i64> = search(&index, "sprinfield", true, &no_history).iter().map(|h| h.0).collect();
        assert!(ids.is_empty());

        let mut under_10 = everything();
        under_10.ancestor_ids.insert(10);
        let ids: Vec<i64> = search(&index, "springfield", false, &under_10).iter().map(|h| h.0).collect();
        assert!(ids.iter().all(|&id| id == 1 || id == 3));

        let mut admin = everything();
        admin.feature_codes.insert(FeatureCode::ADM1);
        assert_eq!(search(&index, "springfield", true, &admin), vec![]);
    }

    #[test]
    fn search_after_resumes_past_cursor() {
        let index = index();
        let filter = everything();
        let first = index
            .search(&IndexQuery { text: "springfield", exact: true, max_results: 1, filter: &filter, after: None })
            .unwrap();
        assert_eq!(first.len(), 1);
        let rest = index
            .search(&IndexQuery {
                text: "springfield",
                exact: true,
                max_results: 10,
                filter: &filter,
                after: Some(first[0].cursor),
            })
            .unwrap();
        let names: Vec<(i64, &str)> = rest.iter().map(|h| (h.record.id, h.matched_name.as_str())).collect();
        assert_eq!(names, vec![(1, "Springfield"), (2, "West Springfield")]);
    }

    #[test]
    fn records_pushed_after_a_search_are_found() {
        let mut index = index();
        assert!(search(&index, "shelbyville", false, &everything()).is_empty());
        index.push_record(record(5), vec![], FeatureCode::PPL, 10, &["Shelbyville".into()]);
        assert_eq!(search(&index, "shelbyvile", false, &everything()), vec![(5, "Shelbyville".to_string())]);
    }

    #[test]
    fn fuzzy_search_over_a_large_vocabulary() {
        let mut index = MemoryIndex::default();
        for id in 0..5_000i64 {
            let name = format!("Place{id:05} Township");
            index.push_record(record(id), vec![], FeatureCode::PPL, 0, &[name]);
        }
        index.push_record(record(9_000), vec![], FeatureCode::PPL, 0, &["Springfield Township".into()]);
        assert_eq!(index.stats().tokens, 5_002);

        let hits = search(&index, "sprngfield township", false, &everything());
        assert_eq!(hits, vec![(9_000, "Springfield Township".to_string())]);
        // "place01234" is within two edits of many neighbours
        let near: Vec<i64> = search(&index, "place01234", false, &everything()).iter().map(|h| h.0).collect();
        assert_eq!(near.first(), Some(&1_234));
        assert_eq!(near.len(), 10);
    }

    #[test]
    fn bounded_distance_respects_budget() {
        assert_eq!(bounded_distance("reston", "reston", 0), Some(0));
        assert_eq!(bounded_distance("ca", "co", 0), None);
        assert_eq!(bounded_distance("bostn", "boston", 1), Some(1));
        assert_eq!(bounded_distance("worchester", "worcester", 2), Some(1));
        assert_eq!(bounded_distance("haverhill", "havrehil", 2), Some(2));
        assert_eq!(bounded_distance("haverhill", "hvrehil", 2), None);
    }
}
