// crates/geores-core/src/gazetteer/index.rs

//! The boundary to the full-text index that stores gazetteer records.
//!
//! The gazetteer never looks inside the index: it sends a sanitized name,
//! an exactness flag, a cap, filters and an optional continuation cursor,
//! and gets back ranked hits carrying the stored record text.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use super::query::GazetteerQuery;
use crate::error::Result;
use crate::model::{FeatureCode, GeoName};

/// Restrictions applied on top of the name match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexFilter {
    pub include_historical: bool,
    /// Hit must have at least one of these records among its ancestors (OR).
    pub ancestor_ids: BTreeSet<i64>,
    /// Hit must have one of these codes (OR). Empty or the full set means no restriction.
    pub feature_codes: HashSet<FeatureCode>,
}

impl IndexFilter {
    pub fn from_query(query: &GazetteerQuery) -> Self {
        Self {
            include_historical: query.include_historical(),
            ancestor_ids: query.parent_ids().clone(),
            feature_codes: query.feature_codes().clone(),
        }
    }

    /// `true` when the feature-code set actually narrows the search.
    pub fn restricts_feature_codes(&self) -> bool {
        !self.feature_codes.is_empty() && self.feature_codes.len() < FeatureCode::ALL.len()
    }
}

/// Position of a hit in a ranked result list, used to resume after it.
///
/// Only meaningful to the index that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchCursor {
    pub score: f32,
    pub sort_pop: i64,
    pub doc: u32,
}

/// One page request.
#[derive(Debug, Clone)]
pub struct IndexQuery<'a> {
    /// Sanitized (trimmed, lower-cased) name.
    pub text: &'a str,
    /// Whole-phrase match when `true`, edit-distance-tolerant otherwise.
    pub exact: bool,
    pub max_results: usize,
    pub filter: &'a IndexFilter,
    /// Resume strictly after this hit.
    pub after: Option<SearchCursor>,
}

/// A stored gazetteer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: i64,
    /// GeoNames line, optionally followed by its ancestors' lines.
    pub record_text: String,
    pub preferred_name: Option<String>,
    pub parent_id: Option<i64>,
}

impl IndexRecord {
    pub fn parse(&self) -> Result<Arc<GeoName>> {
        GeoName::parse_record(&self.record_text, self.preferred_name.as_deref())
    }
}

/// A ranked match: the record, the index-side name that matched, and where
/// to resume from.
#[derive(Debug, Clone)]
pub struct IndexHit {
    pub record: IndexRecord,
    pub matched_name: String,
    pub cursor: SearchCursor,
}

/// A full-text index of gazetteer records.
///
/// Hits are ordered by relevance, then by a population-weighted tiebreak.
pub trait GazetteerIndex: Send + Sync + fmt::Debug {
    fn search(&self, query: &IndexQuery<'_>) -> Result<Vec<IndexHit>>;

    fn get_by_id(&self, id: i64) -> Result<Option<IndexRecord>>;
}
