// crates/geores-core/src/gazetteer/engine.rs
use log::{debug, error, info, log_enabled, Level};
use std::collections::HashMap;
use std::sync::Arc;

use super::index::{GazetteerIndex, IndexFilter, IndexQuery};
use super::query::{AncestryMode, GazetteerQuery};
use super::Gazetteer;
use crate::error::{GeoError, Result};
use crate::model::{GeoNameRef, LazyAncestryGeoName, ResolvedLocation};
use crate::text::sanitize_query;

/// Result cap used when a query asks for `0` results.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Children waiting for a parent, keyed by parent id.
type ChildMap = HashMap<i64, Vec<GeoNameRef>>;

/// [`Gazetteer`] backed by a [`GazetteerIndex`].
///
/// Cheap to clone; clones share the index. Lazily-resolved records keep a
/// clone to fetch their parents with.
#[derive(Debug, Clone)]
pub struct IndexGazetteer {
    index: Arc<dyn GazetteerIndex>,
}

impl IndexGazetteer {
    pub fn new(index: Arc<dyn GazetteerIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &Arc<dyn GazetteerIndex> {
        &self.index
    }

    fn loader(&self) -> Arc<dyn Gazetteer> {
        Arc::new(self.clone())
    }

    /// Runs one exact or fuzzy pass, appending to `previous`.
    ///
    /// With deduplication on, the index is paged with search-after until
    /// enough distinct records are found or the hits run out.
    fn execute_query(
        &self,
        query: &GazetteerQuery,
        text: &str,
        filter: &IndexFilter,
        max_results: usize,
        fuzzy: bool,
        previous: Vec<ResolvedLocation>,
    ) -> Result<Vec<ResolvedLocation>> {
        let dedupe = query.filter_dupes();
        let mut matches = previous;

        // one instance per record, so ancestry is linked once even when
        // several of its names match
        let mut geonames: HashMap<i64, GeoNameRef> = matches
            .iter()
            .map(|m| (m.geoname().id(), Arc::clone(m.geoname())))
            .collect();

        if matches.len() >= max_results {
            return Ok(matches);
        }

        let mut children = ChildMap::new();
        let mut loader: Option<Arc<dyn Gazetteer>> = None;
        let mut after = None;

        loop {
            let hits = self.index.search(&IndexQuery {
                text,
                exact: !fuzzy,
                max_results,
                filter,
                after,
            })?;
            after = None;

            for hit in hits {
                after = Some(hit.cursor);

                let mut geoname = match geonames.get(&hit.record.id) {
                    Some(_) if dedupe => continue,
                    Some(existing) => Arc::clone(existing),
                    None => {
                        let parsed: GeoNameRef = hit.record.parse()?;
                        geonames.insert(hit.record.id, Arc::clone(&parsed));
                        parsed
                    }
                };

                if !geoname.is_ancestry_resolved() {
                    if let Some(parent_id) = hit.record.parent_id {
                        match query.ancestry_mode() {
                            AncestryMode::Lazy => {
                                let loader = loader.get_or_insert_with(|| self.loader());
                                geoname = Arc::new(LazyAncestryGeoName::new(
                                    geoname,
                                    Some(parent_id),
                                    Arc::clone(loader),
                                ));
                            }
                            AncestryMode::Manual => {
                                geoname =
                                    Arc::new(LazyAncestryGeoName::manual(geoname, Some(parent_id)));
                            }
                            AncestryMode::OnCreate => {
                                add_child(&mut children, parent_id, Arc::clone(&geoname));
                            }
                        }
                    }
                }

                matches.push(ResolvedLocation::new(
                    query.occurrence().clone(),
                    geoname,
                    hit.matched_name,
                    fuzzy,
                ));
                if matches.len() >= max_results {
                    break;
                }
            }

            if !(dedupe && after.is_some() && matches.len() < max_results) {
                break;
            }
        }

        if !children.is_empty() {
            self.resolve_parents(children)?;
        }
        Ok(matches)
    }

    /// Fetches every parent in `children` once, recursing to grandparents
    /// before linking, so a whole batch resolves with one lookup per
    /// distinct ancestor.
    fn resolve_parents(&self, children: ChildMap) -> Result<()> {
        let mut parents: HashMap<i64, GeoNameRef> = HashMap::new();
        let mut grandparents = ChildMap::new();

        for &parent_id in children.keys() {
            match self.index.get_by_id(parent_id)? {
                Some(record) => {
                    let parent: GeoNameRef = record.parse()?;
                    if !parent.is_ancestry_resolved() {
                        if let Some(grandparent_id) = record.parent_id {
                            add_child(&mut grandparents, grandparent_id, Arc::clone(&parent));
                        }
                    }
                    parents.insert(parent.id(), parent);
                }
                None => error!("Unable to find parent GeoName [{}]", parent_id),
            }
        }

        if !grandparents.is_empty() {
            self.resolve_parents(grandparents)?;
        }

        for (parent_id, kids) in children {
            let Some(parent) = parents.get(&parent_id) else {
                info!("Unable to find parent with ID [{}]", parent_id);
                continue;
            };
            for child in kids {
                child.set_parent(Some(Arc::clone(parent)));
            }
        }
        Ok(())
    }
}

fn add_child(children: &mut ChildMap, parent_id: i64, child: GeoNameRef) {
    let siblings = children.entry(parent_id).or_default();
    if !siblings.iter().any(|s| s.id() == child.id()) {
        siblings.push(child);
    }
}

impl Gazetteer for IndexGazetteer {
    fn closest_locations(&self, query: &GazetteerQuery) -> Result<Vec<ResolvedLocation>> {
        let location = &query.occurrence().text;
        let sanitized = sanitize_query(location);
        if sanitized.is_empty() {
            return Ok(Vec::new());
        }

        let max_results = if query.max_results() > 0 {
            query.max_results()
        } else {
            DEFAULT_MAX_RESULTS
        };
        let filter = IndexFilter::from_query(query);
        let wrap = |e: GeoError| GeoError::resolution(format!("Error executing query for: '{location}'"), e);

        // exact first
        let mut matches = self
            .execute_query(query, &sanitized, &filter, max_results, false, Vec::new())
            .map_err(wrap)?;
        if log_enabled!(Level::Debug) {
            for m in &matches {
                debug!("{}", m);
            }
        }

        if query.fuzzy_mode().use_fuzzy_matching(max_results, matches.len()) {
            // exact matches count towards the cap and the dedupe set
            matches = self
                .execute_query(query, &sanitized, &filter, max_results, true, matches)
                .map_err(wrap)?;
            if log_enabled!(Level::Debug) {
                for m in matches.iter().filter(|m| m.is_fuzzy()) {
                    debug!("{}[fuzzy]", m);
                }
            }
        }

        if matches.is_empty() {
            debug!("No match found for: '{}'", location);
        }
        Ok(matches)
    }

    fn geoname(&self, id: i64, mode: AncestryMode) -> Result<Option<GeoNameRef>> {
        let wrap = |e: GeoError| GeoError::resolution(format!("Error retrieving geoname with ID : {id}"), e);

        let Some(record) = self.index.get_by_id(id).map_err(wrap)? else {
            debug!("No geoname found for ID: {}", id);
            return Ok(None);
        };
        let geoname: GeoNameRef = record.parse().map_err(wrap)?;

        if geoname.is_ancestry_resolved() {
            return Ok(Some(geoname));
        }
        let Some(parent_id) = record.parent_id else {
            return Ok(Some(geoname));
        };

        let geoname: GeoNameRef = match mode {
            AncestryMode::OnCreate => {
                let mut children = ChildMap::new();
                add_child(&mut children, parent_id, Arc::clone(&geoname));
                self.resolve_parents(children).map_err(wrap)?;
                geoname
            }
            AncestryMode::Lazy => Arc::new(LazyAncestryGeoName::new(
                geoname,
                Some(parent_id),
                self.loader(),
            )),
            AncestryMode::Manual => Arc::new(LazyAncestryGeoName::manual(geoname, Some(parent_id))),
        };
        Ok(Some(geoname))
    }

    fn load_ancestry(&self, geonames: &[GeoNameRef]) -> Result<()> {
        let mut children = ChildMap::new();
        for geoname in geonames {
            if geoname.is_ancestry_resolved() {
                continue;
            }
            if let Some(parent_id) = geoname.parent_id() {
                add_child(&mut children, parent_id, Arc::clone(geoname));
            }
        }
        if children.is_empty() {
            return Ok(());
        }
        self.resolve_parents(children)
            .map_err(|e| GeoError::resolution("Error loading ancestry.", e))
    }
}
