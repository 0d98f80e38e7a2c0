// crates/geores-core/src/memory/builder.rs

//! # Index builder
//!
//! Turns GeoNames dumps into a [`MemoryIndex`]:
//!
//! 1. Parse every record (and the optional alternate-names dump).
//! 2. Map each administrative record by its ancestry key.
//! 3. Link every record to its parent through that map.
//! 4. Index every distinct name of every record.

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use super::MemoryIndex;
use crate::error::Result;
use crate::gazetteer::IndexRecord;
use crate::loader::{common_io, for_each_record, read_alternate_names, AlternateName, ReadStats};
use crate::model::{Ancestry, FeatureClass, GeoName, GeoNameRef};
use crate::raw::GeoNameRaw;

/// Options that shape what gets stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexOptions {
    /// Store each record followed by its ancestors' lines, so hits come back
    /// with their ancestry already attached.
    pub full_ancestry: bool,
}

#[derive(Debug, Default)]
pub struct MemoryIndexBuilder {
    options: IndexOptions,
    raws: Vec<GeoNameRaw>,
    alternate_names: HashMap<i64, AlternateName>,
}

impl MemoryIndexBuilder {
    pub fn new(options: IndexOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Reads a GeoNames `allCountries`-style dump.
    pub fn add_reader<R: BufRead>(&mut self, reader: R) -> Result<ReadStats> {
        let raws = &mut self.raws;
        let stats = for_each_record(reader, |raw| raws.push(raw))?;
        info!(
            "Read {} records ({} skipped) from {} lines",
            stats.records, stats.skipped, stats.lines
        );
        Ok(stats)
    }

    /// Opens `path` (plain or gzipped) and reads it with [`Self::add_reader`].
    pub fn add_path(&mut self, path: impl AsRef<Path>) -> Result<ReadStats> {
        let path = path.as_ref();
        info!("Loading GeoNames records from {}", path.display());
        self.add_reader(common_io::open_stream(path)?)
    }

    /// Adds a single GeoNames line.
    pub fn add_record_line(&mut self, line: &str) -> Result<()> {
        self.raws.push(GeoNameRaw::from_tsv_line(line)?);
        Ok(())
    }

    /// Reads English preferred and short names from an `alternateNamesV2` dump.
    pub fn add_alternate_names<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let names = read_alternate_names(reader)?;
        let count = names.len();
        for (id, name) in names {
            let existing = self.alternate_names.remove(&id);
            self.alternate_names.insert(id, name.best(existing));
        }
        Ok(count)
    }

    pub fn alternate_names_path(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        info!("Loading alternate names from {}", path.display());
        self.add_alternate_names(common_io::open_stream(path)?)
    }

    pub fn build(self) -> MemoryIndex {
        let MemoryIndexBuilder {
            options,
            raws,
            alternate_names,
        } = self;

        // 1. parse
        let geonames: Vec<(Arc<GeoName>, Option<String>)> = raws
            .into_iter()
            .map(|mut raw| {
                let preferred = alternate_names.get(&raw.id).map(|alt| alt.name.clone());
                raw.preferred_name = preferred.clone();
                (Arc::new(GeoName::from_raw(raw)), preferred)
            })
            .collect();

        // 2. admin map
        let mut admin: HashMap<String, Arc<GeoName>> = HashMap::new();
        for (geoname, _) in &geonames {
            if let Some(key) = geoname.ancestry_key() {
                if let Some(previous) = admin.insert(key.to_string(), Arc::clone(geoname)) {
                    error!(
                        "Resolved duplicate admin key [{}] for GeoNames [{}] and [{}]",
                        key, previous, geoname
                    );
                }
            }
        }

        // 3. parents
        let mut orphans = 0usize;
        for (geoname, _) in &geonames {
            let Some(parent_key) = geoname.parent_ancestry_key() else {
                continue;
            };
            if !link_parent(geoname, parent_key, &admin) {
                orphans += 1;
            }
        }

        // 4. index
        let mut index = MemoryIndex::default();
        let mut seen: HashSet<i64> = HashSet::with_capacity(geonames.len());
        for (geoname, preferred) in &geonames {
            if !seen.insert(geoname.id()) {
                warn!("Skipping duplicate GeoName id {}: {}", geoname.id(), geoname);
                continue;
            }
            let ancestors = geoname.ancestors();
            let record = IndexRecord {
                id: geoname.id(),
                record_text: if options.full_ancestry {
                    geoname.gazetteer_record_with_ancestry()
                } else {
                    geoname.gazetteer_record().to_string()
                },
                preferred_name: preferred.clone(),
                parent_id: ancestors.first().map(|p| p.id()),
            };
            index.push_record(
                record,
                ancestors.iter().map(|a| a.id()).collect(),
                geoname.feature_code(),
                sort_population(geoname),
                &index_names(geoname, preferred.as_deref()),
            );
        }

        info!(
            "Indexed {:?}; {} records without a known parent",
            index.stats(),
            orphans
        );
        index
    }
}

/// Links `geoname` to the admin record at `parent_key`, falling back to
/// broader keys when that record is missing or rejects the link.
fn link_parent(geoname: &GeoName, parent_key: &str, admin: &HashMap<String, Arc<GeoName>>) -> bool {
    let mut key = parent_key;
    loop {
        if let Some(parent) = admin.get(key) {
            let parent: GeoNameRef = Arc::clone(parent) as GeoNameRef;
            if geoname.set_parent(Some(parent)) {
                return true;
            }
        }
        match key.rfind('.') {
            Some(dot) => key = &key[..dot],
            None => return false,
        }
    }
}

/// Population used as a ranking tiebreak; cities and countries are boosted
/// over same-named regions.
pub(crate) fn sort_population(geoname: &GeoName) -> i64 {
    let boosted = geoname.feature_class() == FeatureClass::P
        || geoname.feature_code().as_str().starts_with("PCL");
    if boosted {
        geoname.population().saturating_mul(11)
    } else {
        geoname.population()
    }
}

/// Distinct non-empty names a record can be found by.
fn index_names(geoname: &GeoName, preferred: Option<&str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        let name = name.trim();
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    };

    push(geoname.name());
    push(geoname.ascii_name());
    for alt in geoname.alternate_names() {
        push(alt);
    }
    if let Some(preferred) = preferred {
        push(preferred);
    }
    if geoname.is_top_level_admin_division() {
        if let Some(code) = geoname.primary_country_code() {
            push(code.as_str());
        }
        for code in geoname.alternate_country_codes() {
            push(code.as_str());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDS: &str = "\
6252001\tUnited States\tUnited States\tUSA,America\t39.76\t-98.5\tA\tPCLI\tUS\t\t00\t\t\t\t327167434\t\t543\t\t2020-01-02
6254928\tVirginia\tVirginia\tCommonwealth of Virginia\t37.54812\t-77.44675\tA\tADM1\tUS\t\tVA\t\t\t\t8001024\t\t95\tAmerica/New_York\t2016-06-14
4758041\tFairfax County\tFairfax County\t\t38.83469\t-77.27637\tA\tADM2\tUS\t\tVA\t059\t\t\t1081726\t\t110\tAmerica/New_York\t2011-05-14
4781530\tReston\tReston\t\t38.96872\t-77.3411\tP\tPPL\tUS\t\tVA\t059\t\t\t58404\t\t102\tAmerica/New_York\t2011-05-14
4781531\tLoudoun Town\tLoudoun Town\t\t39.0\t-77.5\tP\tPPL\tUS\t\tVA\t107\t\t\t100\t\t102\tAmerica/New_York\t2011-05-14
";

    fn build(options: IndexOptions) -> MemoryIndex {
        let mut builder = MemoryIndexBuilder::new(options);
        let stats = builder.add_reader(RECORDS.as_bytes()).unwrap();
        assert_eq!(stats.records, 5);
        builder.build()
    }

    #[test]
    fn links_parents_and_falls_back_to_broader_keys() {
        let index = build(IndexOptions::default());
        assert_eq!(index.record(4781530).unwrap().parent_id, Some(4758041));
        assert_eq!(index.record(4758041).unwrap().parent_id, Some(6254928));
        assert_eq!(index.record(6254928).unwrap().parent_id, Some(6252001));
        assert_eq!(index.record(6252001).unwrap().parent_id, None);
        // county 107 is missing, so the state is the closest ancestor
        assert_eq!(index.record(4781531).unwrap().parent_id, Some(6254928));
    }

    #[test]
    fn full_ancestry_stores_the_chain() {
        let index = build(IndexOptions { full_ancestry: true });
        let reston = index.record(4781530).unwrap();
        assert_eq!(reston.record_text.lines().count(), 4);

        let parsed = reston.parse().unwrap();
        let chain: Vec<i64> = parsed.ancestors().iter().map(|a| a.id()).collect();
        assert_eq!(chain, vec![4758041, 6254928, 6252001]);

        let plain = build(IndexOptions::default());
        assert_eq!(plain.record(4781530).unwrap().record_text.lines().count(), 1);
    }

    #[test]
    fn countries_are_searchable_by_code() {
        let names = index_names(
            &GeoName::from_raw(GeoNameRaw::from_tsv_line(RECORDS.lines().next().unwrap()).unwrap()),
            None,
        );
        assert_eq!(names, vec!["United States", "USA", "America", "US"]);
    }

    #[test]
    fn alternate_names_become_preferred_names() {
        let mut builder = MemoryIndexBuilder::default();
        builder.add_reader(RECORDS.as_bytes()).unwrap();
        builder
            .add_alternate_names("1\t6254928\ten\tOld Dominion\t1\t\t\t\t\t\n".as_bytes())
            .unwrap();
        let index = builder.build();
        assert_eq!(
            index.record(6254928).unwrap().preferred_name.as_deref(),
            Some("Old Dominion")
        );
        let parsed = index.record(6254928).unwrap().parse().unwrap();
        assert_eq!(parsed.preferred_name(), "Old Dominion");
    }

    #[test]
    fn cities_and_countries_get_boosted_sort_population() {
        let index = build(IndexOptions::default());
        let reston = index.record(4781530).unwrap().parse().unwrap();
        let virginia = index.record(6254928).unwrap().parse().unwrap();
        assert_eq!(sort_population(&reston), 58404 * 11);
        assert_eq!(sort_population(&virginia), 8001024);
    }
}
