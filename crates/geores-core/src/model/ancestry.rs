// crates/geores-core/src/model/ancestry.rs

//! Parent links between gazetteer records.
//!
//! A record only ever points at its parent, never at its children, so
//! chains are reference counted without cycles. Records either carry their
//! parent directly ([`GeoName`]) or defer loading it to a gazetteer
//! ([`LazyAncestryGeoName`]).
//!
//! [`Ancestry::parent`] cannot report errors. On a lazy record a failed
//! parent lookup is logged and reads as "no parent"; call
//! [`LazyAncestryGeoName::try_parent`] to get the index error instead.

use log::error;
use std::fmt;
use std::sync::Arc;

use super::geoname::GeoName;
use crate::error::Result;
use crate::gazetteer::{AncestryMode, Gazetteer};

/// Shared handle to a record and its ancestry strategy.
pub type GeoNameRef = Arc<dyn Ancestry>;

/// Ancestry operations shared by eager and lazily-resolved records.
pub trait Ancestry: Send + Sync + fmt::Debug {
    /// The underlying record.
    fn geoname(&self) -> &GeoName;

    /// The parent record, loading it first if this strategy defers loading.
    fn parent(&self) -> Option<GeoNameRef>;

    /// Id of the parent, if known. For lazily-resolved records this is
    /// available before the parent itself has been loaded.
    fn parent_id(&self) -> Option<i64>;

    /// Links `parent` after validating its feature type and ancestry key.
    ///
    /// Returns `false` and leaves the current parent untouched if the link is
    /// rejected. `None` is a no-op.
    fn set_parent(&self, parent: Option<GeoNameRef>) -> bool;

    /// `true` for top-level divisions, records without a parent ancestry key,
    /// and records whose parent is itself resolved.
    fn is_ancestry_resolved(&self) -> bool;

    fn id(&self) -> i64 {
        self.geoname().id()
    }

    /// `true` if `other` is this record or one of its ancestors.
    fn is_descendant_of(&self, other: &dyn Ancestry) -> bool {
        let target = other.id();
        if self.id() == target {
            return true;
        }
        let mut current = self.parent();
        while let Some(node) = current {
            if node.id() == target {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// `true` if this record is `other` or one of its ancestors.
    fn is_ancestor_of(&self, other: &dyn Ancestry) -> bool {
        let me = self.id();
        if other.id() == me {
            return true;
        }
        let mut current = other.parent();
        while let Some(node) = current {
            if node.id() == me {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Parent chain, nearest first.
    fn ancestors(&self) -> Vec<GeoNameRef> {
        let mut chain = Vec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.parent();
            chain.push(node);
        }
        chain
    }

    /// This record's text followed by each ancestor's, one per line.
    fn gazetteer_record_with_ancestry(&self) -> String {
        let mut record = self.geoname().gazetteer_record().to_string();
        for ancestor in self.ancestors() {
            record.push('\n');
            record.push_str(ancestor.geoname().gazetteer_record());
        }
        record
    }
}

/// A record whose parent is fetched from a gazetteer on first access.
///
/// Without a gazetteer the record never loads anything on its own; its
/// ancestry must be filled in with [`Gazetteer::load_ancestry`].
pub struct LazyAncestryGeoName {
    inner: GeoNameRef,
    parent_id: Option<i64>,
    gazetteer: Option<Arc<dyn Gazetteer>>,
}

impl LazyAncestryGeoName {
    /// Loads on demand through `gazetteer`.
    pub fn new(inner: GeoNameRef, parent_id: Option<i64>, gazetteer: Arc<dyn Gazetteer>) -> Self {
        Self {
            inner,
            parent_id,
            gazetteer: Some(gazetteer),
        }
    }

    /// Never loads on its own.
    pub fn manual(inner: GeoNameRef, parent_id: Option<i64>) -> Self {
        Self {
            inner,
            parent_id,
            gazetteer: None,
        }
    }

    /// Like [`Ancestry::parent`], but reports a failed load instead of logging it.
    pub fn try_parent(&self) -> Result<Option<GeoNameRef>> {
        self.load_parent()?;
        Ok(self.inner.parent())
    }

    pub fn is_manual(&self) -> bool {
        self.gazetteer.is_none()
    }

    fn load_parent(&self) -> Result<()> {
        if let (Some(gazetteer), Some(parent_id)) = (&self.gazetteer, self.parent_id) {
            if !self.inner.is_ancestry_resolved() {
                let parent = gazetteer.geoname(parent_id, AncestryMode::OnCreate)?;
                self.inner.set_parent(parent);
            }
        }
        Ok(())
    }
}

impl Ancestry for LazyAncestryGeoName {
    fn geoname(&self) -> &GeoName {
        self.inner.geoname()
    }

    /// Loads the parent on first access. A failed load is logged and yields
    /// `None`; see [`LazyAncestryGeoName::try_parent`].
    fn parent(&self) -> Option<GeoNameRef> {
        if let Err(e) = self.load_parent() {
            error!("Error lazy-loading ancestry for {}: {}", self.inner.geoname(), e);
        }
        self.inner.parent()
    }

    fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }

    fn set_parent(&self, parent: Option<GeoNameRef>) -> bool {
        self.inner.set_parent(parent)
    }

    fn is_ancestry_resolved(&self) -> bool {
        self.inner.is_ancestry_resolved()
    }
}

impl fmt::Debug for LazyAncestryGeoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyAncestryGeoName")
            .field("inner", &self.inner)
            .field("parent_id", &self.parent_id)
            .field("manual", &self.is_manual())
            .finish()
    }
}

impl fmt::Display for LazyAncestryGeoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.inner.geoname(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeoError;
    use crate::gazetteer::GazetteerQuery;
    use crate::model::resolved::ResolvedLocation;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const US: &str = "6252001\tUnited States\tUnited States\t\t39.76\t-98.5\tA\tPCLI\tUS\t\t00\t\t\t\t327167434\t\t543\t\t2020-01-02";
    const VIRGINIA: &str = "6254928\tVirginia\tVirginia\t\t37.54812\t-77.44675\tA\tADM1\tUS\t\tVA\t\t\t\t8001024\t\t95\tAmerica/New_York\t2016-06-14";
    const FAIRFAX: &str = "4758041\tFairfax County\tFairfax County\t\t38.83469\t-77.27636\tA\tADM2\tUS\t\tVA\t059\t\t\t1081726\t\t110\tAmerica/New_York\t2011-06-16";
    const RESTON: &str = "4781530\tReston\tReston\t\t38.96872\t-77.3411\tP\tPPL\tUS\t\tVA\t059\t\t\t58404\t100\t102\tAmerica/New_York\t2011-05-14";

    /// Serves fully-resolved records by id and counts lookups.
    #[derive(Debug, Default)]
    struct StubGazetteer {
        records: HashMap<i64, String>,
        lookups: AtomicUsize,
    }

    impl Gazetteer for StubGazetteer {
        fn closest_locations(&self, _query: &GazetteerQuery) -> Result<Vec<ResolvedLocation>> {
            Ok(Vec::new())
        }

        fn geoname(&self, id: i64, _mode: AncestryMode) -> Result<Option<GeoNameRef>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            match self.records.get(&id) {
                Some(record) => Ok(Some(GeoName::parse_record(record, None)?)),
                None => Ok(None),
            }
        }

        fn load_ancestry(&self, _geonames: &[GeoNameRef]) -> Result<()> {
            Ok(())
        }
    }

    fn stub() -> Arc<StubGazetteer> {
        let mut records = HashMap::new();
        records.insert(4758041, [FAIRFAX, VIRGINIA, US].join("\n"));
        Arc::new(StubGazetteer {
            records,
            lookups: AtomicUsize::new(0),
        })
    }

    #[test]
    fn lazy_parent_loads_once() {
        let gazetteer = stub();
        let reston = GeoName::parse_record(RESTON, None).unwrap();
        let lazy = LazyAncestryGeoName::new(reston, Some(4758041), gazetteer.clone());

        assert_eq!(lazy.parent_id(), Some(4758041));
        assert!(!lazy.is_ancestry_resolved());
        assert_eq!(gazetteer.lookups.load(Ordering::SeqCst), 0);

        let parent = lazy.parent().expect("parent");
        assert_eq!(parent.id(), 4758041);
        assert!(lazy.is_ancestry_resolved());

        // memoized
        assert_eq!(lazy.parent().map(|p| p.id()), Some(4758041));
        assert_eq!(gazetteer.lookups.load(Ordering::SeqCst), 1);
    }

    /// Every lookup fails the way a broken index would.
    #[derive(Debug)]
    struct BrokenGazetteer;

    impl Gazetteer for BrokenGazetteer {
        fn closest_locations(&self, _query: &GazetteerQuery) -> Result<Vec<ResolvedLocation>> {
            Err(GeoError::Index("index closed".into()))
        }

        fn geoname(&self, _id: i64, _mode: AncestryMode) -> Result<Option<GeoNameRef>> {
            Err(GeoError::Index("index closed".into()))
        }

        fn load_ancestry(&self, _geonames: &[GeoNameRef]) -> Result<()> {
            Err(GeoError::Index("index closed".into()))
        }
    }

    #[test]
    fn try_parent_surfaces_load_failures() {
        let reston = GeoName::parse_record(RESTON, None).unwrap();
        let lazy = LazyAncestryGeoName::new(reston, Some(4758041), Arc::new(BrokenGazetteer));

        assert!(matches!(lazy.try_parent(), Err(GeoError::Index(_))));
        // the infallible accessor degrades to "no parent"
        assert!(lazy.parent().is_none());
        assert!(!lazy.is_ancestry_resolved());
    }

    #[test]
    fn manual_never_loads() {
        let reston = GeoName::parse_record(RESTON, None).unwrap();
        let manual = LazyAncestryGeoName::manual(reston, Some(4758041));
        assert!(manual.is_manual());
        assert!(manual.parent().is_none());
        assert!(manual.try_parent().unwrap().is_none());
        assert!(!manual.is_ancestry_resolved());
    }

    #[test]
    fn lazy_set_parent_delegates() {
        let gazetteer = stub();
        let reston = GeoName::parse_record(RESTON, None).unwrap();
        let lazy = LazyAncestryGeoName::new(reston.clone(), Some(4758041), gazetteer.clone());
        let fairfax = GeoName::parse_record(&[FAIRFAX, VIRGINIA, US].join("\n"), None).unwrap();

        assert!(lazy.set_parent(Some(fairfax)));
        assert!(reston.is_ancestry_resolved());
        assert!(lazy.parent().is_some());
        assert_eq!(gazetteer.lookups.load(Ordering::SeqCst), 0);
    }
}
