mod common;

use common::*;
use geores_core::{Ancestry, AncestryMode, GeoNameRef, IndexOptions, LazyAncestryGeoName};

fn chain(geoname: &GeoNameRef) -> Vec<i64> {
    geoname.ancestors().iter().map(|a| a.id()).collect()
}

#[test]
fn on_create_resolves_the_whole_chain() {
    let gazetteer = gazetteer();
    let reston = gazetteer.geoname(RESTON_VA, AncestryMode::OnCreate).unwrap().unwrap();
    assert!(reston.is_ancestry_resolved());
    assert_eq!(chain(&reston), vec![FAIRFAX_COUNTY, VIRGINIA, UNITED_STATES]);

    let virginia = gazetteer.geoname(VIRGINIA, AncestryMode::OnCreate).unwrap().unwrap();
    assert!(reston.is_descendant_of(&*virginia));
    assert!(virginia.is_ancestor_of(&*reston));
    assert!(!virginia.is_descendant_of(&*reston));
}

#[test]
fn lazy_records_load_parents_on_access() {
    let gazetteer = gazetteer();
    let reston = gazetteer.geoname(RESTON_VA, AncestryMode::Lazy).unwrap().unwrap();
    assert_eq!(reston.parent_id(), Some(FAIRFAX_COUNTY));
    assert!(!reston.is_ancestry_resolved());

    assert_eq!(reston.parent().map(|p| p.id()), Some(FAIRFAX_COUNTY));
    assert_eq!(chain(&reston), vec![FAIRFAX_COUNTY, VIRGINIA, UNITED_STATES]);
}

#[test]
fn manual_records_wait_for_load_ancestry() {
    let gazetteer = gazetteer();
    let records: Vec<GeoNameRef> = [RESTON_VA, FAIRFAX_COUNTY, RESTON_MB]
        .into_iter()
        .map(|id| gazetteer.geoname(id, AncestryMode::Manual).unwrap().unwrap())
        .collect();
    assert!(records.iter().all(|r| !r.is_ancestry_resolved()));
    assert!(records[0].parent().is_none());

    gazetteer.load_ancestry(&records).unwrap();
    assert!(records.iter().all(|r| r.is_ancestry_resolved()));
    assert_eq!(chain(&records[0]), vec![FAIRFAX_COUNTY, VIRGINIA, UNITED_STATES]);
    assert_eq!(chain(&records[2]).last(), Some(&CANADA));
}

#[test]
fn top_level_records_need_no_ancestry() {
    let gazetteer = gazetteer();
    for mode in [AncestryMode::OnCreate, AncestryMode::Lazy, AncestryMode::Manual] {
        let us = gazetteer.geoname(UNITED_STATES, mode).unwrap().unwrap();
        assert!(us.is_ancestry_resolved());
        assert!(us.parent().is_none());
        assert_eq!(us.geoname().preferred_name(), "United States");
    }
    assert!(gazetteer.geoname(1, AncestryMode::Lazy).unwrap().is_none());
}

#[test]
fn full_ancestry_index_returns_resolved_records() {
    let index = index(IndexOptions { full_ancestry: true });
    let reston = index.record(RESTON_VA).unwrap().parse().unwrap();
    assert!(reston.is_ancestry_resolved());
    assert_eq!(
        reston.ancestors().iter().map(|a| a.id()).collect::<Vec<_>>(),
        vec![FAIRFAX_COUNTY, VIRGINIA, UNITED_STATES]
    );
}

#[test]
fn lazy_wrapper_delegates_set_parent() {
    let gazetteer = gazetteer();
    let fairfax = gazetteer.geoname(FAIRFAX_COUNTY, AncestryMode::OnCreate).unwrap().unwrap();
    let reston = gazetteer.geoname(RESTON_VA, AncestryMode::Manual).unwrap().unwrap();
    let canada = gazetteer.geoname(CANADA, AncestryMode::OnCreate).unwrap().unwrap();

    // wrong country
    assert!(!reston.set_parent(Some(canada)));
    assert!(reston.set_parent(Some(fairfax)));
    assert!(reston.is_ancestry_resolved());

    let detached = LazyAncestryGeoName::manual(reston.clone(), Some(FAIRFAX_COUNTY));
    assert!(detached.is_manual());
    assert_eq!(detached.id(), RESTON_VA);
}
