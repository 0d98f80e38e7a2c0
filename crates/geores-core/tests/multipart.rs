mod common;

use common::*;
use geores_core::{Ancestry, MultipartLocationName, MultipartLocationResolver, ResolvedLocation};

fn id(location: &Option<ResolvedLocation>) -> Option<i64> {
    location.as_ref().map(|l| l.geoname().id())
}

#[test]
fn city_state_country_resolve_consistently() {
    let resolver = MultipartLocationResolver::new(gazetteer());
    let resolved = resolver
        .resolve_multipart_location(
            &MultipartLocationName::new("Reston", "Virginia", "United States"),
            false,
        )
        .unwrap();
    assert_eq!(id(&resolved.city), Some(RESTON_VA));
    assert_eq!(id(&resolved.state), Some(VIRGINIA));
    assert_eq!(id(&resolved.country), Some(UNITED_STATES));

    let resolved = resolver
        .resolve_multipart_location(&MultipartLocationName::new("Reston", "Manitoba", "Canada"), false)
        .unwrap();
    assert_eq!(id(&resolved.city), Some(RESTON_MB));
    assert_eq!(id(&resolved.state), Some(6065171));
    assert_eq!(id(&resolved.country), Some(CANADA));
}

#[test]
fn missing_parts_fall_back_to_broader_ones() {
    let resolver = MultipartLocationResolver::new(gazetteer());
    let resolved = resolver
        .resolve_multipart_location(&MultipartLocationName::new("", "Virginia", "United States"), false)
        .unwrap();
    assert!(resolved.city.is_none());
    assert_eq!(id(&resolved.state), Some(VIRGINIA));
    assert_eq!(id(&resolved.country), Some(UNITED_STATES));

    let resolved = resolver
        .resolve_multipart_location(&MultipartLocationName::new("Atlantis", "", ""), false)
        .unwrap();
    assert!(resolved.city.is_none() && resolved.state.is_none() && resolved.country.is_none());
}

#[test]
fn comma_separated_names_resolve_to_the_narrowest_part() {
    let resolver = MultipartLocationResolver::new(gazetteer());
    for location in [
        "Reston, Virginia, United States",
        "Reston, Virginia, US",
        "Рестон, Virginia, United States",
    ] {
        let resolved = resolver.resolve_location_str(location, false).unwrap();
        assert_eq!(resolved.map(|r| r.geoname().id()), Some(RESTON_VA), "{location}");
    }

    let resolved = resolver
        .resolve_location(false, &["Virginia", "United States"])
        .unwrap();
    assert_eq!(resolved.map(|r| r.geoname().id()), Some(VIRGINIA));
}

#[test]
fn unmatched_terms_reject_the_candidate() {
    let resolver = MultipartLocationResolver::new(gazetteer());
    // no California division in Canada, and no Reston in California
    assert!(resolver
        .resolve_location(false, &["Reston", "Virginia", "CA"])
        .unwrap()
        .is_none());
    assert!(resolver.resolve_location_str(" , ", false).unwrap().is_none());
}
