// crates/geores-core/src/api.rs

//! # JSON views
//!
//! Flat, serializable snapshots of resolved locations for callers that
//! emit JSON (the CLI, services). Building a view walks the record's
//! ancestry, which loads it if the record was created lazily.

use serde::Serialize;

use crate::model::{Ancestry, GeoName, ResolvedLocation};
use crate::resolver::ResolvedMultipartLocation;

/// One link of an ancestry chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AncestorView {
    pub id: i64,
    pub name: String,
    pub feature_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoNameView {
    pub id: i64,
    pub name: String,
    pub ascii_name: String,
    pub preferred_name: String,
    pub feature_class: String,
    pub feature_code: String,
    pub country_code: Option<String>,
    pub country_name: String,
    pub admin1_code: String,
    pub admin2_code: String,
    pub admin3_code: String,
    pub admin4_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub population: i64,
    pub timezone: Option<String>,
    /// Parent first, top-level division last.
    pub ancestry: Vec<AncestorView>,
}

impl GeoNameView {
    pub fn new(record: &dyn Ancestry) -> Self {
        let g: &GeoName = record.geoname();
        Self {
            id: g.id(),
            name: g.name().to_string(),
            ascii_name: g.ascii_name().to_string(),
            preferred_name: g.preferred_name().to_string(),
            feature_class: g.feature_class().to_string(),
            feature_code: g.feature_code().to_string(),
            country_code: g.primary_country_code().map(|c| c.to_string()),
            country_name: g.primary_country_name().to_string(),
            admin1_code: g.admin1_code().to_string(),
            admin2_code: g.admin2_code().to_string(),
            admin3_code: g.admin3_code().to_string(),
            admin4_code: g.admin4_code().to_string(),
            latitude: g.latitude(),
            longitude: g.longitude(),
            population: g.population(),
            timezone: g.timezone().map(|tz| tz.name().to_string()),
            ancestry: record
                .ancestors()
                .iter()
                .map(|a| AncestorView {
                    id: a.id(),
                    name: a.geoname().preferred_name().to_string(),
                    feature_code: a.geoname().feature_code().to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationView {
    pub text: String,
    pub position: usize,
    pub matched_name: String,
    pub fuzzy: bool,
    pub confidence: f32,
    pub geoname: GeoNameView,
}

impl From<&ResolvedLocation> for LocationView {
    fn from(location: &ResolvedLocation) -> Self {
        Self {
            text: location.location().text.clone(),
            position: location.location().position,
            matched_name: location.matched_name().to_string(),
            fuzzy: location.is_fuzzy(),
            confidence: location.confidence(),
            geoname: GeoNameView::new(&**location.geoname()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultipartView {
    pub city: Option<LocationView>,
    pub state: Option<LocationView>,
    pub country: Option<LocationView>,
}

impl From<&ResolvedMultipartLocation> for MultipartView {
    fn from(location: &ResolvedMultipartLocation) -> Self {
        Self {
            city: location.city.as_ref().map(LocationView::from),
            state: location.state.as_ref().map(LocationView::from),
            country: location.country.as_ref().map(LocationView::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeoNameRef, LocationOccurrence};

    #[test]
    fn view_carries_ancestry_chain() {
        let record = "4781530\tReston\tReston\t\t38.96872\t-77.3411\tP\tPPL\tUS\t\tVA\t059\t\t\t58404\t\t102\tAmerica/New_York\t2011-05-14\n\
6254928\tVirginia\tVirginia\t\t37.54812\t-77.44675\tA\tADM1\tUS\t\tVA\t\t\t\t8001024\t\t95\tAmerica/New_York\t2016-06-14\n\
6252001\tUnited States\tUnited States\t\t39.76\t-98.5\tA\tPCLI\tUS\t\t00\t\t\t\t327167434\t\t543\t\t2020-01-02";
        let geoname: GeoNameRef = GeoName::parse_record(record, None).unwrap();
        let resolved = ResolvedLocation::new(LocationOccurrence::new("Reston", 4), geoname, "Reston", false);

        let view = LocationView::from(&resolved);
        assert_eq!(view.geoname.id, 4781530);
        assert_eq!(view.geoname.country_name, "United States");
        assert_eq!(view.geoname.timezone.as_deref(), Some("America/New_York"));
        let chain: Vec<i64> = view.geoname.ancestry.iter().map(|a| a.id).collect();
        assert_eq!(chain, vec![6254928, 6252001]);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["geoname"]["ancestry"][1]["feature_code"], "PCLI");
        assert_eq!(json["position"], 4);
    }
}
