// crates/geores-core/src/model/geoname.rs

//! The gazetteer record and its administrative ancestry keys.

use chrono::NaiveDate;
use chrono_tz::Tz;
use log::{error, warn};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use super::ancestry::{Ancestry, GeoNameRef};
use super::country::{country_name, CountryCode};
use super::feature::{FeatureClass, FeatureCode};
use crate::error::Result;
use crate::raw::GeoNameRaw;

/// One gazetteer record.
///
/// All fields are fixed at construction. The only mutable state is the
/// parent link, which is set through [`Ancestry::set_parent`] and validated
/// against the record's ancestry keys.
pub struct GeoName {
    id: i64,
    name: String,
    ascii_name: String,
    alternate_names: Vec<String>,
    preferred_name: Option<String>,
    latitude: f64,
    longitude: f64,
    feature_class: FeatureClass,
    feature_code: FeatureCode,
    primary_country_code: Option<CountryCode>,
    alternate_country_codes: Vec<CountryCode>,
    admin1_code: String,
    admin2_code: String,
    admin3_code: String,
    admin4_code: String,
    population: i64,
    elevation: i32,
    digital_elevation_model: i32,
    timezone: Option<Tz>,
    modification_date: NaiveDate,
    gazetteer_record: String,

    // derived from the immutable fields above
    ancestry_key: Option<String>,
    parent_ancestry_key: Option<String>,

    parent: RwLock<Option<GeoNameRef>>,
}

/// Administrative depth of a record: 0 for top-level divisions, `n` for
/// `ADMn`, 1 for territories and parishes, `i32::MAX` for everything else.
pub(crate) fn admin_level(class: FeatureClass, code: FeatureCode) -> i32 {
    if class != FeatureClass::A {
        return i32::MAX;
    }
    match code {
        FeatureCode::TERR | FeatureCode::PRSH => 1,
        c if c.is_top_level() => 0,
        c => c.adm_level().unwrap_or(i32::MAX),
    }
}

impl GeoName {
    pub fn from_raw(raw: GeoNameRaw) -> Self {
        let country = country_name(raw.primary_country_code);

        let named_after_country = !country.is_empty()
            && ((!raw.name.is_empty() && raw.name == country)
                || (!raw.ascii_name.is_empty() && raw.ascii_name == country)
                || raw.alternate_names.iter().any(|n| n == country));

        // a territory carrying its country's name acts as the top-level division
        let feature_code = if raw.feature_code == FeatureCode::TERR && named_after_country {
            FeatureCode::TERRI
        } else {
            raw.feature_code
        };

        let preferred_name = if raw.feature_code.is_top_level() && named_after_country {
            Some(country.to_string())
        } else {
            raw.preferred_name
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
        };

        let mut geoname = GeoName {
            id: raw.id,
            name: raw.name,
            ascii_name: raw.ascii_name,
            alternate_names: raw.alternate_names,
            preferred_name,
            latitude: raw.latitude,
            longitude: raw.longitude,
            feature_class: raw.feature_class,
            feature_code,
            primary_country_code: raw.primary_country_code,
            alternate_country_codes: raw.alternate_country_codes,
            admin1_code: raw.admin1_code,
            admin2_code: raw.admin2_code,
            admin3_code: raw.admin3_code,
            admin4_code: raw.admin4_code,
            population: raw.population,
            elevation: raw.elevation,
            digital_elevation_model: raw.digital_elevation_model,
            timezone: raw.timezone,
            modification_date: raw.modification_date,
            gazetteer_record: raw.gazetteer_record,
            ancestry_key: None,
            parent_ancestry_key: None,
            parent: RwLock::new(None),
        };
        geoname.ancestry_key = geoname.compute_ancestry_key();
        geoname.parent_ancestry_key = Some(geoname.build_ancestry_key(false)).filter(|k| !k.is_empty());
        geoname
    }

    /// Parses a GeoNames record.
    ///
    /// Additional `\n`-separated lines are the record's ancestors, nearest
    /// first, and are linked as parents. Linking stops at the first ancestor
    /// that is rejected.
    pub fn parse_record(record: &str, preferred_name: Option<&str>) -> Result<Arc<GeoName>> {
        let mut lines = record.split('\n').filter(|l| !l.trim().is_empty());
        let first = lines.next().unwrap_or_default();

        let mut raw = GeoNameRaw::from_tsv_line(first)?;
        raw.preferred_name = preferred_name.map(str::to_string);
        let geoname = Arc::new(GeoName::from_raw(raw));

        let mut current = Arc::clone(&geoname);
        for line in lines {
            let parent = Arc::new(GeoName::from_raw(GeoNameRaw::from_tsv_line(line)?));
            if !current.set_parent(Some(parent.clone())) {
                error!(
                    "Invalid ancestry path for GeoName [{}]: {}",
                    geoname,
                    record.replace('\n', " |@| ")
                );
                break;
            }
            current = parent;
        }

        Ok(geoname)
    }

    // -----------------------------------------------------------------------
    // ANCESTRY KEYS
    // -----------------------------------------------------------------------

    /// Dot-separated administrative path identifying this record as a parent,
    /// e.g. `US.VA.059` for Fairfax County.
    ///
    /// Only country-like and ADM1-ADM4 records have one.
    pub fn ancestry_key(&self) -> Option<&str> {
        self.ancestry_key.as_deref()
    }

    /// The ancestry key this record's parent is expected to have, one level
    /// broader than its own. `None` for top-level divisions.
    pub fn parent_ancestry_key(&self) -> Option<&str> {
        self.parent_ancestry_key.as_deref()
    }

    fn compute_ancestry_key(&self) -> Option<String> {
        if self.feature_class != FeatureClass::A || !self.feature_code.is_valid_admin_ancestor() {
            return None;
        }
        let own_code = match self.feature_code {
            FeatureCode::ADM1 => self.admin1_code.as_str(),
            FeatureCode::ADM2 => self.admin2_code.as_str(),
            FeatureCode::ADM3 => self.admin3_code.as_str(),
            FeatureCode::ADM4 => self.admin4_code.as_str(),
            _ => self.primary_country_code.as_ref().map_or("", |c| c.as_str()),
        };
        if own_code.trim().is_empty() {
            return None;
        }
        let key = self.build_ancestry_key(true);
        let key = key.trim();
        (!key.is_empty()).then(|| key.to_string())
    }

    /// Code contributed at `level` (0 = country .. 4 = ADM4).
    fn key_part(&self, level: i32) -> &str {
        match level {
            0 => self.primary_country_code.as_ref().map_or("", |c| c.as_str()),
            // territories and parishes hang directly off their country
            1 if self.skips_admin1() => "",
            1 => &self.admin1_code,
            2 => &self.admin2_code,
            3 => &self.admin3_code,
            _ => &self.admin4_code,
        }
    }

    /// Walks from country down to ADM4, appending each level broader than
    /// this record (and its own level when `include_self`). A chain cannot
    /// skip a level: an empty code followed by a non-empty one yields an
    /// empty key.
    fn build_ancestry_key(&self, include_self: bool) -> String {
        let name_level = admin_level(self.feature_class, self.feature_code);
        let mut key = String::new();
        let mut gap_seen = false;
        for key_level in 0..=4 {
            let wanted = name_level > key_level || (include_self && name_level == key_level);
            if !wanted {
                continue;
            }
            let part = self.key_part(key_level).trim();
            if part.is_empty() {
                // territories and parishes have no level-1 part by construction
                if !(key_level == 1 && self.skips_admin1()) {
                    gap_seen = true;
                }
                continue;
            }
            if gap_seen {
                return String::new();
            }
            if !key.is_empty() {
                key.push('.');
            }
            key.push_str(part);
        }
        key
    }

    fn skips_admin1(&self) -> bool {
        matches!(self.feature_code, FeatureCode::TERR | FeatureCode::PRSH)
    }

    pub(crate) fn admin_level(&self) -> i32 {
        admin_level(self.feature_class, self.feature_code)
    }

    pub(crate) fn current_parent(&self) -> Option<GeoNameRef> {
        self.parent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // -----------------------------------------------------------------------
    // ACCESSORS
    // -----------------------------------------------------------------------

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ascii_name(&self) -> &str {
        &self.ascii_name
    }

    pub fn alternate_names(&self) -> &[String] {
        &self.alternate_names
    }

    /// Preferred display name, falling back to [`GeoName::name`].
    pub fn preferred_name(&self) -> &str {
        self.preferred_name.as_deref().unwrap_or(&self.name)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn feature_class(&self) -> FeatureClass {
        self.feature_class
    }

    pub fn feature_code(&self) -> FeatureCode {
        self.feature_code
    }

    pub fn primary_country_code(&self) -> Option<CountryCode> {
        self.primary_country_code
    }

    /// Name of the primary country; empty when the record has none.
    pub fn primary_country_name(&self) -> &'static str {
        country_name(self.primary_country_code)
    }

    pub fn alternate_country_codes(&self) -> &[CountryCode] {
        &self.alternate_country_codes
    }

    pub fn admin1_code(&self) -> &str {
        &self.admin1_code
    }

    pub fn admin2_code(&self) -> &str {
        &self.admin2_code
    }

    pub fn admin3_code(&self) -> &str {
        &self.admin3_code
    }

    pub fn admin4_code(&self) -> &str {
        &self.admin4_code
    }

    pub fn population(&self) -> i64 {
        self.population
    }

    pub fn elevation(&self) -> i32 {
        self.elevation
    }

    pub fn digital_elevation_model(&self) -> i32 {
        self.digital_elevation_model
    }

    pub fn timezone(&self) -> Option<Tz> {
        self.timezone
    }

    pub fn modification_date(&self) -> NaiveDate {
        self.modification_date
    }

    /// The record text this GeoName was parsed from.
    pub fn gazetteer_record(&self) -> &str {
        &self.gazetteer_record
    }

    pub fn is_top_level_admin_division(&self) -> bool {
        self.feature_code.is_top_level()
    }

    pub fn is_top_level_territory(&self) -> bool {
        self.feature_code == FeatureCode::TERRI
    }
}

impl Ancestry for GeoName {
    fn geoname(&self) -> &GeoName {
        self
    }

    fn parent(&self) -> Option<GeoNameRef> {
        self.current_parent()
    }

    fn parent_id(&self) -> Option<i64> {
        self.current_parent().map(|p| p.id())
    }

    fn set_parent(&self, parent: Option<GeoNameRef>) -> bool {
        let Some(parent) = parent else {
            return false;
        };
        let candidate = parent.geoname();

        if candidate.feature_class != FeatureClass::A
            || !candidate.feature_code.is_valid_admin_ancestor()
        {
            error!(
                "Invalid administrative parent type [{}:{}] specified for GeoName [{}]; Parent [{}]",
                candidate.feature_class, candidate.feature_code, self, candidate
            );
            return false;
        }

        if let (Some(expected), Some(actual)) = (self.parent_ancestry_key(), candidate.ancestry_key()) {
            if !expected.starts_with(actual) {
                error!(
                    "Parent ancestry key [{}] does not match the expected key [{}] for GeoName [{}]; Parent [{}]",
                    actual, expected, self, candidate
                );
                return false;
            }
        }

        if candidate.id == self.id {
            warn!("Attempted to set parent to self: {}", candidate);
            return false;
        }

        *self.parent.write().unwrap_or_else(PoisonError::into_inner) = Some(parent);
        true
    }

    fn is_ancestry_resolved(&self) -> bool {
        self.admin_level() <= 0
            || self.parent_ancestry_key.is_none()
            || self
                .current_parent()
                .is_some_and(|p| p.is_ancestry_resolved())
    }
}

impl PartialEq for GeoName {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GeoName {}

impl std::hash::Hash for GeoName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for GeoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}) [pop: {}] <{}>",
            self.preferred_name(),
            self.primary_country_name(),
            self.admin1_code,
            self.population,
            self.id
        )
    }
}

impl fmt::Debug for GeoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoName")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("feature_code", &self.feature_code)
            .field("country", &self.primary_country_code)
            .field("ancestry_key", &self.ancestry_key)
            .field("parent_id", &self.parent_id())
            .finish()
    }
}
