// crates/geores-core/src/raw.rs

//! Raw GeoNames records as they appear in the tab-separated dumps.
//!
//! Column layout (see <https://download.geonames.org/export/dump/readme.txt>):
//!
//! | #  | field            | #  | field             |
//! |----|------------------|----|-------------------|
//! | 0  | geonameid        | 10 | admin1 code       |
//! | 1  | name             | 11 | admin2 code       |
//! | 2  | asciiname        | 12 | admin3 code       |
//! | 3  | alternatenames   | 13 | admin4 code       |
//! | 4  | latitude         | 14 | population        |
//! | 5  | longitude        | 15 | elevation         |
//! | 6  | feature class    | 16 | dem               |
//! | 7  | feature code     | 17 | timezone          |
//! | 8  | country code     | 18 | modification date |
//! | 9  | cc2              |    |                   |

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::error::{GeoError, Result};
use crate::model::country::CountryCode;
use crate::model::feature::{FeatureClass, FeatureCode};

/// Sentinel for numeric columns that are missing or unparseable.
pub const OUT_OF_BOUNDS: i32 = -9_999_999;

/// Number of columns in a complete GeoNames record.
pub const GEONAMES_COLUMNS: usize = 19;

/// Columns required before the record can be parsed at all (through admin2).
const MIN_COLUMNS: usize = 12;

/// One GeoNames record, field by field, before any derived state is computed.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoNameRaw {
    pub id: i64,
    pub name: String,
    pub ascii_name: String,
    pub alternate_names: Vec<String>,
    pub preferred_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub feature_class: FeatureClass,
    pub feature_code: FeatureCode,
    pub primary_country_code: Option<CountryCode>,
    pub alternate_country_codes: Vec<CountryCode>,
    pub admin1_code: String,
    pub admin2_code: String,
    pub admin3_code: String,
    pub admin4_code: String,
    pub population: i64,
    pub elevation: i32,
    pub digital_elevation_model: i32,
    pub timezone: Option<Tz>,
    pub modification_date: NaiveDate,
    /// The line this record was parsed from.
    pub gazetteer_record: String,
}

impl Default for GeoNameRaw {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            ascii_name: String::new(),
            alternate_names: Vec::new(),
            preferred_name: None,
            latitude: OUT_OF_BOUNDS as f64,
            longitude: OUT_OF_BOUNDS as f64,
            feature_class: FeatureClass::Null,
            feature_code: FeatureCode::Null,
            primary_country_code: None,
            alternate_country_codes: Vec::new(),
            admin1_code: String::new(),
            admin2_code: String::new(),
            admin3_code: String::new(),
            admin4_code: String::new(),
            population: OUT_OF_BOUNDS as i64,
            elevation: OUT_OF_BOUNDS,
            digital_elevation_model: OUT_OF_BOUNDS,
            timezone: None,
            modification_date: NaiveDate::default(),
            gazetteer_record: String::new(),
        }
    }
}

impl GeoNameRaw {
    /// Parses a single tab-separated GeoNames line.
    ///
    /// Unparseable numbers become [`OUT_OF_BOUNDS`]. A line with fewer than
    /// 19 columns is treated as truncated: nothing after admin2 is trusted.
    pub fn from_tsv_line(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let tokens: Vec<&str> = line.split('\t').collect();
        if tokens.len() < MIN_COLUMNS {
            return Err(GeoError::InvalidData(format!(
                "GeoNames record has {} columns, expected {}: {}",
                tokens.len(),
                GEONAMES_COLUMNS,
                line
            )));
        }

        let id = tokens[0].trim().parse::<i64>().map_err(|e| {
            GeoError::InvalidData(format!("Invalid geoname id [{}]: {}", tokens[0], e))
        })?;

        let mut raw = GeoNameRaw {
            id,
            name: tokens[1].to_string(),
            ascii_name: tokens[2].to_string(),
            alternate_names: split_list(tokens[3]).map(str::to_string).collect(),
            latitude: parse_or_oob(tokens[4], OUT_OF_BOUNDS as f64),
            longitude: parse_or_oob(tokens[5], OUT_OF_BOUNDS as f64),
            feature_class: FeatureClass::from_code(tokens[6]),
            feature_code: FeatureCode::from_code(tokens[7]),
            primary_country_code: CountryCode::parse(tokens[8]),
            alternate_country_codes: split_list(tokens[9])
                .filter_map(CountryCode::parse)
                .collect(),
            admin1_code: tokens[10].to_string(),
            admin2_code: tokens[11].to_string(),
            gazetteer_record: line.to_string(),
            ..GeoNameRaw::default()
        };

        // truncated records keep the sentinels from Default
        if tokens.len() >= GEONAMES_COLUMNS {
            raw.admin3_code = tokens[12].to_string();
            raw.admin4_code = tokens[13].to_string();
            raw.population = parse_or_oob(tokens[14], OUT_OF_BOUNDS as i64);
            raw.elevation = parse_or_oob(tokens[15], OUT_OF_BOUNDS);
            raw.digital_elevation_model = parse_or_oob(tokens[16], OUT_OF_BOUNDS);
            raw.timezone = tokens[17].trim().parse::<Tz>().ok();
            raw.modification_date = NaiveDate::parse_from_str(tokens[18].trim(), "%Y-%m-%d")
                .unwrap_or_default();
        }

        Ok(raw)
    }
}

fn split_list(field: &str) -> impl Iterator<Item = &str> {
    field.split(',').filter(|s| !s.is_empty())
}

fn parse_or_oob<T: std::str::FromStr>(field: &str, oob: T) -> T {
    field.trim().parse().unwrap_or(oob)
}
