// crates/geores-core/src/resolver/multipart/level.rs
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gazetteer::QueryBuilder;
use crate::model::{FeatureClass, FeatureCode, GeoName};

/// Administrative levels searched by the multi-part resolver, broadest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchLevel {
    Country,
    Admin1,
    Admin2,
    Admin3,
    Admin4,
    /// ADM5 and undifferentiated administrative divisions.
    AdminX,
    City,
}

impl SearchLevel {
    pub const ALL: [SearchLevel; 7] = [
        SearchLevel::Country,
        SearchLevel::Admin1,
        SearchLevel::Admin2,
        SearchLevel::Admin3,
        SearchLevel::Admin4,
        SearchLevel::AdminX,
        SearchLevel::City,
    ];

    /// The level a record would be found at, if any.
    pub fn for_geoname(geoname: &GeoName) -> Option<SearchLevel> {
        if geoname.is_top_level_admin_division() {
            return Some(SearchLevel::Country);
        }
        match geoname.feature_class() {
            FeatureClass::A => match geoname.feature_code() {
                FeatureCode::ADM1 | FeatureCode::ADM1H | FeatureCode::TERR | FeatureCode::PRSH => {
                    Some(SearchLevel::Admin1)
                }
                FeatureCode::ADM2 | FeatureCode::ADM2H => Some(SearchLevel::Admin2),
                FeatureCode::ADM3 | FeatureCode::ADM3H => Some(SearchLevel::Admin3),
                FeatureCode::ADM4 | FeatureCode::ADM4H => Some(SearchLevel::Admin4),
                FeatureCode::ADM5 | FeatureCode::ADMD | FeatureCode::ADMDH => Some(SearchLevel::AdminX),
                _ => None,
            },
            FeatureClass::P => Some(SearchLevel::City),
            _ => None,
        }
    }

    /// Replaces the builder's feature codes with this level's.
    pub fn apply<'b>(&self, builder: &'b mut QueryBuilder) -> &'b mut QueryBuilder {
        builder.clear_feature_codes();
        match self {
            SearchLevel::Country => builder.add_country_codes(),
            SearchLevel::Admin1 => builder.add_feature_codes([
                FeatureCode::ADM1,
                FeatureCode::ADM1H,
                FeatureCode::TERR,
                FeatureCode::PRSH,
            ]),
            SearchLevel::Admin2 => builder.add_feature_codes([FeatureCode::ADM2, FeatureCode::ADM2H]),
            SearchLevel::Admin3 => builder.add_feature_codes([FeatureCode::ADM3, FeatureCode::ADM3H]),
            SearchLevel::Admin4 => builder.add_feature_codes([FeatureCode::ADM4, FeatureCode::ADM4H]),
            SearchLevel::AdminX => {
                builder.add_feature_codes([FeatureCode::ADM5, FeatureCode::ADMD, FeatureCode::ADMDH])
            }
            SearchLevel::City => builder.add_city_codes(),
        }
    }

    /// The next level down; `None` below cities.
    pub fn narrow(&self) -> Option<SearchLevel> {
        match self {
            SearchLevel::Country => Some(SearchLevel::Admin1),
            SearchLevel::Admin1 => Some(SearchLevel::Admin2),
            SearchLevel::Admin2 => Some(SearchLevel::Admin3),
            SearchLevel::Admin3 => Some(SearchLevel::Admin4),
            SearchLevel::Admin4 => Some(SearchLevel::AdminX),
            SearchLevel::AdminX => Some(SearchLevel::City),
            SearchLevel::City => None,
        }
    }

    /// The next level up; `None` above countries.
    pub fn broaden(&self) -> Option<SearchLevel> {
        match self {
            SearchLevel::Country => None,
            SearchLevel::Admin1 => Some(SearchLevel::Country),
            SearchLevel::Admin2 => Some(SearchLevel::Admin1),
            SearchLevel::Admin3 => Some(SearchLevel::Admin2),
            SearchLevel::Admin4 => Some(SearchLevel::Admin3),
            SearchLevel::AdminX => Some(SearchLevel::Admin4),
            SearchLevel::City => Some(SearchLevel::AdminX),
        }
    }

    pub fn can_narrow(&self) -> bool {
        self.narrow().is_some()
    }

    /// The code `geoname` carries for this level. Levels without a code
    /// column (AdminX, City) yield `None`.
    pub fn code(&self, geoname: &GeoName) -> Option<String> {
        match self {
            SearchLevel::Country => geoname.primary_country_code().map(|c| c.to_string()),
            SearchLevel::Admin1 => Some(geoname.admin1_code().to_string()),
            SearchLevel::Admin2 => Some(geoname.admin2_code().to_string()),
            SearchLevel::Admin3 => Some(geoname.admin3_code().to_string()),
            SearchLevel::Admin4 => Some(geoname.admin4_code().to_string()),
            SearchLevel::AdminX | SearchLevel::City => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            SearchLevel::Admin1
                | SearchLevel::Admin2
                | SearchLevel::Admin3
                | SearchLevel::Admin4
                | SearchLevel::AdminX
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchLevel::Country => "COUNTRY",
            SearchLevel::Admin1 => "ADMIN1",
            SearchLevel::Admin2 => "ADMIN2",
            SearchLevel::Admin3 => "ADMIN3",
            SearchLevel::Admin4 => "ADMIN4",
            SearchLevel::AdminX => "ADMINX",
            SearchLevel::City => "CITY",
        }
    }
}

impl fmt::Display for SearchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
