// crates/geores-core/src/model/feature.rs

//! GeoNames feature classes and feature codes.
//!
//! See <https://www.geonames.org/export/codes.html>. Only the codes the
//! resolvers reason about (administrative divisions, populated places and the
//! common region/landform codes) are enumerated; anything else parses to
//! [`FeatureCode::Null`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GeoError;

/// Broad category of a gazetteer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureClass {
    /// country, state, region
    A,
    /// stream, lake
    H,
    /// parks, area
    L,
    /// city, village
    P,
    /// road, railroad
    R,
    /// spot, building, farm
    S,
    /// mountain, hill, rock
    T,
    /// undersea
    U,
    /// forest, heath
    V,
    /// not available
    Null,
}

impl FeatureClass {
    /// Parses the single-letter class; empty or unknown input is `Null`.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "A" => FeatureClass::A,
            "H" => FeatureClass::H,
            "L" => FeatureClass::L,
            "P" => FeatureClass::P,
            "R" => FeatureClass::R,
            "S" => FeatureClass::S,
            "T" => FeatureClass::T,
            "U" => FeatureClass::U,
            "V" => FeatureClass::V,
            _ => FeatureClass::Null,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureClass::A => "A",
            FeatureClass::H => "H",
            FeatureClass::L => "L",
            FeatureClass::P => "P",
            FeatureClass::R => "R",
            FeatureClass::S => "S",
            FeatureClass::T => "T",
            FeatureClass::U => "U",
            FeatureClass::V => "V",
            FeatureClass::Null => "NULL",
        }
    }
}

impl fmt::Display for FeatureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! feature_codes {
    ($( $(#[$doc:meta])* $code:ident ),+ $(,)?) => {
        /// Specific type of a gazetteer record.
        #[allow(clippy::upper_case_acronyms)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum FeatureCode {
            $( $(#[$doc])* $code, )+
            /// not available or not recognized
            Null,
        }

        impl FeatureCode {
            /// Every code, `Null` included.
            pub const ALL: &'static [FeatureCode] = &[ $( FeatureCode::$code, )+ FeatureCode::Null ];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( FeatureCode::$code => stringify!($code), )+
                    FeatureCode::Null => "NULL",
                }
            }

            /// Looks up a code by its GeoNames name; `None` if unknown.
            pub fn lookup(code: &str) -> Option<Self> {
                match code {
                    $( stringify!($code) => Some(FeatureCode::$code), )+
                    "NULL" => Some(FeatureCode::Null),
                    _ => None,
                }
            }
        }
    };
}

feature_codes! {
    // --- A: administrative divisions ---
    /// first-order administrative division
    ADM1,
    /// historical first-order administrative division
    ADM1H,
    /// second-order administrative division
    ADM2,
    ADM2H,
    /// third-order administrative division
    ADM3,
    ADM3H,
    /// fourth-order administrative division
    ADM4,
    ADM4H,
    /// fifth-order administrative division
    ADM5,
    ADM5H,
    /// administrative division (undifferentiated)
    ADMD,
    ADMDH,
    /// leased area
    LTER,
    /// political entity
    PCL,
    /// dependent political entity
    PCLD,
    /// freely associated state
    PCLF,
    /// historical political entity
    PCLH,
    /// independent political entity
    PCLI,
    /// section of independent political entity
    PCLIX,
    /// semi-independent political entity
    PCLS,
    /// parish
    PRSH,
    /// territory
    TERR,
    /// territory acting as its own top-level division (name matches its country)
    TERRI,
    /// zone
    ZN,
    /// buffer zone
    ZNB,
    // --- P: populated places ---
    PPL,
    /// seat of a first-order administrative division
    PPLA,
    PPLA2,
    PPLA3,
    PPLA4,
    PPLA5,
    /// capital of a political entity
    PPLC,
    /// historical capital of a political entity
    PPLCH,
    PPLF,
    PPLG,
    /// historical populated place
    PPLH,
    PPLL,
    /// abandoned populated place
    PPLQ,
    PPLR,
    PPLS,
    /// destroyed populated place
    PPLW,
    /// section of populated place
    PPLX,
    /// israeli settlement
    STLMT,
    // --- L: regions and areas ---
    AREA,
    /// continent
    CONT,
    RGN,
    RGNE,
    /// historical region
    RGNH,
    RGNL,
    PRK,
    // --- H / T / S: common physical and spot features ---
    BAY,
    CAPE,
    ISL,
    ISLS,
    LK,
    MT,
    MTS,
    STM,
    VAL,
    AIRP,
    HSTS,
    CNYN,
}

impl FeatureCode {
    /// Deprecated codes that are excluded when a query does not include historical records.
    pub fn is_historical(&self) -> bool {
        matches!(
            self,
            FeatureCode::ADM1H
                | FeatureCode::ADM2H
                | FeatureCode::ADM3H
                | FeatureCode::ADM4H
                | FeatureCode::ADM5H
                | FeatureCode::ADMDH
                | FeatureCode::PCLH
                | FeatureCode::PPLH
                | FeatureCode::PPLCH
                | FeatureCode::RGNH
        )
    }

    /// Country-like codes that terminate an ancestry chain.
    pub fn is_top_level(&self) -> bool {
        matches!(
            self,
            FeatureCode::PCL
                | FeatureCode::PCLD
                | FeatureCode::PCLF
                | FeatureCode::PCLI
                | FeatureCode::PCLIX
                | FeatureCode::PCLS
                | FeatureCode::TERRI
        )
    }

    /// Codes a record must carry to be accepted as somebody's parent.
    pub fn is_valid_admin_ancestor(&self) -> bool {
        self.is_top_level()
            || matches!(
                self,
                FeatureCode::ADM1 | FeatureCode::ADM2 | FeatureCode::ADM3 | FeatureCode::ADM4
            )
    }

    /// The `n` of `ADMn` / `ADMnH`, if this is a numbered administrative level.
    pub fn adm_level(&self) -> Option<i32> {
        match self {
            FeatureCode::ADM1 | FeatureCode::ADM1H => Some(1),
            FeatureCode::ADM2 | FeatureCode::ADM2H => Some(2),
            FeatureCode::ADM3 | FeatureCode::ADM3H => Some(3),
            FeatureCode::ADM4 | FeatureCode::ADM4H => Some(4),
            FeatureCode::ADM5 | FeatureCode::ADM5H => Some(5),
            _ => None,
        }
    }

    /// Parses a GeoNames code; empty and unrecognized codes become `Null`.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        if code.is_empty() {
            return FeatureCode::Null;
        }
        FeatureCode::lookup(code).unwrap_or_else(|| {
            log::trace!("Unrecognized feature code [{}]", code);
            FeatureCode::Null
        })
    }
}

impl FromStr for FeatureCode {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureCode::lookup(&s.trim().to_ascii_uppercase())
            .ok_or_else(|| GeoError::InvalidData(format!("Unknown feature code: {s}")))
    }
}

impl fmt::Display for FeatureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
