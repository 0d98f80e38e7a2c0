// crates/geores-core/src/config.rs

//! Resolver settings, loadable from JSON when the `json` feature is on.

use serde::{Deserialize, Serialize};

use crate::gazetteer::AncestryMode;

pub use crate::memory::IndexOptions;

/// Knobs of the single-occurrence heuristic resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Candidates fetched per occurrence. `1` disables the context heuristic.
    pub max_hit_depth: usize,
    /// Occurrences considered together when picking candidates. Must be at
    /// least 1 when the context heuristic runs, or resolution fails with
    /// [`GeoError::InvalidParameter`](crate::error::GeoError::InvalidParameter).
    pub max_context_window: usize,
    pub fuzzy: bool,
    pub ancestry_mode: AncestryMode,
}

impl ResolverConfig {
    pub const DEFAULT_MAX_HIT_DEPTH: usize = 5;
    pub const DEFAULT_MAX_CONTEXT_WINDOW: usize = 5;
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_hit_depth: Self::DEFAULT_MAX_HIT_DEPTH,
            max_context_window: Self::DEFAULT_MAX_CONTEXT_WINDOW,
            fuzzy: false,
            ancestry_mode: AncestryMode::Lazy,
        }
    }
}

#[cfg(feature = "json")]
impl ResolverConfig {
    pub fn from_json_str(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_path(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                crate::error::GeoError::NotFound(path.display().to_string())
            } else {
                crate::error::GeoError::Io(e)
            }
        })?;
        Self::from_json_str(&text)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = ResolverConfig::from_json_str(r#"{"fuzzy": true, "ancestry_mode": "ON_CREATE"}"#).unwrap();
        assert_eq!(
            config,
            ResolverConfig {
                fuzzy: true,
                ancestry_mode: AncestryMode::OnCreate,
                ..ResolverConfig::default()
            }
        );
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolver.json");
        std::fs::write(&path, r#"{"max_hit_depth": 1, "max_context_window": 3}"#).unwrap();
        let config = ResolverConfig::from_json_path(&path).unwrap();
        assert_eq!(config.max_hit_depth, 1);
        assert_eq!(config.max_context_window, 3);
        assert!(!config.fuzzy);

        assert!(matches!(
            ResolverConfig::from_json_path(dir.path().join("missing.json")),
            Err(crate::error::GeoError::NotFound(_))
        ));
    }
}
