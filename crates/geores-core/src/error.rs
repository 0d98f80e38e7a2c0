// crates/geores-core/src/error.rs
use thiserror::Error;

/// Errors produced by the resolution engine and its reference index.
///
/// Only index-layer failures surface from the resolvers; "no match" is an
/// empty result and rejected ancestry links are reported as `false`.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Search index error: {0}")]
    Search(#[from] tantivy::TantivyError),

    #[error("{context}")]
    Resolution {
        context: String,
        #[source]
        source: Box<GeoError>,
    },
}

impl GeoError {
    /// Wraps an index-layer failure with the query that triggered it.
    pub fn resolution(context: impl Into<String>, source: GeoError) -> Self {
        GeoError::Resolution {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, GeoError>;
