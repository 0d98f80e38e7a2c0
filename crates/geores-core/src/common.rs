// crates/geores-core/src/common.rs
use serde::{Deserialize, Serialize};

/// Simple aggregate statistics for an index.
///
/// Returned by [`MemoryIndex::stats`](crate::memory::MemoryIndex::stats).
/// `documents` counts one entry per distinct name of a record, so it is
/// always at least `records` for records with a non-empty name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub records: usize,
    pub documents: usize,
    pub tokens: usize,
}
