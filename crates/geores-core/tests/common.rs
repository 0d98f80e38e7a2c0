// Shared fixture loading for the integration tests.
#![allow(dead_code)]

use geores_core::{Gazetteer, IndexGazetteer, IndexOptions, MemoryIndex, MemoryIndexBuilder};
use std::path::PathBuf;
use std::sync::Arc;

pub const BOSTON_MA: i64 = 4930956;
pub const HAVERHILL_MA: i64 = 4939085;
pub const WORCESTER_MA: i64 = 4956184;
pub const SPRINGFIELD_MA: i64 = 4951788;
pub const SPRINGFIELD_IL: i64 = 4250542;
pub const SPRINGFIELD_MO: i64 = 4409896;
pub const RESTON_VA: i64 = 4781530;
pub const RESTON_MB: i64 = 6121977;
pub const FAIRFAX_COUNTY: i64 = 4758041;
pub const VIRGINIA: i64 = 6254928;
pub const UNITED_STATES: i64 = 6252001;
pub const CANADA: i64 = 6251999;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

pub fn index(options: IndexOptions) -> MemoryIndex {
    let mut builder = MemoryIndexBuilder::new(options);
    builder.add_path(fixture("gazetteer.tsv")).unwrap();
    builder
        .alternate_names_path(fixture("alternate_names.tsv"))
        .unwrap();
    builder.build()
}

pub fn gazetteer() -> Arc<dyn Gazetteer> {
    Arc::new(IndexGazetteer::new(Arc::new(index(IndexOptions::default()))))
}
