//! Resolving structured place names
//!
//! This example demonstrates how to:
//! - Resolve a city / state / country triple
//! - Resolve an arbitrary comma-separated hierarchy
//! - Print the results as JSON views
//!
//! Run with an optional path to a GeoNames TSV file:
//!   cargo run --example multipart -- allCountries.txt

use geores_rs::api::{LocationView, MultipartView};
use geores_rs::*;
use std::sync::Arc;

const FIXTURE: &str = "crates/geores-core/tests/fixtures/gazetteer.tsv";

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    println!("=== geores: multi-part resolution ===\n");

    let path = std::env::args().nth(1).unwrap_or_else(|| FIXTURE.to_string());
    let mut builder = MemoryIndexBuilder::default();
    builder.add_path(&path)?;
    let gazetteer = Arc::new(IndexGazetteer::new(Arc::new(builder.build())));
    let resolver = MultipartLocationResolver::new(gazetteer);

    // Example 1: fixed city / state / country
    println!("--- Example 1: Reston, Virginia, United States ---");
    let name = MultipartLocationName::new("Reston", "Virginia", "United States");
    let resolved = resolver.resolve_multipart_location(&name, false)?;
    println!("{}\n", serde_json::to_string_pretty(&MultipartView::from(&resolved))?);

    // Example 2: any number of terms, narrowest first
    println!("--- Example 2: free-form hierarchies ---");
    for input in ["Reston, Virginia, US", "Springfield, Massachusetts", "Reston, Virginia, CA"] {
        match resolver.resolve_location_str(input, false)? {
            Some(found) => println!(
                "{input:<30} -> {}",
                serde_json::to_string(&LocationView::from(&found))?
            ),
            None => println!("{input:<30} -> no consistent match"),
        }
    }

    Ok(())
}
