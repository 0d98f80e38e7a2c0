//! Resolving place names found in free text
//!
//! This example demonstrates how to:
//! - Build an in-memory index from a GeoNames dump
//! - Query the gazetteer directly
//! - Resolve a document's location names with context heuristics
//!
//! Run with an optional path to a GeoNames TSV file:
//!   cargo run --example resolve_text -- allCountries.txt

use geores_rs::*;
use std::sync::Arc;

const FIXTURE: &str = "crates/geores-core/tests/fixtures/gazetteer.tsv";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    println!("=== geores: resolving names from text ===\n");

    let path = std::env::args().nth(1).unwrap_or_else(|| FIXTURE.to_string());
    let mut builder = MemoryIndexBuilder::default();
    builder.add_path(&path)?;
    let index = builder.build();
    println!("✓ Indexed {:?}\n", index.stats());

    let gazetteer: Arc<dyn Gazetteer> = Arc::new(IndexGazetteer::new(Arc::new(index)));

    // Example 1: a plain gazetteer query
    println!("--- Example 1: Every Springfield, most relevant first ---");
    let mut query = QueryBuilder::new();
    query.location("Springfield").max_results(5).filter_dupes(true);
    for hit in gazetteer.closest_locations(&query.build())? {
        println!("{}", hit.geoname().geoname());
    }
    println!();

    // Example 2: the same name, disambiguated by the rest of the document
    println!("--- Example 2: Springfield next to Boston, Haverhill and Worcester ---");
    let resolver = LocationResolver::new(gazetteer.clone());
    let occurrences = LocationOccurrence::from_names(&["American", "Boston", "Haverhill", "Worcester", "Springfield"]);
    for resolved in resolver.resolve(&occurrences, true)? {
        println!("{resolved}");
        let chain: Vec<String> = resolved
            .geoname()
            .ancestors()
            .iter()
            .map(|a| a.geoname().preferred_name().to_string())
            .collect();
        println!("  ancestry: {}", chain.join(" < "));
    }
    println!();

    // Example 3: no context, population decides
    println!("--- Example 3: Springfield alone ---");
    let config = ResolverConfig {
        max_hit_depth: 1,
        ..ResolverConfig::default()
    };
    for resolved in resolver.resolve_locations(&LocationOccurrence::from_names(&["Springfield"]), &config)? {
        println!("{resolved}");
    }

    Ok(())
}
