//! geores: command-line interface for geores-core
//!
//! Builds an in-memory index from GeoNames dumps (or loads a snapshot of
//! one) and runs gazetteer queries and resolvers against it.
//!
//! Usage examples
//! --------------
//!
//! - Build a snapshot once, then reuse it
//!   $ geores --input allCountries.txt.gz --alternate-names alternateNamesV2.txt snapshot geo.idx.bin.gz
//!   $ geores --snapshot geo.idx.bin.gz stats
//!
//! - Query the gazetteer
//!   $ geores -s geo.idx.bin.gz search springfield --max 5 --fuzzy-mode fill
//!
//! - Resolve names found in one document
//!   $ geores -s geo.idx.bin.gz resolve Boston Haverhill Worcester Springfield
//!
//! - Resolve structured names
//!   $ geores -s geo.idx.bin.gz multipart --city Reston --state Virginia --country "United States"
//!   $ geores -s geo.idx.bin.gz --json locate "Reston, Virginia, US"
//!
//! Logging goes through `env_logger` (default level `info`, override with
//! `RUST_LOG`).
mod args;

use crate::args::{CliArgs, CodeSet, Commands};
use anyhow::{bail, Context};
use clap::Parser;
use geores_core::api::{GeoNameView, LocationView, MultipartView};
use geores_core::{
    Ancestry, AncestryMode, FuzzyMode, Gazetteer, IndexGazetteer, IndexOptions, LocationOccurrence,
    LocationResolver, MemoryIndex, MemoryIndexBuilder, MultipartLocationName,
    MultipartLocationResolver, QueryBuilder, ResolvedLocation, ResolvedMultipartLocation,
    ResolverConfig,
};
use log::info;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();

    if let Commands::Snapshot { out } = &args.command {
        let index = build_index(&args)?;
        index
            .save_snapshot(out)
            .with_context(|| format!("writing snapshot {}", out.display()))?;
        println!("Wrote {:?} to {}", index.stats(), out.display());
        return Ok(());
    }

    let index = Arc::new(load_index(&args)?);
    let gazetteer: Arc<dyn Gazetteer> = Arc::new(IndexGazetteer::new(index.clone()));

    match &args.command {
        Commands::Stats => {
            let stats = index.stats();
            println!("Index statistics:");
            println!("  Records: {}", stats.records);
            println!("  Names: {}", stats.documents);
            println!("  Distinct tokens: {}", stats.tokens);
        }

        Commands::Lookup { id, ancestry } => {
            let mode: AncestryMode = ancestry.parse()?;
            match gazetteer.geoname(*id, mode)? {
                Some(geoname) if args.json => {
                    print_json(&GeoNameView::new(&*geoname))?
                }
                Some(geoname) => {
                    println!("{}", geoname.geoname());
                    for ancestor in geoname.ancestors() {
                        println!("  < {}", ancestor.geoname());
                    }
                }
                None => eprintln!("No record found for id {id}"),
            }
        }

        Commands::Search {
            name,
            max,
            fuzzy_mode,
            ancestry,
            historical,
            dedupe,
            codes,
            parents,
        } => {
            let mut builder = QueryBuilder::new();
            builder
                .location(name)
                .max_results(*max)
                .fuzzy_mode(fuzzy_mode.parse::<FuzzyMode>()?)
                .ancestry_mode(ancestry.parse::<AncestryMode>()?)
                .include_historical(*historical)
                .filter_dupes(*dedupe)
                .add_parent_ids(parents.iter().copied());
            for code in codes {
                match code {
                    CodeSet::Country => builder.add_country_codes(),
                    CodeSet::Admin => builder.add_admin_codes(),
                    CodeSet::AncestryAdmin => builder.add_ancestry_admin_codes(),
                    CodeSet::City => builder.add_city_codes(),
                };
            }
            let hits = gazetteer.closest_locations(&builder.build())?;
            print_locations(&hits, args.json)?;
        }

        Commands::Resolve {
            names,
            depth,
            window,
            fuzzy,
            ancestry,
            config,
        } => {
            let mut settings = match config {
                Some(path) => ResolverConfig::from_json_path(path)?,
                None => ResolverConfig::default(),
            };
            if let Some(depth) = depth {
                settings.max_hit_depth = *depth;
            }
            if let Some(window) = window {
                settings.max_context_window = *window;
            }
            if *fuzzy {
                settings.fuzzy = true;
            }
            if let Some(mode) = ancestry {
                settings.ancestry_mode = mode.parse()?;
            }
            info!("Resolving {} names with {:?}", names.len(), settings);

            let resolver = LocationResolver::new(gazetteer);
            let occurrences = LocationOccurrence::from_names(names);
            let resolved = resolver.resolve_locations(&occurrences, &settings)?;
            print_locations(&resolved, args.json)?;
        }

        Commands::Multipart {
            city,
            state,
            country,
            fuzzy,
        } => {
            if city.is_empty() && state.is_empty() && country.is_empty() {
                bail!("at least one of --city, --state or --country is required");
            }
            let resolver = MultipartLocationResolver::new(gazetteer);
            let name = MultipartLocationName::new(city.as_str(), state.as_str(), country.as_str());
            let resolved = resolver.resolve_multipart_location(&name, *fuzzy)?;
            print_multipart(&resolved, args.json)?;
        }

        Commands::Locate { location, fuzzy } => {
            let resolver = MultipartLocationResolver::new(gazetteer);
            match resolver.resolve_location_str(location, *fuzzy)? {
                Some(found) => print_locations(std::slice::from_ref(&found), args.json)?,
                None => println!("No location found for: {location}"),
            }
        }

        // written before any index is loaded
        Commands::Snapshot { .. } => {}
    }

    Ok(())
}

/// Loads `--snapshot` if it exists, otherwise builds from `--input`.
fn load_index(args: &CliArgs) -> anyhow::Result<MemoryIndex> {
    if let Some(path) = &args.snapshot {
        if path.exists() {
            return MemoryIndex::load_snapshot(path)
                .with_context(|| format!("loading snapshot {}", path.display()));
        }
        if args.input.is_empty() {
            bail!("snapshot {} does not exist and no --input was given", path.display());
        }
    }
    build_index(args)
}

fn build_index(args: &CliArgs) -> anyhow::Result<MemoryIndex> {
    if args.input.is_empty() {
        bail!("no GeoNames input given (use --input or --snapshot)");
    }
    let mut builder = MemoryIndexBuilder::new(IndexOptions {
        full_ancestry: args.full_ancestry,
    });
    for path in &args.input {
        builder
            .add_path(path)
            .with_context(|| format!("reading {}", path.display()))?;
    }
    if let Some(path) = &args.alternate_names {
        builder
            .alternate_names_path(path)
            .with_context(|| format!("reading {}", path.display()))?;
    }
    Ok(builder.build())
}

fn print_locations(locations: &[ResolvedLocation], json: bool) -> anyhow::Result<()> {
    if json {
        let views: Vec<LocationView> = locations.iter().map(Into::into).collect();
        return print_json(&views);
    }
    if locations.is_empty() {
        println!("No matches");
    }
    for location in locations {
        println!("{location}");
    }
    Ok(())
}

fn print_multipart(location: &ResolvedMultipartLocation, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&MultipartView::from(location));
    }
    let show = |label: &str, part: &Option<ResolvedLocation>| match part {
        Some(p) => println!("{label}: {}", p.geoname().geoname()),
        None => println!("{label}: -"),
    };
    show("City", &location.city);
    show("State", &location.state);
    show("Country", &location.country);
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
