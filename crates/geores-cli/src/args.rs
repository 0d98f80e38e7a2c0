use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for geores
#[derive(Debug, Parser)]
#[command(
    name = "geores",
    version,
    about = "Resolve place names against a GeoNames gazetteer"
)]
pub struct CliArgs {
    /// GeoNames TSV dump to index, plain or gzipped (e.g. allCountries.txt); repeatable
    #[arg(short = 'i', long = "input", global = true)]
    pub input: Vec<PathBuf>,

    /// Binary index snapshot; loaded instead of --input when it exists
    #[arg(short = 's', long = "snapshot", global = true)]
    pub snapshot: Option<PathBuf>,

    /// GeoNames alternateNamesV2 dump supplying English preferred names
    #[arg(short = 'a', long = "alternate-names", global = true)]
    pub alternate_names: Option<PathBuf>,

    /// Store each record with its full ancestry in the index
    #[arg(long = "full-ancestry", global = true)]
    pub full_ancestry: bool,

    /// Print JSON instead of text
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Named feature-code groups for `search --codes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CodeSet {
    Country,
    Admin,
    AncestryAdmin,
    City,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a summary of the index contents
    Stats,

    /// Look up a record by GeoNames id
    Lookup {
        id: i64,

        /// ON_CREATE, LAZY or MANUAL
        #[arg(long, default_value = "ON_CREATE")]
        ancestry: String,
    },

    /// Run one gazetteer query
    Search {
        name: String,

        #[arg(long, default_value_t = 10)]
        max: usize,

        /// OFF, NO_EXACT or FILL
        #[arg(long = "fuzzy-mode", default_value = "OFF")]
        fuzzy_mode: String,

        /// ON_CREATE, LAZY or MANUAL
        #[arg(long, default_value = "LAZY")]
        ancestry: String,

        /// Include historical records
        #[arg(long)]
        historical: bool,

        /// Drop repeated records
        #[arg(long)]
        dedupe: bool,

        /// Restrict to feature-code groups
        #[arg(long = "codes", value_enum)]
        codes: Vec<CodeSet>,

        /// Restrict to descendants of these records
        #[arg(long = "parent")]
        parents: Vec<i64>,
    },

    /// Resolve location names found in one document
    Resolve {
        #[arg(required = true)]
        names: Vec<String>,

        /// Candidates per name; 1 disables context heuristics
        #[arg(long)]
        depth: Option<usize>,

        /// Names considered together
        #[arg(long)]
        window: Option<usize>,

        #[arg(long)]
        fuzzy: bool,

        /// ON_CREATE, LAZY or MANUAL
        #[arg(long)]
        ancestry: Option<String>,

        /// JSON resolver configuration; flags override it
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Resolve a city / state / country triple
    Multipart {
        #[arg(long, default_value = "")]
        city: String,

        #[arg(long, default_value = "")]
        state: String,

        #[arg(long, default_value = "")]
        country: String,

        #[arg(long)]
        fuzzy: bool,
    },

    /// Resolve a comma-separated name, narrowest first (e.g. "Reston, Virginia, US")
    Locate {
        location: String,

        #[arg(long)]
        fuzzy: bool,
    },

    /// Build the index from --input and write it as a snapshot
    Snapshot { out: PathBuf },
}
