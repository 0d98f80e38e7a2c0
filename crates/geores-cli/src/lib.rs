//! geores-cli
//! ==========
//!
//! Command-line interface for the `geores-core` place-name resolver.
//!
//! This crate primarily provides a binary (`geores`). We include a small
//! library target so that docs.rs renders a documentation page and shows this
//! overview.
//!
//! Quick start
//! -----------
//!
//! ```text
//! geores --input allCountries.txt.gz snapshot geo.idx.bin.gz
//! geores --snapshot geo.idx.bin.gz stats
//! geores --snapshot geo.idx.bin.gz resolve Boston Haverhill Worcester Springfield
//! geores --snapshot geo.idx.bin.gz locate "Reston, Virginia, United States"
//! ```
//!
//! For programmatic access, use the [`geores-core`] crate directly.
//!
#![cfg_attr(docsrs, feature(doc_cfg))]

// The binary is the deliverable; this target only renders the docs page.
