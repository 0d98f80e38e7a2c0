//! geores-rs
//! =========
//!
//! Workspace umbrella crate. It re-exports [`geores_core`] so the demos in
//! `demos/` can be run from the repository root with `cargo run --example`.
pub use geores_core::*;
