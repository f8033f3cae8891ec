//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input grids (`Grid`, `IndexedGrid`)
//! - per-triplet outputs (`SharedStats`, `SideResult`, `TripletResult`)
//! - recoverable-failure records (`Diagnostic`, `Stage`)
//! - the run configuration (`StudyConfig`)

pub mod types;

pub use types::*;
