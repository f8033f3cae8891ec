//! `grid-convergence` library crate.
//!
//! The binary is a thin wrapper around this library so that:
//!
//! - the study is testable without spawning processes
//! - the numerical core can be embedded in other tools
//!
//! Layout: `grids` (sorted grid set, triplets) -> `math` (order solver,
//! extrapolation formulas) -> `study` (per-triplet results, diagnostics)
//! -> `report` / `io` (text report, CSV/JSON exports).

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod grids;
pub mod io;
pub mod math;
pub mod report;
pub mod study;
