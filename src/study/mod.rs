//! Study aggregation.
//!
//! Responsibilities:
//!
//! - evaluate each grid triplet (order, pair results, asymptotic ratio)
//! - turn numerical failures into `None` fields plus diagnostics
//! - answer required-resolution queries

pub mod convergence;
pub mod side;

pub use convergence::*;
pub use side::*;
