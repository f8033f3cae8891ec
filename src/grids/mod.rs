//! Grid bookkeeping: sorting, zero filtering, indexing and triplet formation.
//!
//! Grids are kept sorted by spacing (finest first). Grids whose observed
//! value is within `zero_tol` of zero stay in the set, so they still show up
//! in reports, but they receive no id and never take part in a triplet.

pub mod set;

pub use set::*;
