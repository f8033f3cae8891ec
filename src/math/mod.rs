//! Numerical core: the order-of-convergence solver and the extrapolation/GCI formulas.

pub mod order;
pub mod richardson;

pub use order::*;
pub use richardson::*;
