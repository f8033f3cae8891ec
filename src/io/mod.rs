//! Input/output helpers.
//!
//! - grid file ingest (`ingest`)
//! - per-triplet CSV export (`export`)
//! - study JSON export (`study_json`)

pub mod export;
pub mod ingest;
pub mod study_json;

pub use export::*;
pub use ingest::*;
pub use study_json::*;
