//! Reporting: column tables and the formatted study report.
//!
//! Formatting lives here so the numerical code stays free of layout concerns.

pub mod format;
pub mod table;

pub use format::*;
pub use table::*;
