//! Command-line parsing for the grid convergence study.
//!
//! Argument parsing stays here, separate from the study and report code.
//! Solver and filter settings fall back to `GRID_CONVERGENCE_*` environment
//! variables (a `.env` file is honoured) before their built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use crate::domain::Side;

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "grid-convergence",
    version,
    about = "Grid convergence study: order of convergence, Richardson extrapolation and GCI"
)]
pub struct Cli {
    /// Grid file: one "spacing value" pair per line.
    pub file: PathBuf,

    /// Report output path.
    #[arg(short = 'o', long = "out", default_value = "verify_report.txt")]
    pub out: PathBuf,

    /// Known analytical value of the quantity, for comparison.
    #[arg(short = 'a', long = "analytical", allow_negative_numbers = true)]
    pub analytical: Option<f64>,

    /// Name of the examined quantity, shown in the report header.
    #[arg(short = 'm', long = "metric")]
    pub metric: Option<String>,

    /// Grids with |value| at or below this are excluded from triplets.
    #[arg(long, env = "GRID_CONVERGENCE_ZERO_TOL", default_value_t = 1e-4)]
    pub zero_tol: f64,

    /// Under-relaxation factor of the order-of-convergence iteration.
    #[arg(long, env = "GRID_CONVERGENCE_RELAXATION", default_value_t = 0.5)]
    pub relaxation: f64,

    /// Convergence tolerance of the order-of-convergence iteration.
    #[arg(long, env = "GRID_CONVERGENCE_TOLERANCE", default_value_t = 1e-4, allow_negative_numbers = true)]
    pub tolerance: f64,

    /// Iteration budget of the order-of-convergence iteration.
    #[arg(long, env = "GRID_CONVERGENCE_MAX_ITERATIONS", default_value_t = 1_000_000)]
    pub max_iterations: usize,

    /// Estimate the grid spacing needed to reach this GCI.
    #[arg(long)]
    pub target_gci: Option<f64>,

    /// Which GCI of the first grid pair the resolution estimate starts from.
    #[arg(long, value_enum, default_value_t = Side::Fine, requires = "target_gci")]
    pub side: Side,

    /// Export per-triplet results to CSV.
    #[arg(long = "export-csv")]
    pub export_csv: Option<PathBuf>,

    /// Export the whole study to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,

    /// Also print the report to stdout.
    #[arg(long)]
    pub print: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}
