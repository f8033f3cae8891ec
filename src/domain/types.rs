//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the grid set, the solver and the study aggregator
//! - rendered into the text report
//! - exported to CSV/JSON

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::{ConvergenceError, ConvergenceResult};
use crate::math::SolverOptions;

/// Values with `|value| <= DEFAULT_ZERO_TOL` are left out of triplet formation.
pub const DEFAULT_ZERO_TOL: f64 = 1e-4;

/// One simulation run: mesh spacing and the observed scalar quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Grid {
    spacing: f64,
    value: f64,
}

impl Grid {
    /// Build a grid, rejecting non-positive or non-finite spacings and non-finite values.
    pub fn new(spacing: f64, value: f64) -> ConvergenceResult<Self> {
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(ConvergenceError::usage(format!(
                "grid spacing must be finite and > 0, got {spacing}"
            )));
        }
        if !value.is_finite() {
            return Err(ConvergenceError::usage(format!(
                "grid value must be finite, got {value}"
            )));
        }
        Ok(Self { spacing, value })
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// A grid that survived the zero filter, numbered from 1 in spacing order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexedGrid {
    pub id: usize,
    pub spacing: f64,
    pub value: f64,
}

/// Which grid pair of a triplet a result belongs to.
///
/// `Fine` is the pair (grid 1, grid 2), `Coarse` is (grid 2, grid 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Fine,
    Coarse,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Fine, Side::Coarse];

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Fine => "fine",
            Side::Coarse => "coarse",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = ConvergenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fine" => Ok(Side::Fine),
            "coarse" => Ok(Side::Coarse),
            other => Err(ConvergenceError::usage(format!(
                "unrecognised side '{other}', expected one of 'fine' or 'coarse'"
            ))),
        }
    }
}

/// Computation stage a diagnostic was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Grids,
    Order,
    Extrapolation,
    ErrorEstimate,
    Gci,
    Analytic,
    AsymptoticRatio,
}

impl Stage {
    pub fn display_name(self) -> &'static str {
        match self {
            Stage::Grids => "grids",
            Stage::Order => "order of convergence",
            Stage::Extrapolation => "richardson extrapolation",
            Stage::ErrorEstimate => "error estimates",
            Stage::Gci => "gci",
            Stage::Analytic => "analytical error",
            Stage::AsymptoticRatio => "asymptotic ratio",
        }
    }
}

/// A recoverable failure recorded while analysing a study.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// 0-based triplet index, `None` for set-level diagnostics.
    pub triplet: Option<usize>,
    pub side: Option<Side>,
    pub stage: Stage,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(idx) = self.triplet {
            write!(f, "triplet {idx}")?;
            if let Some(side) = self.side {
                write!(f, " ({side})")?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{}: {}", self.stage.display_name(), self.message)
    }
}

/// Refinement ratios and order of convergence shared by both sides of a triplet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SharedStats {
    pub ratio_21: f64,
    pub ratio_32: f64,
    pub p: Option<f64>,
}

/// Extrapolation, error and GCI results for one grid pair.
///
/// Every field is `None` when it could not be computed, which keeps
/// "unavailable" distinct from a legitimate zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SideResult {
    pub f_exact: Option<f64>,
    pub e_approx: Option<f64>,
    pub e_extrap: Option<f64>,
    pub gci_fine: Option<f64>,
    pub gci_coarse: Option<f64>,
    pub f_analytic: Option<f64>,
    pub f_delta: Option<f64>,
    pub e_analytic: Option<f64>,
}

/// Full result for one grid triplet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripletResult {
    /// Grid ids as printed in reports, e.g. `"1 2 3"`.
    pub grids: String,
    pub ids: [usize; 3],
    pub spacings: [f64; 3],
    pub values: [f64; 3],
    pub shared: SharedStats,
    pub fine: SideResult,
    pub coarse: SideResult,
    pub asymptotic_ratio: Option<f64>,
}

impl TripletResult {
    pub fn side(&self, side: Side) -> &SideResult {
        match side {
            Side::Fine => &self.fine,
            Side::Coarse => &self.coarse,
        }
    }

    /// Flat, ordered field mapping for one side, as consumed by the report
    /// renderer and the CSV export.
    ///
    /// Analytical columns are only included when `with_analytic` is set, so
    /// every row of a study has the same shape.
    pub fn fields(&self, side: Side, with_analytic: bool) -> Vec<(&'static str, Option<f64>)> {
        let s = self.side(side);
        let mut out = vec![
            ("ratio_21", Some(self.shared.ratio_21)),
            ("ratio_32", Some(self.shared.ratio_32)),
            ("p", self.shared.p),
            ("f_exact", s.f_exact),
        ];
        if with_analytic {
            out.push(("f_analytic", s.f_analytic));
            out.push(("f_delta", s.f_delta));
        }
        out.push(("e_approx", s.e_approx));
        out.push(("e_extrap", s.e_extrap));
        if with_analytic {
            out.push(("e_analytic", s.e_analytic));
        }
        out.push(("gci_fine", s.gci_fine));
        out.push(("gci_coarse", s.gci_coarse));
        out
    }
}

/// Answer to a required-resolution query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolutionEstimate {
    pub target_gci: f64,
    pub side: Side,
    pub spacing: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and environment).
#[derive(Debug, Clone)]
pub struct StudyConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub metric_name: Option<String>,
    pub analytical: Option<f64>,
    pub zero_tol: f64,
    pub solver: SolverOptions,

    /// Optional required-resolution query.
    pub target_gci: Option<f64>,
    pub resolution_side: Side,

    pub print_report: bool,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}
