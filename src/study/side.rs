//! Per-pair evaluation: extrapolated value, relative errors, GCI and the
//! optional comparison against an analytical value.
//!
//! The three numerical steps form a chain (`f_exact` → errors → GCI). A
//! failing step leaves itself and every later step as `None` but keeps what
//! was already computed. The analytical comparison only needs the raw grid
//! values, so it is attempted whatever happened to the chain.

use crate::domain::{SideResult, Stage};
use crate::error::ConvergenceError;
use crate::math::{error_estimates, gci, richardson_extrapolate};

/// Result of evaluating one grid pair, plus every recoverable failure hit on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct SideOutcome {
    pub result: SideResult,
    pub failures: Vec<(Stage, ConvergenceError)>,
}

/// Evaluate the pair (`v_fine`, `v_coarse`) with refinement ratio `ratio` and order `p`.
pub fn evaluate_side(v_fine: f64, v_coarse: f64, ratio: f64, p: f64, analytical: Option<f64>) -> SideOutcome {
    let mut result = SideResult::default();
    let mut failures = Vec::new();

    if let Err(failure) = extrapolation_chain(v_fine, v_coarse, ratio, p, &mut result) {
        failures.push(failure);
    }

    if let Some(reference) = analytical {
        result.f_analytic = Some(reference);
        result.f_delta = result.f_exact.map(|f_exact| reference - f_exact);
        match error_estimates(v_fine, v_coarse, reference) {
            Ok(errors) => result.e_analytic = Some(errors.extrapolated),
            Err(err) => failures.push((Stage::Analytic, err)),
        }
    }

    SideOutcome { result, failures }
}

fn extrapolation_chain(
    v1: f64,
    v2: f64,
    ratio: f64,
    p: f64,
    out: &mut SideResult,
) -> Result<(), (Stage, ConvergenceError)> {
    let f_exact = richardson_extrapolate(v1, v2, ratio, p).map_err(|e| (Stage::Extrapolation, e))?;
    out.f_exact = Some(f_exact);

    let errors = error_estimates(v1, v2, f_exact).map_err(|e| (Stage::ErrorEstimate, e))?;
    out.e_approx = Some(errors.approx);
    out.e_extrap = Some(errors.extrapolated);

    let indices = gci(ratio, errors.approx, p).map_err(|e| (Stage::Gci, e))?;
    out.gci_fine = Some(indices.fine);
    out.gci_coarse = Some(indices.coarse);

    Ok(())
}
