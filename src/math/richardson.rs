//! Richardson extrapolation, relative errors and grid convergence indices.
//!
//! All functions are pure. Floating point division never traps, so every
//! degenerate case that would produce an infinite or undefined value is
//! checked explicitly and reported as `ConvergenceError::Domain`.
//!
//! Notation follows Roache/Celik: grid 1 is the finer grid of a pair, `r21`
//! the refinement ratio `h2/h1` and `p` the order of convergence.

use serde::Serialize;

use crate::error::{ConvergenceError, ConvergenceResult};

/// Fixed GCI safety factor for three-grid studies (Celik et al. 2008).
pub const SAFETY_FACTOR: f64 = 1.25;

/// Relative error estimates for a grid pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorEstimates {
    /// `|(v1 − v2) / v1|`
    pub approx: f64,
    /// `|(f_exact − v1) / f_exact|`
    pub extrapolated: f64,
}

/// Grid convergence index at the fine and coarse grid of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gci {
    pub fine: f64,
    pub coarse: f64,
}

/// Estimate the zero-spacing value from two grids.
pub fn richardson_extrapolate(v1: f64, v2: f64, r21: f64, p: f64) -> ConvergenceResult<f64> {
    let rp = r21.powf(p);
    let f_exact = checked_div(rp * v1 - v2, rp - 1.0, "richardson extrapolation: r21^p == 1")?;
    Ok(f_exact)
}

/// Approximate and extrapolated relative errors of the fine grid value.
pub fn error_estimates(v1: f64, v2: f64, f_exact: f64) -> ConvergenceResult<ErrorEstimates> {
    let approx = checked_div(v1 - v2, v1, "approximate relative error: v1 == 0")?.abs();
    let extrapolated = checked_div(f_exact - v1, f_exact, "extrapolated relative error: f_exact == 0")?.abs();
    Ok(ErrorEstimates { approx, extrapolated })
}

/// Fine and coarse grid convergence indices.
pub fn gci(r21: f64, e_approx: f64, p: f64) -> ConvergenceResult<Gci> {
    let rp = r21.powf(p);
    let fine = checked_div(SAFETY_FACTOR * e_approx, rp - 1.0, "gci: r21^p == 1")?;
    let coarse = finite(rp * fine, "gci coarse")?;
    Ok(Gci { fine, coarse })
}

/// Ratio of successive fine-grid GCIs (Roache, p. 129).
///
/// A value close to 1 indicates the grids are in the asymptotic range.
pub fn asymptotic_ratio(gci_fine_21: f64, gci_fine_32: f64, r21: f64, p: f64) -> ConvergenceResult<f64> {
    let ratio = checked_div(gci_fine_21, gci_fine_32, "asymptotic ratio: coarse-pair gci is zero")?;
    finite(r21.powf(p) * ratio, "asymptotic ratio")
}

/// Grid spacing needed to reach `target_gci`, given a reference GCI obtained
/// at `reference_spacing` with order `p`.
pub fn required_resolution(
    target_gci: f64,
    reference_gci: f64,
    p: f64,
    reference_spacing: f64,
) -> ConvergenceResult<f64> {
    let gci_ratio = checked_div(reference_gci, target_gci, "required resolution: target gci is zero")?;
    if !(gci_ratio > 0.0) {
        return Err(ConvergenceError::domain(format!(
            "required resolution: gci ratio must be > 0, got {gci_ratio}"
        )));
    }
    let inv_p = checked_div(1.0, p, "required resolution: p is zero")?;
    let refinement = gci_ratio.powf(inv_p);
    checked_div(reference_spacing, refinement, "required resolution: refinement is zero")
}

fn checked_div(num: f64, den: f64, what: &str) -> ConvergenceResult<f64> {
    if den == 0.0 {
        return Err(ConvergenceError::domain(what));
    }
    finite(num / den, what)
}

fn finite(value: f64, what: &str) -> ConvergenceResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConvergenceError::domain(format!("{what}: non-finite result {value}")))
    }
}
