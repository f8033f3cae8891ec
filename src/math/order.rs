//! Order-of-convergence solver.
//!
//! Given three grids of increasing spacing with observed values `v1, v2, v3`
//! and refinement ratios `r21 = h2/h1`, `r32 = h3/h2`, the observed order `p`
//! satisfies (Celik et al. 2008):
//!
//! ```text
//! p = 1/ln(r21) · | ln|ε32/ε21| + q(p) |
//! q(p) = ln( (r21^p − s) / (r32^p − s) ),   s = sign(ε32/ε21)
//! ```
//!
//! where `ε21 = v2 − v1` and `ε32 = v3 − v2`. Because `q` depends on `p` when
//! the ratios differ, the equation is solved by an under-relaxed fixed-point
//! iteration starting from the constant-ratio estimate (`q = 0`).

use log::debug;

use crate::error::{ConvergenceError, ConvergenceResult};

/// Iterates larger than this in magnitude are treated as divergence.
pub const DIVERGENCE_LIMIT: f64 = 1e6;

/// Fixed-point iteration settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    /// Under-relaxation factor ω in `p_next = (1 − ω)·p + ω·p_candidate`.
    pub relaxation: f64,
    /// Iteration stops once `|p_next − p| <= tolerance`.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            relaxation: 0.5,
            tolerance: 1e-4,
            max_iterations: 1_000_000,
        }
    }
}

/// Solve for the observed order of convergence of a grid triplet.
///
/// `v1` is the finest grid. Returns `Domain` on degenerate inputs (equal
/// values, zero `ε32/ε21`, unit or non-positive ratios, a non-positive log
/// argument) and `ConvergenceFailure` when the iteration budget is spent or
/// the residual blows up.
pub fn order_of_convergence(
    v1: f64,
    v2: f64,
    v3: f64,
    r21: f64,
    r32: f64,
    opts: &SolverOptions,
) -> ConvergenceResult<f64> {
    let eps21 = v2 - v1;
    let eps32 = v3 - v2;
    if eps21 == 0.0 {
        return Err(ConvergenceError::domain(
            "fine and mid grid values are equal (v2 == v1)",
        ));
    }

    let epfrac = eps32 / eps21;
    if epfrac == 0.0 {
        // sign(epfrac) is undefined.
        return Err(ConvergenceError::domain(
            "mid and coarse grid values are equal (v3 == v2)",
        ));
    }
    if !epfrac.is_finite() {
        return Err(ConvergenceError::domain(format!(
            "non-finite error ratio (v3 - v2)/(v2 - v1) = {epfrac}"
        )));
    }
    if !(r21 > 0.0 && r32 > 0.0) {
        return Err(ConvergenceError::domain(format!(
            "refinement ratios must be > 0, got r21={r21}, r32={r32}"
        )));
    }

    let ln_r21 = r21.ln();
    if ln_r21 == 0.0 {
        return Err(ConvergenceError::domain("refinement ratio r21 is 1"));
    }

    let s = epfrac.signum();
    let ln_epfrac = epfrac.abs().ln();
    let omega = opts.relaxation;

    let mut p = (1.0 / ln_r21) * ln_epfrac.abs();
    let mut residual = 1.0_f64;
    let mut iterations = 0usize;

    while residual.abs() > opts.tolerance {
        if iterations > opts.max_iterations || residual.abs() > DIVERGENCE_LIMIT {
            return Err(ConvergenceError::ConvergenceFailure { iterations, residual });
        }

        let denom = r32.powf(p) - s;
        if denom == 0.0 {
            return Err(ConvergenceError::domain(format!(
                "r32^p - s is zero at p={p}"
            )));
        }
        let arg = (r21.powf(p) - s) / denom;
        if !(arg > 0.0) {
            return Err(ConvergenceError::domain(format!(
                "logarithm of non-positive value {arg} at p={p}"
            )));
        }
        let q = arg.ln();

        let candidate = (1.0 / ln_r21) * (ln_epfrac + q).abs();
        let next = (1.0 - omega) * p + omega * candidate;
        if !next.is_finite() {
            return Err(ConvergenceError::ConvergenceFailure { iterations, residual });
        }

        residual = next - p;
        p = next;
        iterations += 1;
    }

    debug!("order of convergence p={p:.6} after {iterations} iterations");
    Ok(p)
}
