//! The study aggregator.
//!
//! `Convergence` owns the grid set and, every time grids are added, rebuilds
//! one `TripletResult` per triplet:
//!
//! 1. shared stats: refinement ratios (always) and the order `p` (may fail)
//! 2. fine and coarse pair results, only when `p` is known
//! 3. the asymptotic ratio, only when both pairs produced a fine GCI
//!
//! Numerical failures never abort the study. Each one becomes a `None` field
//! plus a `Diagnostic`, and the remaining fields and triplets carry on.

use std::fmt::Display;
use std::ops::Index;

use log::{info, warn};

use crate::domain::{Diagnostic, Grid, Side, SharedStats, SideResult, Stage, TripletResult};
use crate::error::{ConvergenceError, ConvergenceResult};
use crate::grids::{GridSet, Triplet};
use crate::math::{SolverOptions, asymptotic_ratio, order_of_convergence, required_resolution};
use crate::study::side::evaluate_side;

/// Grid convergence study over a set of grids.
#[derive(Debug, Clone, Default)]
pub struct Convergence {
    metric_name: Option<String>,
    analytical: Option<f64>,
    solver: SolverOptions,
    grids: GridSet,
    /// Set by the first `add_grids`, even when nothing was added.
    grids_added: bool,
    results: Vec<TripletResult>,
    diagnostics: Vec<Diagnostic>,
}

impl Convergence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare every pair against a known analytical value.
    pub fn with_analytical(mut self, value: f64) -> Self {
        self.analytical = Some(value);
        self.recompute();
        self
    }

    /// Name of the observed quantity, shown in the report header.
    pub fn with_metric_name(mut self, name: impl Into<String>) -> Self {
        self.metric_name = Some(name.into());
        self
    }

    pub fn with_zero_tol(mut self, zero_tol: f64) -> Self {
        let existing = self.grids.grids().to_vec();
        self.grids = GridSet::new(zero_tol);
        if existing.is_empty() {
            return self;
        }
        self.add_grids(existing);
        self
    }

    pub fn with_solver(mut self, solver: SolverOptions) -> Self {
        self.solver = solver;
        self.recompute();
        self
    }

    /// Add grids and recompute every triplet from scratch.
    pub fn add_grids<I>(&mut self, grids: I)
    where
        I: IntoIterator<Item = Grid>,
    {
        // Logged by the grid set; regenerated below from its current state.
        let _ = self.grids.add(grids);
        self.grids_added = true;
        self.recompute();
    }

    fn recompute(&mut self) {
        let mut diagnostics: Vec<Diagnostic> = if self.grids_added {
            self.grids.sufficiency_diagnostic().into_iter().collect()
        } else {
            Vec::new()
        };

        let results: Vec<TripletResult> = self
            .grids
            .triplets()
            .enumerate()
            .map(|(idx, triplet)| self.analyse_triplet(idx, &triplet, &mut diagnostics))
            .collect();

        if self.grids_added {
            info!(
                "analysed {} triplet(s) from {} grid(s), {} diagnostic(s)",
                results.len(),
                self.grids.len(),
                diagnostics.len()
            );
        }

        self.results = results;
        self.diagnostics = diagnostics;
    }

    fn analyse_triplet(&self, idx: usize, triplet: &Triplet, diagnostics: &mut Vec<Diagnostic>) -> TripletResult {
        let ratio_21 = triplet.mid.spacing / triplet.fine.spacing;
        let ratio_32 = triplet.coarse.spacing / triplet.mid.spacing;

        let p = match order_of_convergence(
            triplet.fine.value,
            triplet.mid.value,
            triplet.coarse.value,
            ratio_21,
            ratio_32,
            &self.solver,
        ) {
            Ok(p) => Some(p),
            Err(err) => {
                record(diagnostics, idx, None, Stage::Order, err);
                None
            }
        };

        let mut result = TripletResult {
            grids: triplet.label(),
            ids: triplet.ids(),
            spacings: triplet.spacings(),
            values: triplet.values(),
            shared: SharedStats { ratio_21, ratio_32, p },
            fine: SideResult::default(),
            coarse: SideResult::default(),
            asymptotic_ratio: None,
        };

        // Without an order nothing downstream can be evaluated.
        let Some(p) = p else {
            return result;
        };

        for side in Side::BOTH {
            let (lo, hi, ratio) = match side {
                Side::Fine => (triplet.fine, triplet.mid, ratio_21),
                Side::Coarse => (triplet.mid, triplet.coarse, ratio_32),
            };
            let outcome = evaluate_side(lo.value, hi.value, ratio, p, self.analytical);
            for (stage, err) in outcome.failures {
                record(diagnostics, idx, Some(side), stage, err);
            }
            match side {
                Side::Fine => result.fine = outcome.result,
                Side::Coarse => result.coarse = outcome.result,
            }
        }

        result.asymptotic_ratio = match (result.fine.gci_fine, result.coarse.gci_fine) {
            (Some(gci_21), Some(gci_32)) => match asymptotic_ratio(gci_21, gci_32, ratio_21, p) {
                Ok(ratio) => Some(ratio),
                Err(err) => {
                    record(diagnostics, idx, None, Stage::AsymptoticRatio, err);
                    None
                }
            },
            _ => {
                record(
                    diagnostics,
                    idx,
                    None,
                    Stage::AsymptoticRatio,
                    "fine gci of both grid pairs is required",
                );
                None
            }
        };

        result
    }

    /// Spacing required to reach `target_gci`.
    ///
    /// The reference point is the first triplet: its order `p`, the GCI of
    /// its fine pair at the fine (`Side::Fine`) or coarse (`Side::Coarse`)
    /// grid, and the spacing of its finest grid.
    pub fn get_resolution(&self, target_gci: f64, side: Side) -> ConvergenceResult<f64> {
        if !(target_gci.is_finite() && target_gci > 0.0) {
            return Err(ConvergenceError::usage(format!(
                "target gci must be finite and > 0, got {target_gci}"
            )));
        }

        let first = self
            .results
            .first()
            .ok_or_else(|| ConvergenceError::usage("Insufficient grids: no triplets to estimate a resolution from"))?;

        let p = first
            .shared
            .p
            .ok_or_else(|| ConvergenceError::usage("first triplet has no order of convergence"))?;

        let reference_gci = match side {
            Side::Fine => first.fine.gci_fine,
            Side::Coarse => first.fine.gci_coarse,
        }
        .ok_or_else(|| ConvergenceError::usage(format!("first triplet has no {side} gci")))?;

        required_resolution(target_gci, reference_gci, p, first.spacings[0])
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&TripletResult> {
        self.results.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TripletResult> {
        self.results.iter()
    }

    pub fn results(&self) -> &[TripletResult] {
        &self.results
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn grid_set(&self) -> &GridSet {
        &self.grids
    }

    pub fn analytical(&self) -> Option<f64> {
        self.analytical
    }

    pub fn metric_name(&self) -> Option<&str> {
        self.metric_name.as_deref()
    }

    pub fn solver(&self) -> &SolverOptions {
        &self.solver
    }
}

impl Index<usize> for Convergence {
    type Output = TripletResult;

    fn index(&self, idx: usize) -> &TripletResult {
        &self.results[idx]
    }
}

impl<'a> IntoIterator for &'a Convergence {
    type Item = &'a TripletResult;
    type IntoIter = std::slice::Iter<'a, TripletResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

fn record(diagnostics: &mut Vec<Diagnostic>, triplet: usize, side: Option<Side>, stage: Stage, message: impl Display) {
    let diagnostic = Diagnostic {
        triplet: Some(triplet),
        side,
        stage,
        message: message.to_string(),
    };
    warn!("{diagnostic}");
    diagnostics.push(diagnostic);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grids(pairs: &[(f64, f64)]) -> Vec<Grid> {
        pairs.iter().map(|&(h, v)| Grid::new(h, v).unwrap()).collect()
    }

    fn reference_study() -> Convergence {
        let mut study = Convergence::new();
        study.add_grids(grids(&[(1.0, 0.9705), (2.0, 0.96854), (4.0, 0.96178)]));
        study
    }

    fn close(actual: Option<f64>, expected: f64, tol: f64) -> bool {
        actual.is_some_and(|v| (v - expected).abs() < tol)
    }

    #[test]
    fn reference_three_grid_study() {
        let study = reference_study();
        assert_eq!(study.len(), 1);
        assert!(study.diagnostics().is_empty(), "{:?}", study.diagnostics());

        let t = &study[0];
        assert_eq!(t.grids, "1 2 3");
        assert_eq!(t.spacings, [1.0, 2.0, 4.0]);
        assert_eq!(t.values, [0.9705, 0.96854, 0.96178]);
        assert_eq!(t.shared.ratio_21, 2.0);
        assert_eq!(t.shared.ratio_32, 2.0);
        assert!(close(t.shared.p, 1.786170, 1e-6));

        assert!(close(t.fine.f_exact, 0.971300, 1e-6));
        assert!(close(t.fine.e_approx, 0.002020, 1e-6));
        assert!(close(t.fine.e_extrap, 0.000824, 1e-6));
        assert!(close(t.fine.gci_fine, 0.001031, 1e-6));
        assert!(close(t.fine.gci_coarse, 0.003555, 1e-6));

        assert!(close(t.coarse.e_approx, 0.006980, 1e-6));
        assert!(close(t.coarse.gci_fine, 0.003562, 1e-6));
        assert!(close(t.coarse.gci_coarse, 0.012287, 1e-6));

        assert!(close(t.asymptotic_ratio, 0.997980, 1e-6));
    }

    #[test]
    fn gci_coarse_is_exactly_scaled_fine() {
        let study = reference_study();
        let t = &study[0];
        let rp = t.shared.ratio_21.powf(t.shared.p.unwrap());
        assert_eq!(t.fine.gci_coarse.unwrap(), rp * t.fine.gci_fine.unwrap());
        assert_eq!(t.coarse.gci_coarse.unwrap(), rp * t.coarse.gci_fine.unwrap());
    }

    #[test]
    fn analytical_reference_fields() {
        let mut study = Convergence::new().with_analytical(0.9713);
        study.add_grids(grids(&[(1.0, 0.9705), (2.0, 0.96854), (4.0, 0.96178)]));

        let fine = study[0].fine;
        assert_eq!(fine.f_analytic, Some(0.9713));
        assert!(close(fine.e_analytic, 0.000824, 1e-6));
        assert!(close(fine.f_delta, -3.33e-7, 1e-9));
        assert_eq!(study[0].coarse.f_analytic, Some(0.9713));
    }

    #[test]
    fn insufficient_grids_give_no_triplets_and_usage_error() {
        let mut study = Convergence::new();
        study.add_grids(grids(&[(1.0, 0.9705), (2.0, 0.96854)]));

        assert!(study.is_empty());
        assert_eq!(study.diagnostics().len(), 1);
        assert_eq!(study.diagnostics()[0].stage, Stage::Grids);

        let err = study.get_resolution(0.001, Side::Fine).unwrap_err();
        assert!(matches!(err, ConvergenceError::Usage(_)));
        let err = study.get_resolution(0.001, Side::Coarse).unwrap_err();
        assert!(matches!(err, ConvergenceError::Usage(_)));
    }

    #[test]
    fn order_failure_keeps_ratios_and_spares_other_triplets() {
        let mut study = Convergence::new();
        study.add_grids(grids(&[(1.0, 1.0), (2.0, 1.0), (4.0, 1.2), (8.0, 1.5)]));
        assert_eq!(study.len(), 2);

        let failed = &study[0];
        assert_eq!(failed.shared.p, None);
        assert_eq!(failed.shared.ratio_21, 2.0);
        assert_eq!(failed.shared.ratio_32, 2.0);
        assert_eq!(failed.fine, SideResult::default());
        assert_eq!(failed.coarse, SideResult::default());
        assert_eq!(failed.asymptotic_ratio, None);

        let ok = &study[1];
        assert_eq!(ok.grids, "2 3 4");
        assert!(close(ok.shared.p, 1.5_f64.ln() / 2.0_f64.ln(), 1e-6));
        assert!(ok.fine.gci_fine.is_some());
        assert!(ok.asymptotic_ratio.is_some());

        let order_diags: Vec<&Diagnostic> = study
            .diagnostics()
            .iter()
            .filter(|d| d.stage == Stage::Order)
            .collect();
        assert_eq!(order_diags.len(), 1);
        assert_eq!(order_diags[0].triplet, Some(0));
    }

    #[test]
    fn convergence_failure_is_recorded_not_raised() {
        let solver = SolverOptions {
            tolerance: -1.0,
            max_iterations: 10,
            ..SolverOptions::default()
        };
        let mut study = Convergence::new().with_solver(solver);
        study.add_grids(grids(&[(1.0, 0.9705), (2.0, 0.96854), (4.0, 0.96178)]));

        assert_eq!(study.len(), 1);
        assert_eq!(study[0].shared.p, None);
        assert_eq!(study.diagnostics()[0].stage, Stage::Order);
        assert!(study.diagnostics()[0].message.contains("converge"));
    }

    #[test]
    fn collection_contract() {
        let mut study = Convergence::new();
        study.add_grids(grids(&[(1.0, 1.0), (2.0, 1.1), (4.0, 1.3), (8.0, 1.7)]));

        assert_eq!(study.len(), 2);
        assert!(study.get(2).is_none());
        let labels: Vec<&str> = study.iter().map(|t| t.grids.as_str()).collect();
        assert_eq!(labels, ["1 2 3", "2 3 4"]);
        let mut count = 0;
        for t in &study {
            assert_eq!(t.ids.len(), 3);
            count += 1;
        }
        assert_eq!(count, study.len());
    }

    #[test]
    fn adding_grids_recomputes_everything() {
        let mut study = Convergence::new();
        study.add_grids(grids(&[(2.0, 0.96854), (4.0, 0.96178)]));
        assert!(study.is_empty());
        assert_eq!(study.diagnostics().len(), 1);

        study.add_grids(grids(&[(1.0, 0.9705)]));
        assert_eq!(study.len(), 1);
        assert!(study.diagnostics().is_empty());
        assert_eq!(study[0], reference_study()[0]);

        // No new grids: identical results.
        let before = study.results().to_vec();
        study.add_grids(Vec::new());
        assert_eq!(study.results(), before.as_slice());
    }

    #[test]
    fn resolution_uses_first_triplet_reference() {
        let study = reference_study();
        let t = &study[0];
        let p = t.shared.p.unwrap();

        let fine = study.get_resolution(0.0005, Side::Fine).unwrap();
        let expected = required_resolution(0.0005, t.fine.gci_fine.unwrap(), p, 1.0).unwrap();
        assert!((fine - expected).abs() < 1e-12);
        assert!(fine < 1.0);

        let coarse = study.get_resolution(0.0005, Side::Coarse).unwrap();
        let expected = required_resolution(0.0005, t.fine.gci_coarse.unwrap(), p, 1.0).unwrap();
        assert!((coarse - expected).abs() < 1e-12);
    }

    #[test]
    fn non_positive_target_is_a_usage_error() {
        let study = reference_study();
        for target in [0.0, -0.1, f64::NAN] {
            let err = study.get_resolution(target, Side::Fine).unwrap_err();
            assert!(matches!(err, ConvergenceError::Usage(_)), "{target}: {err}");
        }
    }

    #[test]
    fn unrecognised_side_token_is_a_usage_error() {
        let study = reference_study();
        let err = "middle"
            .parse::<Side>()
            .and_then(|side| study.get_resolution(0.001, side))
            .unwrap_err();
        assert!(matches!(err, ConvergenceError::Usage(_)));
    }

    #[test]
    fn adding_no_grids_reports_insufficient_grids() {
        let mut study = Convergence::new();
        assert!(study.diagnostics().is_empty());

        study.add_grids(Vec::new());
        assert!(study.is_empty());
        assert_eq!(study.diagnostics().len(), 1);
        assert_eq!(study.diagnostics()[0].stage, Stage::Grids);
        assert!(study.diagnostics()[0].message.contains("Insufficient grids"));
    }

    #[test]
    fn failure_on_one_side_leaves_the_other_intact() {
        // A negative tolerance keeps the zero-valued fine grid, so the fine
        // pair's relative error divides by zero while the coarse pair is fine.
        let mut study = Convergence::new().with_zero_tol(-1.0);
        study.add_grids(grids(&[(1.0, 0.0), (2.0, 1.0), (4.0, 1.5)]));
        assert_eq!(study.len(), 1);

        let t = &study[0];
        assert!(close(t.shared.p, 1.0, 1e-9));

        assert!(close(t.fine.f_exact, -1.0, 1e-9));
        assert_eq!(t.fine.e_approx, None);
        assert_eq!(t.fine.e_extrap, None);
        assert_eq!(t.fine.gci_fine, None);
        assert_eq!(t.fine.gci_coarse, None);

        assert!(close(t.coarse.f_exact, 0.5, 1e-9));
        assert!(close(t.coarse.e_approx, 0.5, 1e-9));
        assert!(close(t.coarse.e_extrap, 1.0, 1e-9));
        assert!(t.coarse.gci_fine.is_some());
        assert!(t.coarse.gci_coarse.is_some());

        assert_eq!(t.asymptotic_ratio, None);
        let stages: Vec<(Option<Side>, Stage)> = study.diagnostics().iter().map(|d| (d.side, d.stage)).collect();
        assert_eq!(
            stages,
            [(Some(Side::Fine), Stage::ErrorEstimate), (None, Stage::AsymptoticRatio)]
        );
    }

    #[test]
    fn zero_tol_is_configurable() {
        let mut study = Convergence::new().with_zero_tol(0.5);
        study.add_grids(grids(&[(1.0, 0.9705), (2.0, 0.96854), (4.0, 0.4)]));
        assert!(study.is_empty());
        assert_eq!(study.grid_set().len(), 3);
    }
}
