use log::warn;

use crate::domain::{DEFAULT_ZERO_TOL, Diagnostic, Grid, IndexedGrid, Stage};

/// Three consecutive indexed grids, finest first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triplet {
    pub fine: IndexedGrid,
    pub mid: IndexedGrid,
    pub coarse: IndexedGrid,
}

impl Triplet {
    fn from_window(window: &[IndexedGrid]) -> Self {
        Self {
            fine: window[0],
            mid: window[1],
            coarse: window[2],
        }
    }

    pub fn ids(&self) -> [usize; 3] {
        [self.fine.id, self.mid.id, self.coarse.id]
    }

    /// Grid ids joined by spaces, e.g. `"1 2 3"`.
    pub fn label(&self) -> String {
        format!("{} {} {}", self.fine.id, self.mid.id, self.coarse.id)
    }

    pub fn spacings(&self) -> [f64; 3] {
        [self.fine.spacing, self.mid.spacing, self.coarse.spacing]
    }

    pub fn values(&self) -> [f64; 3] {
        [self.fine.value, self.mid.value, self.coarse.value]
    }
}

/// The sorted collection of grids in a study.
#[derive(Debug, Clone)]
pub struct GridSet {
    grids: Vec<Grid>,
    indexed: Vec<IndexedGrid>,
    zero_tol: f64,
}

impl Default for GridSet {
    fn default() -> Self {
        Self::new(DEFAULT_ZERO_TOL)
    }
}

impl GridSet {
    pub fn new(zero_tol: f64) -> Self {
        Self {
            grids: Vec::new(),
            indexed: Vec::new(),
            zero_tol,
        }
    }

    /// Merge grids into the set, re-sort and re-index.
    ///
    /// Returns an "insufficient grids" diagnostic (also logged) when fewer
    /// than three grids qualify for triplet formation.
    pub fn add<I>(&mut self, grids: I) -> Option<Diagnostic>
    where
        I: IntoIterator<Item = Grid>,
    {
        self.grids.extend(grids);
        // Stable, so equal spacings keep their insertion order.
        self.grids.sort_by(|a, b| a.spacing().total_cmp(&b.spacing()));
        self.reindex();

        let diagnostic = self.sufficiency_diagnostic()?;
        warn!("{diagnostic}");
        Some(diagnostic)
    }

    /// The "insufficient grids" diagnostic for the current state, if any.
    pub fn sufficiency_diagnostic(&self) -> Option<Diagnostic> {
        if self.indexed.len() >= 3 {
            return None;
        }
        Some(Diagnostic {
            triplet: None,
            side: None,
            stage: Stage::Grids,
            message: format!(
                "Insufficient grids for analysis: {} of {} grid(s) qualify, 3 are required",
                self.indexed.len(),
                self.grids.len()
            ),
        })
    }

    fn reindex(&mut self) {
        self.indexed = self
            .grids
            .iter()
            .filter(|g| g.value().abs() > self.zero_tol)
            .enumerate()
            .map(|(idx, g)| IndexedGrid {
                id: idx + 1,
                spacing: g.spacing(),
                value: g.value(),
            })
            .collect();
    }

    /// Sliding windows of three over the indexed grids. Empty when fewer
    /// than three grids qualify; calling again restarts from the beginning.
    pub fn triplets(&self) -> impl Iterator<Item = Triplet> + '_ {
        self.indexed.windows(3).map(Triplet::from_window)
    }

    /// All grids, including those filtered out as near-zero.
    pub fn grids(&self) -> &[Grid] {
        &self.grids
    }

    pub fn indexed(&self) -> &[IndexedGrid] {
        &self.indexed
    }

    pub fn zero_tol(&self) -> f64 {
        self.zero_tol
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grids(pairs: &[(f64, f64)]) -> Vec<Grid> {
        pairs.iter().map(|&(h, v)| Grid::new(h, v).unwrap()).collect()
    }

    #[test]
    fn add_sorts_by_spacing_and_assigns_ids() {
        let mut set = GridSet::default();
        let diag = set.add(grids(&[(4.0, 0.96178), (1.0, 0.9705), (2.0, 0.96854)]));
        assert!(diag.is_none());

        let spacings: Vec<f64> = set.grids().iter().map(|g| g.spacing()).collect();
        assert_eq!(spacings, [1.0, 2.0, 4.0]);
        let ids: Vec<usize> = set.indexed().iter().map(|g| g.id).collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[test]
    fn triplets_slide_one_grid_at_a_time() {
        let mut set = GridSet::default();
        set.add(grids(&[(1.0, 1.0), (2.0, 1.1), (4.0, 1.3), (8.0, 1.7), (16.0, 2.5)]));

        let labels: Vec<String> = set.triplets().map(|t| t.label()).collect();
        assert_eq!(labels, ["1 2 3", "2 3 4", "3 4 5"]);

        // Restartable.
        assert_eq!(set.triplets().count(), 3);
        let first = set.triplets().next().unwrap();
        assert_eq!(first.spacings(), [1.0, 2.0, 4.0]);
        assert_eq!(first.values(), [1.0, 1.1, 1.3]);
    }

    #[test]
    fn fewer_than_three_grids_yield_no_triplets_and_a_diagnostic() {
        let mut set = GridSet::default();
        let diag = set.add(grids(&[(1.0, 1.0), (2.0, 1.1)])).unwrap();
        assert_eq!(diag.stage, Stage::Grids);
        assert!(diag.message.contains("Insufficient grids"));
        assert_eq!(set.triplets().count(), 0);
    }

    #[test]
    fn near_zero_grid_does_not_disturb_the_others() {
        let mut with_zero = GridSet::default();
        with_zero.add(grids(&[(0.5, 0.00005), (1.0, 0.9705), (2.0, 0.96854), (4.0, 0.96178)]));

        let mut without = GridSet::default();
        without.add(grids(&[(1.0, 0.9705), (2.0, 0.96854), (4.0, 0.96178)]));

        assert_eq!(with_zero.len(), 4);
        assert_eq!(with_zero.indexed(), without.indexed());
        let a: Vec<Triplet> = with_zero.triplets().collect();
        let b: Vec<Triplet> = without.triplets().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_filter_can_leave_too_few_grids() {
        let mut set = GridSet::default();
        let diag = set.add(grids(&[(1.0, 0.0), (2.0, 1.1), (4.0, 1.3)]));
        assert!(diag.is_some());
        assert_eq!(set.indexed().len(), 2);
        assert_eq!(set.indexed()[0].id, 1);
        assert_eq!(set.indexed()[0].spacing, 2.0);
    }

    #[test]
    fn adding_more_grids_reindexes() {
        let mut set = GridSet::default();
        set.add(grids(&[(2.0, 1.1), (4.0, 1.3)]));
        let diag = set.add(grids(&[(1.0, 1.0)]));
        assert!(diag.is_none());
        let ids: Vec<(usize, f64)> = set.indexed().iter().map(|g| (g.id, g.spacing)).collect();
        assert_eq!(ids, [(1, 1.0), (2, 2.0), (3, 4.0)]);
    }
}
