//! Local search over candidate neighborhoods.
//!
//! A [`Searcher`] walks from a point to the best candidate its neighbor
//! function offers, for as long as that strictly lowers the cost, and stops
//! as soon as the cost is within tolerance. Failing to improve before
//! reaching tolerance is reported as [`SearchResult::Exhausted`], not as an
//! error.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::neighbors::NeighborFunction;

/// Outcome of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchResult<T> {
    /// A point whose cost is within tolerance.
    Found {
        point: Vec<T>,
        cost: f64,
        iterations: usize,
    },
    /// No candidate improved on `best` and tolerance was not met.
    Exhausted {
        best: Vec<T>,
        cost: f64,
        iterations: usize,
    },
}

impl<T> SearchResult<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// The satisfying point, if one was found.
    pub fn point(&self) -> Option<&[T]> {
        match self {
            Self::Found { point, .. } => Some(point),
            Self::Exhausted { .. } => None,
        }
    }

    pub fn into_point(self) -> Option<Vec<T>> {
        match self {
            Self::Found { point, .. } => Some(point),
            Self::Exhausted { .. } => None,
        }
    }

    /// The last point the search stood on, found or not.
    pub fn last_point(&self) -> &[T] {
        match self {
            Self::Found { point, .. } => point,
            Self::Exhausted { best, .. } => best,
        }
    }

    pub fn cost(&self) -> f64 {
        match self {
            Self::Found { cost, .. } | Self::Exhausted { cost, .. } => *cost,
        }
    }

    pub fn iterations(&self) -> usize {
        match self {
            Self::Found { iterations, .. } | Self::Exhausted { iterations, .. } => *iterations,
        }
    }

    /// Apply `f` to the found point, leaving exhaustion untouched.
    pub fn map_found(self, f: impl FnOnce(Vec<T>) -> Vec<T>) -> Self {
        match self {
            Self::Found {
                point,
                cost,
                iterations,
            } => Self::Found {
                point: f(point),
                cost,
                iterations,
            },
            exhausted => exhausted,
        }
    }
}

/// Everything one search needs: the fixed start, the cost and neighbor
/// functions, and the tolerance.
pub struct SearchProblem<'a, T> {
    pub start: &'a [T],
    pub cost: &'a dyn Fn(&[T]) -> f64,
    pub neighbors: &'a dyn NeighborFunction<T>,
    pub delta: f64,
    pub max_iterations: Option<usize>,
}

impl<'a, T> SearchProblem<'a, T> {
    pub fn new(
        start: &'a [T],
        cost: &'a dyn Fn(&[T]) -> f64,
        neighbors: &'a dyn NeighborFunction<T>,
        delta: f64,
    ) -> Self {
        Self {
            start,
            cost,
            neighbors,
            delta,
            max_iterations: None,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Which improving candidate a [`Searcher`] moves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selection {
    /// The lowest-cost candidate of the whole neighborhood.
    #[default]
    Best,
    /// The first candidate that beats the current cost.
    First,
}

/// Iterative local search state: current point, its cost and the tolerance.
pub struct Searcher<'a, T> {
    cost: &'a dyn Fn(&[T]) -> f64,
    neighbors: &'a dyn NeighborFunction<T>,
    delta: f64,
    max_iterations: Option<usize>,
    selection: Selection,
    current: Vec<T>,
    current_cost: f64,
    iterations: usize,
}

impl<'a, T: Clone> Searcher<'a, T> {
    /// Search state positioned at the problem's start point.
    pub fn new(problem: &SearchProblem<'a, T>) -> Self {
        Self::from_point(problem, problem.start.to_vec())
    }

    /// Search state positioned at `current`; the cost function still
    /// measures from the problem's start.
    pub fn from_point(problem: &SearchProblem<'a, T>, current: Vec<T>) -> Self {
        let current_cost = (problem.cost)(&current);
        Self {
            cost: problem.cost,
            neighbors: problem.neighbors,
            delta: problem.delta,
            max_iterations: problem.max_iterations,
            selection: Selection::Best,
            current,
            current_cost,
            iterations: 0,
        }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn current_point(&self) -> &[T] {
        &self.current
    }

    pub fn current_cost(&self) -> f64 {
        self.current_cost
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn is_satisfied(&self) -> bool {
        self.current_cost <= self.delta
    }

    /// Search from the current point until satisfied or stuck.
    pub fn find(self) -> SearchResult<T> {
        self.run()
    }

    /// One iteration. Returns whether the search moved.
    pub fn step(&mut self) -> bool {
        let mut best: Option<(Vec<T>, f64)> = None;
        for candidate in self.neighbors.neighbors(&self.current) {
            let cost = (self.cost)(&candidate);
            if cost.is_nan() {
                continue;
            }
            let beats_best = best.as_ref().map_or(true, |(_, best_cost)| cost < *best_cost);
            if !beats_best {
                continue;
            }
            best = Some((candidate, cost));
            if self.selection == Selection::First && cost < self.current_cost {
                break;
            }
        }
        self.iterations += 1;

        match best {
            Some((candidate, cost)) if cost < self.current_cost => {
                trace!(
                    "Iteration {}: cost {} -> {}",
                    self.iterations,
                    self.current_cost,
                    cost
                );
                self.current = candidate;
                self.current_cost = cost;
                true
            }
            _ => false,
        }
    }

    fn run(mut self) -> SearchResult<T> {
        loop {
            if self.is_satisfied() {
                debug!(
                    "Search converged after {} iterations with cost {}",
                    self.iterations, self.current_cost
                );
                return SearchResult::Found {
                    point: self.current,
                    cost: self.current_cost,
                    iterations: self.iterations,
                };
            }

            let capped = self
                .max_iterations
                .is_some_and(|limit| self.iterations >= limit);
            if capped || !self.step() {
                debug!(
                    "Search exhausted after {} iterations; best cost {} exceeds delta {}",
                    self.iterations, self.current_cost, self.delta
                );
                return SearchResult::Exhausted {
                    best: self.current,
                    cost: self.current_cost,
                    iterations: self.iterations,
                };
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Search strategies
// ---------------------------------------------------------------------------

/// Common trait for all search strategies.
pub trait SearchStrategy<T>: Send + Sync {
    /// Search starting at `from` instead of the problem's start point.
    fn find_from_point(&self, problem: &SearchProblem<'_, T>, from: Vec<T>) -> SearchResult<T>;

    /// Search starting at the problem's start point.
    fn find(&self, problem: &SearchProblem<'_, T>) -> SearchResult<T>
    where
        T: Clone,
    {
        self.find_from_point(problem, problem.start.to_vec())
    }

    /// Human-readable strategy name.
    fn name(&self) -> &str;
}

/// Moves to the lowest-cost neighbor each iteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestImprovement;

impl<T: Clone> SearchStrategy<T> for BestImprovement {
    fn find_from_point(&self, problem: &SearchProblem<'_, T>, from: Vec<T>) -> SearchResult<T> {
        Searcher::from_point(problem, from).find()
    }

    fn find(&self, problem: &SearchProblem<'_, T>) -> SearchResult<T> {
        Searcher::new(problem).find()
    }

    fn name(&self) -> &str {
        "best_improvement"
    }
}

/// Moves to the first neighbor that improves on the current cost.
///
/// Cheaper per iteration than [`BestImprovement`] on large neighborhoods,
/// usually at the price of more iterations.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstImprovement;

impl<T: Clone> SearchStrategy<T> for FirstImprovement {
    fn find_from_point(&self, problem: &SearchProblem<'_, T>, from: Vec<T>) -> SearchResult<T> {
        Searcher::from_point(problem, from)
            .with_selection(Selection::First)
            .find()
    }

    fn name(&self) -> &str {
        "first_improvement"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighbors::{FnNeighbors, StepNeighbors};

    fn f64_problem<'a>(
        start: &'a [f64],
        cost: &'a dyn Fn(&[f64]) -> f64,
        neighbors: &'a dyn NeighborFunction<f64>,
        delta: f64,
    ) -> SearchProblem<'a, f64> {
        SearchProblem::new(start, cost, neighbors, delta)
    }

    fn unit_steps() -> StepNeighbors<f64> {
        StepNeighbors::new(1.0, 0.0, 10.0)
    }

    #[test]
    fn converges_to_target() {
        let cost = |p: &[f64]| (p[0] - 7.0).abs();
        let neighbors = unit_steps();
        let problem = f64_problem(&[0.0], &cost, &neighbors, 0.001);

        let result = Searcher::new(&problem).find();
        assert!(result.is_found());
        assert_eq!(result.point(), Some(&[7.0][..]));
        assert_eq!(result.iterations(), 7);
        assert_eq!(result.cost(), 0.0);
    }

    #[test]
    fn start_within_tolerance_returns_immediately() {
        let cost = |p: &[f64]| (p[0] - 3.0).abs();
        let neighbors = unit_steps();
        let problem = f64_problem(&[3.0], &cost, &neighbors, 0.5);

        let result = Searcher::new(&problem).find();
        assert_eq!(result.iterations(), 0);
        assert_eq!(result.into_point(), Some(vec![3.0]));
    }

    #[test]
    fn exhausts_at_local_minimum() {
        // Only upward moves; the target lies below the start.
        let cost = |p: &[f64]| (p[0] - 2.0).abs();
        let upward = FnNeighbors::new("up", |p: &[f64]| vec![vec![p[0] + 1.0]]);
        let problem = f64_problem(&[5.0], &cost, &upward, 0.001);

        match Searcher::new(&problem).find() {
            SearchResult::Exhausted {
                best,
                cost,
                iterations,
            } => {
                assert_eq!(best, vec![5.0]);
                assert_eq!(cost, 3.0);
                assert_eq!(iterations, 1);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[test]
    fn exhausts_when_tolerance_unreachable() {
        // Integer steps can never get within 0.1 of 2.5.
        let cost = |p: &[f64]| (p[0] - 2.5).abs();
        let neighbors = unit_steps();
        let problem = f64_problem(&[0.0], &cost, &neighbors, 0.1);

        let result = Searcher::new(&problem).find();
        assert!(!result.is_found());
        assert_eq!(result.point(), None);
        assert_eq!(result.last_point(), &[2.0]);
        assert_eq!(result.cost(), 0.5);
    }

    #[test]
    fn ties_go_to_first_candidate() {
        let cost = |p: &[f64]| (p[0].abs() - 1.0).abs();
        // -1 and +1 cost the same; -1 is generated first.
        let neighbors = unit_steps_wide();
        let problem = f64_problem(&[0.0], &cost, &neighbors, 0.001);

        assert_eq!(Searcher::new(&problem).find().into_point(), Some(vec![-1.0]));
    }

    fn unit_steps_wide() -> StepNeighbors<f64> {
        StepNeighbors::new(1.0, -10.0, 10.0)
    }

    #[test]
    fn find_from_point_keeps_start_as_origin() {
        // Cost measures from the start (0.0); the walk begins at 9.0.
        let start = [0.0];
        let cost = |p: &[f64]| ((p[0] - start[0]) - 4.0).abs();
        let neighbors = unit_steps();
        let problem = f64_problem(&start, &cost, &neighbors, 0.001);

        let result = Searcher::from_point(&problem, vec![9.0]).find();
        assert_eq!(result.point(), Some(&[4.0][..]));
        assert_eq!(result.iterations(), 5);
    }

    #[test]
    fn initial_cost_evaluated_once_at_resume_point() {
        let evaluated = std::cell::RefCell::new(Vec::new());
        let cost = |p: &[f64]| {
            evaluated.borrow_mut().push(p[0]);
            (p[0] - 4.0).abs()
        };
        let neighbors = unit_steps();
        let problem = f64_problem(&[0.0], &cost, &neighbors, 0.001);

        let searcher = Searcher::from_point(&problem, vec![9.0]);
        assert_eq!(searcher.current_cost(), 5.0);
        assert_eq!(*evaluated.borrow(), vec![9.0]);
    }

    #[test]
    fn nan_candidates_are_skipped() {
        let cost = |p: &[f64]| {
            if p[0] < 0.0 {
                f64::NAN
            } else {
                (p[0] - 2.0).abs()
            }
        };
        let neighbors = unit_steps_wide();
        let problem = f64_problem(&[0.0], &cost, &neighbors, 0.001);

        assert_eq!(Searcher::new(&problem).find().into_point(), Some(vec![2.0]));
    }

    #[test]
    fn max_iterations_caps_search() {
        let cost = |p: &[f64]| (p[0] - 7.0).abs();
        let neighbors = unit_steps();
        let problem =
            f64_problem(&[0.0], &cost, &neighbors, 0.001).with_max_iterations(Some(3));

        let result = Searcher::new(&problem).find();
        assert!(!result.is_found());
        assert_eq!(result.iterations(), 3);
        assert_eq!(result.last_point(), &[3.0]);
    }

    #[test]
    fn step_reports_progress() {
        let cost = |p: &[f64]| (p[0] - 1.0).abs();
        let neighbors = unit_steps();
        let problem = f64_problem(&[0.0], &cost, &neighbors, 0.001);

        let mut searcher = Searcher::new(&problem);
        assert_eq!(searcher.current_cost(), 1.0);
        assert!(searcher.step());
        assert_eq!(searcher.current_point(), &[1.0]);
        assert!(searcher.is_satisfied());
        assert!(!searcher.step());
        assert_eq!(searcher.iterations(), 2);
    }

    #[test]
    fn strategies_agree_on_convex_problem() {
        let cost = |p: &[f64]| ((p[0] - 3.0).powi(2) + (p[1] - 5.0).powi(2)).sqrt();
        let neighbors = unit_steps();
        let problem = f64_problem(&[0.0, 0.0], &cost, &neighbors, 0.001);

        let best = BestImprovement.find(&problem);
        let first = FirstImprovement.find(&problem);
        assert_eq!(best.point(), Some(&[3.0, 5.0][..]));
        assert_eq!(first.point(), Some(&[3.0, 5.0][..]));
        assert!(best.iterations() <= first.iterations());
        assert_eq!(SearchStrategy::<f64>::name(&BestImprovement), "best_improvement");
    }

    #[test]
    fn identical_searches_are_deterministic() {
        let cost = |p: &[f64]| ((p[0] - 3.0).powi(2) + (p[1] - 5.0).powi(2)).sqrt();
        let neighbors = unit_steps();
        let problem = f64_problem(&[0.0, 0.0], &cost, &neighbors, 0.001);

        assert_eq!(BestImprovement.find(&problem), BestImprovement.find(&problem));
    }

    #[test]
    fn map_found_only_touches_found() {
        let found: SearchResult<f64> = SearchResult::Found {
            point: vec![2.0, 4.0],
            cost: 0.0,
            iterations: 1,
        };
        let exhausted: SearchResult<f64> = SearchResult::Exhausted {
            best: vec![2.0, 4.0],
            cost: 1.0,
            iterations: 1,
        };

        let halve = |p: Vec<f64>| p.into_iter().map(|v| v / 2.0).collect::<Vec<f64>>();
        assert_eq!(found.map_found(halve).into_point(), Some(vec![1.0, 2.0]));
        assert_eq!(exhausted.map_found(halve).last_point(), &[2.0, 4.0]);
    }
}
