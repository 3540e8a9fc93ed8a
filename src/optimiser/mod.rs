//! # Optimisers
//!
//! Every optimiser implements [`Optimiser`]: it is configured before a run, then
//! [`Optimiser::optimise`] searches a [`Problem`] and returns an
//! [`OptimiseResult`] describing the best agent found and what the run cost.
//!
//! - [`ParallelSwarmSearch`]: multi-threaded particle swarm with a dynamic random
//!   topology and optional island-model migration.
//! - [`RandomSearch`]: uniform random sampling.
//! - [`HookeJeeves`]: coordinate pattern search.

use std::time::Duration;

use crate::error::Result;
use crate::problem::{Bounds, Problem};

pub mod hooke_jeeves;
pub mod parallel_swarm_search;
pub mod random_search;
pub mod termination;

pub use hooke_jeeves::HookeJeeves;
pub use parallel_swarm_search::{ParallelSwarmSearch, SwarmOptions};
pub use random_search::RandomSearch;
pub use termination::{StopReason, Termination};

/// Describes the outcome of one optimisation run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimiseResult {
    /// The best agent found. NaN in every dimension until something was evaluated.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_float::vec"))]
    pub best_position: Vec<f64>,
    /// The fitness of `best_position`. `+∞` until something was evaluated.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_float"))]
    pub best_fitness: f64,
    /// The fitness at or below which the problem counts as solved.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_float"))]
    pub acceptable_fitness: f64,
    pub iterations: usize,
    /// The number of times `Problem::evaluate` was called.
    pub evaluations: usize,
    pub duration: Duration,
    /// The criterion that ended the run.
    pub stop_reason: Option<StopReason>,
}

impl OptimiseResult {
    pub fn new(dimension: usize, acceptable_fitness: f64) -> Self {
        Self {
            best_position: vec![f64::NAN; dimension],
            best_fitness: f64::INFINITY,
            acceptable_fitness,
            iterations: 0,
            evaluations: 0,
            duration: Duration::ZERO,
            stop_reason: None,
        }
    }

    /// Returns `true` if the best fitness is less than or equal to the acceptable fitness.
    pub fn solved(&self) -> bool {
        self.best_fitness <= self.acceptable_fitness
    }

    /// Replaces the best agent if `fitness` is strictly better.
    ///
    /// Non-finite values never replace the best agent. Returns whether it was replaced.
    pub fn record(&mut self, position: &[f64], fitness: f64) -> bool {
        if is_improvement(fitness, self.best_fitness) {
            self.best_position.clear();
            self.best_position.extend_from_slice(position);
            self.best_fitness = fitness;
            true
        } else {
            false
        }
    }

    /// Returns the best agent mapped to `[0, 1]^d` relative to `bounds`.
    pub fn normalised_best_position(&self, bounds: &Bounds) -> Vec<f64> {
        bounds.normalise(&self.best_position)
    }
}

/// Returns `true` if `candidate` is a finite value strictly less than `incumbent`.
pub(crate) fn is_improvement(candidate: f64, incumbent: f64) -> bool {
    candidate.is_finite() && candidate < incumbent
}

/// Interface for algorithms that approximate the minimum of a [`Problem`].
pub trait Optimiser {
    /// Identifies the optimiser in logs.
    fn name(&self) -> &str;

    /// The stopping criteria of this optimiser.
    fn termination(&self) -> &Termination;

    /// Minimises `problem`.
    ///
    /// # Errors
    ///
    /// Returns an error if the optimiser's configuration is invalid for
    /// `problem`, before any evaluation takes place, or if a collaborator
    /// (thread pool, island coordinator, trace file) fails.
    fn optimise(&self, problem: &dyn Problem) -> Result<OptimiseResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_result_is_unsolved() {
        let result = OptimiseResult::new(3, f64::NEG_INFINITY);
        assert!(result.best_position.iter().all(|x| x.is_nan()));
        assert_eq!(result.best_fitness, f64::INFINITY);
        assert!(!result.solved());
    }

    #[test]
    fn test_solved_is_inclusive() {
        let mut result = OptimiseResult::new(1, 0.5);
        result.best_fitness = 0.5;
        assert!(result.solved());
        result.best_fitness = 0.5000001;
        assert!(!result.solved());
    }

    #[test]
    fn test_record_ignores_non_finite_and_worse() {
        let mut result = OptimiseResult::new(2, 0.0);
        assert!(!result.record(&[1.0, 1.0], f64::NAN));
        assert!(!result.record(&[1.0, 1.0], f64::INFINITY));
        assert!(result.record(&[1.0, 1.0], 3.0));
        assert!(!result.record(&[2.0, 2.0], 3.0));
        assert!(result.record(&[0.5, 0.5], 1.0));
        assert_eq!(result.best_position, vec![0.5, 0.5]);
        assert_eq!(result.best_fitness, 1.0);
    }

    #[test]
    fn test_negative_infinity_is_not_an_improvement() {
        assert!(!is_improvement(f64::NEG_INFINITY, 0.0));
        assert!(is_improvement(-1e308, 0.0));
    }

    #[test]
    fn test_normalised_best_position() {
        let bounds = Bounds::new(vec![0.0, -1.0], vec![2.0, 1.0]).unwrap();
        let mut result = OptimiseResult::new(2, 0.0);
        result.record(&[1.5, 0.0], 2.0);
        assert_eq!(result.normalised_best_position(&bounds), vec![0.75, 0.5]);

        result.record(&[0.0, 1.0], 1.0);
        assert_eq!(result.normalised_best_position(&bounds), vec![0.0, 1.0]);
    }
}
