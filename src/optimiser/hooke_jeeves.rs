//! # HookeJeeves
//!
//! A coordinate pattern search. Starting from a random agent, every iteration
//! tries `x ± step` along each axis (clamped to the bounds) and moves to the
//! best neighbour found. When no neighbour is better the step size is divided
//! by `step_size_decrease`. Once the step is too small to move any coordinate
//! the run ends with [`StopReason::Converged`].
//!
//! ## Example
//!
//! ```rust
//! use swarmsearch::optimiser::{HookeJeeves, Optimiser, Termination};
//! use swarmsearch::problem::SphereFunction;
//!
//! let problem = SphereFunction::new(3).unwrap();
//! let optimiser = HookeJeeves::new(Termination::default().with_acceptable_fitness(1e-8))
//!     .with_seed(3);
//!
//! let result = optimiser.optimise(&problem).unwrap();
//! assert!(result.solved());
//! ```

use tracing::{debug, info_span, trace};

use super::{is_improvement, OptimiseResult, Optimiser, StopReason, Termination};
use crate::error::{OptimiseError, Result};
use crate::problem::Problem;
use crate::rng::RandomNumberGenerator;
use crate::stopwatch::Stopwatch;

#[derive(Debug, Clone, PartialEq)]
pub struct HookeJeeves {
    termination: Termination,
    initial_step_size: f64,
    step_size_decrease: f64,
    seed: Option<u64>,
}

impl HookeJeeves {
    /// Creates a pattern search with an initial step size of `1` that halves
    /// the step whenever an iteration fails.
    pub fn new(termination: Termination) -> Self {
        Self {
            termination,
            initial_step_size: 1.0,
            step_size_decrease: 2.0,
            seed: None,
        }
    }

    pub fn with_initial_step_size(mut self, value: f64) -> Self {
        self.initial_step_size = value;
        self
    }

    pub fn with_step_size_decrease(mut self, value: f64) -> Self {
        self.step_size_decrease = value;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn initial_step_size(&self) -> f64 {
        self.initial_step_size
    }

    pub fn step_size_decrease(&self) -> f64 {
        self.step_size_decrease
    }

    /// Checks the step size parameters.
    ///
    /// # Errors
    ///
    /// Returns `OptimiseError::Configuration` unless the initial step size is
    /// positive and the decrease is greater than `1`.
    pub fn validate(&self) -> Result<()> {
        if !(self.initial_step_size.is_finite() && self.initial_step_size > 0.0) {
            return Err(OptimiseError::Configuration(format!(
                "Initial step size must be positive, got {}",
                self.initial_step_size
            )));
        }
        if !(self.step_size_decrease.is_finite() && self.step_size_decrease > 1.0) {
            return Err(OptimiseError::Configuration(format!(
                "Step size decrease must be greater than 1, got {}",
                self.step_size_decrease
            )));
        }
        Ok(())
    }
}

impl Default for HookeJeeves {
    fn default() -> Self {
        Self::new(Termination::default())
    }
}

impl Optimiser for HookeJeeves {
    fn name(&self) -> &str {
        "Hooke-Jeeves"
    }

    fn termination(&self) -> &Termination {
        &self.termination
    }

    fn optimise(&self, problem: &dyn Problem) -> Result<OptimiseResult> {
        self.validate()?;

        let span = info_span!("optimise", optimiser = self.name(), dimension = problem.dimension());
        let _entered = span.enter();

        let mut rng = match self.seed {
            Some(seed) => RandomNumberGenerator::from_seed(seed),
            None => RandomNumberGenerator::new(),
        };
        let stopwatch = Stopwatch::start();
        let mut result = OptimiseResult::new(problem.dimension(), self.termination.acceptable_fitness());

        let (lower, upper) = (problem.lower_bounds(), problem.upper_bounds());
        let mut position = problem
            .random_agents(1, &mut rng)
            .pop()
            .unwrap_or_default();
        let mut fitness = problem.evaluate(&position);
        result.record(&position, fitness);
        result.iterations = 1;
        result.evaluations = 1;
        let mut step_size = self.initial_step_size;
        let mut exhausted = false;

        loop {
            result.duration = stopwatch.elapsed();
            let reason = self
                .termination
                .check(&result)
                .or(exhausted.then_some(StopReason::Converged));
            if let Some(reason) = reason {
                debug!(%reason, iterations = result.iterations, step_size, "stopping");
                result.stop_reason = Some(reason);
                return Ok(result);
            }

            let mut best_neighbour: Option<(Vec<f64>, f64)> = None;
            'neighbours: for k in 0..position.len() {
                for step in [step_size, -step_size] {
                    let mut neighbour = position.clone();
                    neighbour[k] = (neighbour[k] + step).clamp(lower[k], upper[k]);

                    let neighbour_fitness = problem.evaluate(&neighbour);
                    result.evaluations += 1;

                    let incumbent = best_neighbour.as_ref().map_or(fitness, |(_, f)| *f);
                    if is_improvement(neighbour_fitness, incumbent) {
                        best_neighbour = Some((neighbour, neighbour_fitness));
                    }
                    if result.evaluations >= self.termination.maximal_evaluations() {
                        break 'neighbours;
                    }
                }
            }
            result.iterations += 1;

            match best_neighbour {
                Some((neighbour, neighbour_fitness)) => {
                    position = neighbour;
                    fitness = neighbour_fitness;
                    result.record(&position, fitness);
                }
                None => {
                    let previous = step_size;
                    step_size /= self.step_size_decrease;
                    trace!(step_size, "no better neighbour");
                    exhausted = step_size == previous || !moves_any(&position, step_size);
                }
            }
        }
    }
}

/// Returns `true` if adding or subtracting `step` changes at least one coordinate.
fn moves_any(position: &[f64], step: f64) -> bool {
    position.iter().any(|&x| x + step != x || x - step != x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Bounds, FnProblem, SphereFunction};

    #[test]
    fn test_rejects_invalid_step_sizes() {
        let problem = SphereFunction::new(2).unwrap();
        for optimiser in [
            HookeJeeves::default().with_initial_step_size(0.0),
            HookeJeeves::default().with_initial_step_size(-1.0),
            HookeJeeves::default().with_step_size_decrease(1.0),
            HookeJeeves::default().with_step_size_decrease(f64::NAN),
        ] {
            assert!(matches!(
                optimiser.optimise(&problem),
                Err(OptimiseError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_defaults() {
        let optimiser = HookeJeeves::default();
        assert_eq!(optimiser.initial_step_size(), 1.0);
        assert_eq!(optimiser.step_size_decrease(), 2.0);
    }

    #[test]
    fn test_solves_sphere() {
        let problem = SphereFunction::new(4).unwrap();
        let optimiser = HookeJeeves::new(
            Termination::default()
                .with_acceptable_fitness(1e-10)
                .with_maximal_evaluations(100_000),
        )
        .with_seed(5);
        let result = optimiser.optimise(&problem).unwrap();

        assert_eq!(result.stop_reason, Some(StopReason::Solved));
        assert!(result.best_fitness <= 1e-10);
    }

    #[test]
    fn test_respects_evaluation_budget() {
        let problem = SphereFunction::new(5).unwrap();
        let optimiser = HookeJeeves::new(Termination::default().with_maximal_evaluations(37)).with_seed(2);
        let result = optimiser.optimise(&problem).unwrap();

        assert_eq!(result.evaluations, 37);
        assert_eq!(result.stop_reason, Some(StopReason::MaximalEvaluations));
    }

    #[test]
    fn test_neighbours_stay_in_bounds() {
        let bounds = Bounds::uniform(2, 0.0, 1.0).unwrap();
        let problem = FnProblem::new("inside", bounds, |agent: &[f64]| {
            assert!(agent.iter().all(|x| (0.0..=1.0).contains(x)));
            -agent.iter().sum::<f64>()
        });
        let optimiser = HookeJeeves::new(Termination::default().with_maximal_iterations(20)).with_seed(9);
        let result = optimiser.optimise(&problem).unwrap();

        assert_eq!(result.best_position, vec![1.0, 1.0]);
        assert_eq!(result.best_fitness, -2.0);
    }

    #[test]
    fn test_flat_problem_ends_when_the_step_is_exhausted() {
        let bounds = Bounds::uniform(3, 0.5, 1.5).unwrap();
        let problem = FnProblem::new("flat", bounds, |_: &[f64]| 1.0);
        let optimiser = HookeJeeves::default().with_seed(4);
        let result = optimiser.optimise(&problem).unwrap();

        assert_eq!(result.stop_reason, Some(StopReason::Converged));
        // Coordinates in [0.5, 1.5] stop moving once the step drops below 2^-53.
        assert!(result.iterations > 50 && result.iterations < 60);
        assert_eq!(result.evaluations, 1 + (result.iterations - 1) * 6);
    }

    #[test]
    fn test_sphere_converges_without_a_target() {
        let problem = SphereFunction::new(2).unwrap();
        let result = HookeJeeves::default().with_seed(11).optimise(&problem).unwrap();

        assert_eq!(result.stop_reason, Some(StopReason::Converged));
        assert!(result.best_fitness < 1e-20);
        assert!(result.duration < Termination::default().maximal_duration());
    }

    #[test]
    fn test_moves_any() {
        assert!(moves_any(&[1.0, 0.0], 1e-300));
        assert!(!moves_any(&[1.0, 2.0], 1e-17));
        assert!(!moves_any(&[0.0], 0.0));
    }
}
