//! # Termination
//!
//! The stopping criteria shared by every optimiser. A run stops as soon as any
//! criterion is met; criteria are checked once per iteration.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use swarmsearch::optimiser::Termination;
//!
//! let termination = Termination::default()
//!     .with_acceptable_fitness(1e-6)
//!     .with_maximal_iterations(500)
//!     .with_maximal_duration(Duration::from_secs(5));
//!
//! assert_eq!(termination.maximal_iterations(), 500);
//! assert_eq!(termination.maximal_evaluations(), usize::MAX);
//! ```

use std::fmt;
use std::time::Duration;

use super::OptimiseResult;

/// Why an optimiser stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// The best fitness reached the acceptable fitness.
    Solved,
    MaximalIterations,
    MaximalEvaluations,
    MaximalDuration,
    /// Another island of the group met a criterion.
    Peer,
    /// The optimiser can no longer move its agent, e.g. a pattern search whose
    /// step size fell below the floating point resolution.
    Converged,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::Solved => "solved",
            StopReason::MaximalIterations => "maximal iterations reached",
            StopReason::MaximalEvaluations => "maximal evaluations reached",
            StopReason::MaximalDuration => "maximal duration reached",
            StopReason::Peer => "another island stopped",
            StopReason::Converged => "step size exhausted",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Termination {
    /// Stop once a fitness less than or equal to this value was found.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_float"))]
    acceptable_fitness: f64,
    maximal_iterations: usize,
    maximal_evaluations: usize,
    maximal_duration: Duration,
}

impl Termination {
    pub fn acceptable_fitness(&self) -> f64 {
        self.acceptable_fitness
    }

    pub fn maximal_iterations(&self) -> usize {
        self.maximal_iterations
    }

    pub fn maximal_evaluations(&self) -> usize {
        self.maximal_evaluations
    }

    pub fn maximal_duration(&self) -> Duration {
        self.maximal_duration
    }

    pub fn with_acceptable_fitness(mut self, value: f64) -> Self {
        self.acceptable_fitness = value;
        self
    }

    pub fn with_maximal_iterations(mut self, value: usize) -> Self {
        self.maximal_iterations = value;
        self
    }

    pub fn with_maximal_evaluations(mut self, value: usize) -> Self {
        self.maximal_evaluations = value;
        self
    }

    pub fn with_maximal_duration(mut self, value: Duration) -> Self {
        self.maximal_duration = value;
        self
    }

    /// Returns the first criterion met by `result`, if any.
    ///
    /// `result.duration` must be up to date. A NaN best fitness is never solved.
    pub fn check(&self, result: &OptimiseResult) -> Option<StopReason> {
        if result.best_fitness <= self.acceptable_fitness {
            Some(StopReason::Solved)
        } else if result.iterations >= self.maximal_iterations {
            Some(StopReason::MaximalIterations)
        } else if result.evaluations >= self.maximal_evaluations {
            Some(StopReason::MaximalEvaluations)
        } else if result.duration >= self.maximal_duration {
            Some(StopReason::MaximalDuration)
        } else {
            None
        }
    }
}

impl Default for Termination {
    /// Never solved by fitness, unlimited iterations and evaluations, one minute.
    fn default() -> Self {
        Self {
            acceptable_fitness: f64::NEG_INFINITY,
            maximal_iterations: usize::MAX,
            maximal_evaluations: usize::MAX,
            maximal_duration: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(fitness: f64, iterations: usize, evaluations: usize) -> OptimiseResult {
        let mut result = OptimiseResult::new(2, 0.0);
        result.best_fitness = fitness;
        result.iterations = iterations;
        result.evaluations = evaluations;
        result
    }

    #[test]
    fn test_default_never_stops_early() {
        let termination = Termination::default();
        assert_eq!(termination.check(&result_with(-1e300, 10, 10)), None);
    }

    #[test]
    fn test_check_order() {
        let termination = Termination::default()
            .with_acceptable_fitness(1.0)
            .with_maximal_iterations(5)
            .with_maximal_evaluations(50);

        assert_eq!(termination.check(&result_with(0.5, 5, 50)), Some(StopReason::Solved));
        assert_eq!(
            termination.check(&result_with(2.0, 5, 50)),
            Some(StopReason::MaximalIterations)
        );
        assert_eq!(
            termination.check(&result_with(2.0, 4, 50)),
            Some(StopReason::MaximalEvaluations)
        );
        assert_eq!(termination.check(&result_with(2.0, 4, 49)), None);
    }

    #[test]
    fn test_duration() {
        let termination = Termination::default().with_maximal_duration(Duration::from_millis(1));
        let mut result = result_with(1.0, 1, 1);
        result.duration = Duration::from_millis(2);
        assert_eq!(termination.check(&result), Some(StopReason::MaximalDuration));
    }
}
