//! # Problem Trait
//!
//! The `Problem` trait defines the interface for objective functions that can be
//! minimised by an [`Optimiser`](crate::optimiser::Optimiser). A problem is a
//! pure function from a parameter vector to a real value, plus static lower and
//! upper bounds for every dimension.
//!
//! Optimisers never call [`Problem::evaluate`] with a point outside the bounds.
//!
//! ## Example
//!
//! ```rust
//! use swarmsearch::problem::{Bounds, Problem};
//!
//! #[derive(Debug)]
//! struct Paraboloid {
//!     bounds: Bounds,
//! }
//!
//! impl Problem for Paraboloid {
//!     fn bounds(&self) -> &Bounds {
//!         &self.bounds
//!     }
//!
//!     fn evaluate(&self, agent: &[f64]) -> f64 {
//!         agent.iter().map(|x| x * x).sum()
//!     }
//! }
//!
//! let problem = Paraboloid { bounds: Bounds::uniform(2, -5.0, 5.0).unwrap() };
//! assert_eq!(problem.dimension(), 2);
//! assert_eq!(problem.evaluate_normalised(&[0.5, 0.5]), 0.0);
//! ```

use std::fmt::Debug;

use crate::error::{OptimiseError, Result};
use crate::rng::RandomNumberGenerator;

pub mod benchmark;
pub mod hammersley;

pub use benchmark::{
    AckleyFunction, FnProblem, GriewankFunction, RastriginFunction, RosenbrockFunction,
    SphereFunction, StyblinskiTangFunction,
};

/// Lower and upper bound constraints of a search space.
///
/// Always non-empty, with `lower[i] < upper[i]` and finite values in every
/// dimension.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Bounds {
    /// Creates bounds from per-dimension lower and upper limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the vectors are empty, differ in length, contain
    /// non-finite values, or `lower[i] >= upper[i]` in some dimension.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        if lower.is_empty() {
            return Err(OptimiseError::InvalidBounds(
                "A problem needs at least one dimension".to_string(),
            ));
        }
        if lower.len() != upper.len() {
            return Err(OptimiseError::DimensionMismatch {
                expected: lower.len(),
                actual: upper.len(),
            });
        }
        if let Some(n) = (0..lower.len())
            .find(|&n| !lower[n].is_finite() || !upper[n].is_finite() || lower[n] >= upper[n])
        {
            return Err(OptimiseError::InvalidBounds(format!(
                "Lower bound {} must be less than upper bound {} in dimension {}",
                lower[n], upper[n], n
            )));
        }
        Ok(Self { lower, upper })
    }

    /// Creates `dimension`-dimensional bounds with the same limits in every dimension.
    pub fn uniform(dimension: usize, lower: f64, upper: f64) -> Result<Self> {
        Self::new(vec![lower; dimension], vec![upper; dimension])
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    /// Returns the element-wise difference between upper and lower bounds.
    pub fn range(&self) -> Vec<f64> {
        self.upper
            .iter()
            .zip(&self.lower)
            .map(|(u, l)| u - l)
            .collect()
    }

    /// Returns `true` if every component of `agent` lies within the bounds.
    pub fn contains(&self, agent: &[f64]) -> bool {
        agent.len() == self.dimension()
            && agent
                .iter()
                .zip(self.lower.iter().zip(&self.upper))
                .all(|(x, (l, u))| l <= x && x <= u)
    }

    /// Maps a point of `[0, 1]^d` into the bounds.
    ///
    /// Components outside `[0, 1]` are clamped first, so the result is always
    /// inside the bounds.
    pub fn denormalise(&self, normalised_agent: &[f64]) -> Vec<f64> {
        normalised_agent
            .iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(x, (l, u))| (l + x.clamp(0.0, 1.0) * (u - l)).clamp(*l, *u))
            .collect()
    }

    /// Maps a point inside the bounds to `[0, 1]^d`.
    pub fn normalise(&self, agent: &[f64]) -> Vec<f64> {
        agent
            .iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(x, (l, u))| ((x - l) / (u - l)).clamp(0.0, 1.0))
            .collect()
    }
}

/// Trait for bounded minimisation problems.
///
/// Implementors provide the bounds and the pure evaluation function; all other
/// methods have default implementations.
pub trait Problem: Debug + Send + Sync {
    /// The search space of this problem.
    fn bounds(&self) -> &Bounds;

    /// Evaluates this problem at `agent`, which has `dimension()` components and
    /// lies within the bounds.
    fn evaluate(&self, agent: &[f64]) -> f64;

    /// A human readable name, used in logs.
    fn name(&self) -> &str {
        "problem"
    }

    fn dimension(&self) -> usize {
        self.bounds().dimension()
    }

    fn lower_bounds(&self) -> &[f64] {
        self.bounds().lower()
    }

    fn upper_bounds(&self) -> &[f64] {
        self.bounds().upper()
    }

    fn bounds_range(&self) -> Vec<f64> {
        self.bounds().range()
    }

    /// Evaluates this problem at `normalised_agent`, whose components are in
    /// `[0, 1]`. The agent is mapped to the problem bounds before evaluation.
    fn evaluate_normalised(&self, normalised_agent: &[f64]) -> f64 {
        self.evaluate(&self.bounds().denormalise(normalised_agent))
    }

    /// Draws `count` uniformly distributed agents from `[0, 1]^d`.
    fn normalised_random_agents(
        &self,
        count: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Vec<Vec<f64>> {
        (0..count)
            .map(|_| {
                (0..self.dimension())
                    .map(|_| rng.uniform_in_range(0.0, 1.0))
                    .collect()
            })
            .collect()
    }

    /// Generates `count` Hammersley points in `[0, 1]^d`.
    fn normalised_hammersley_agents(&self, count: usize) -> Vec<Vec<f64>> {
        hammersley::hammersley_points(self.dimension(), count)
    }

    /// Generates `count` agents in `[0, 1]^d`, the first half from the
    /// Hammersley sequence and the rest uniformly at random.
    fn initialise_normalised_agents(
        &self,
        count: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Vec<Vec<f64>> {
        let hammersley_count = count / 2;
        let mut agents = self.normalised_hammersley_agents(hammersley_count);
        agents.extend(self.normalised_random_agents(count - hammersley_count, rng));
        agents
    }

    /// Draws `count` uniformly distributed agents within the bounds.
    fn random_agents(&self, count: usize, rng: &mut RandomNumberGenerator) -> Vec<Vec<f64>> {
        self.normalised_random_agents(count, rng)
            .iter()
            .map(|agent| self.bounds().denormalise(agent))
            .collect()
    }
}

impl<P: Problem + ?Sized> Problem for &P {
    fn bounds(&self) -> &Bounds {
        (**self).bounds()
    }

    fn evaluate(&self, agent: &[f64]) -> f64 {
        (**self).evaluate(agent)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
