//! # Benchmark Problems
//!
//! Synthetic test functions commonly used to compare black-box optimisers, and
//! [`FnProblem`], an adapter turning any closure plus bounds into a [`Problem`].
//!
//! Every function here has its global minimum value at a known point:
//!
//! | Function       | Default bounds        | Minimum                       |
//! |----------------|-----------------------|-------------------------------|
//! | Sphere         | `[-5.12, 5.12]`       | `0` at the origin             |
//! | Rastrigin      | `[-5.12, 5.12]`       | `0` at the origin             |
//! | Rosenbrock     | `[-2.048, 2.048]`     | `0` at `(1, ..., 1)`          |
//! | Ackley         | `[-32.768, 32.768]`   | `0` at the origin             |
//! | Griewank       | `[-600, 600]`         | `0` at the origin             |
//! | Styblinski-Tang| `[-5, 5]`             | `-39.16617 d` at `-2.903534`  |

use std::f64::consts::{E, PI};
use std::fmt;

use super::{Bounds, Problem};
use crate::error::Result;

macro_rules! benchmark_problem {
    ($(#[$doc:meta])* $name:ident, $label:literal, $lower:expr, $upper:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            bounds: Bounds,
        }

        impl $name {
            /// Creates the `dimension`-dimensional function with its default bounds.
            pub fn new(dimension: usize) -> Result<Self> {
                Ok(Self {
                    bounds: Bounds::uniform(dimension, $lower, $upper)?,
                })
            }

            /// Creates the function over custom bounds.
            pub fn with_bounds(bounds: Bounds) -> Self {
                Self { bounds }
            }
        }

        impl Problem for $name {
            fn bounds(&self) -> &Bounds {
                &self.bounds
            }

            fn evaluate(&self, agent: &[f64]) -> f64 {
                debug_assert_eq!(agent.len(), self.dimension());
                Self::value(agent)
            }

            fn name(&self) -> &str {
                $label
            }
        }
    };
}

benchmark_problem!(
    /// `f(x) = Σ xᵢ²`
    SphereFunction,
    "Sphere Function",
    -5.12,
    5.12
);

benchmark_problem!(
    /// `f(x) = 10 d + Σ (xᵢ² − 10 cos(2π xᵢ))`
    RastriginFunction,
    "Rastrigin Function",
    -5.12,
    5.12
);

benchmark_problem!(
    /// `f(x) = Σ 100 (xᵢ₊₁ − xᵢ²)² + (xᵢ − 1)²`
    RosenbrockFunction,
    "Rosenbrock Function",
    -2.048,
    2.048
);

benchmark_problem!(
    /// `f(x) = −20 exp(−0.2 ‖x‖ / √d) − exp(Σ cos(2π xᵢ) / d) + 20 + e`
    AckleyFunction,
    "Ackley Function",
    -32.768,
    32.768
);

benchmark_problem!(
    /// `f(x) = 1 + Σ xᵢ² / 4000 − Π cos(xᵢ / √(i + 1))`
    GriewankFunction,
    "Griewank Function",
    -600.0,
    600.0
);

benchmark_problem!(
    /// `f(x) = ½ Σ (xᵢ⁴ − 16 xᵢ² + 5 xᵢ)`
    StyblinskiTangFunction,
    "Styblinski-Tang Function",
    -5.0,
    5.0
);

impl SphereFunction {
    /// Evaluates the function at any point, regardless of the bounds.
    pub fn value(agent: &[f64]) -> f64 {
        agent.iter().map(|x| x * x).sum()
    }
}

impl RastriginFunction {
    pub fn value(agent: &[f64]) -> f64 {
        10.0 * agent.len() as f64
            + agent
                .iter()
                .map(|x| x * x - 10.0 * (2.0 * PI * x).cos())
                .sum::<f64>()
    }
}

impl RosenbrockFunction {
    pub fn value(agent: &[f64]) -> f64 {
        agent
            .windows(2)
            .map(|pair| 100.0 * (pair[1] - pair[0] * pair[0]).powi(2) + (pair[0] - 1.0).powi(2))
            .sum()
    }
}

impl AckleyFunction {
    pub fn value(agent: &[f64]) -> f64 {
        let dimension = agent.len() as f64;
        let norm = agent.iter().map(|x| x * x).sum::<f64>().sqrt();
        let cosine_sum: f64 = agent.iter().map(|x| (2.0 * PI * x).cos()).sum();
        20.0 * (1.0 - (-0.2 * norm / dimension.sqrt()).exp()) - (cosine_sum / dimension).exp() + E
    }
}

impl GriewankFunction {
    pub fn value(agent: &[f64]) -> f64 {
        let sum: f64 = agent.iter().map(|x| x * x / 4000.0).sum();
        let product: f64 = agent
            .iter()
            .enumerate()
            .map(|(i, x)| (x / ((i + 1) as f64).sqrt()).cos())
            .product();
        1.0 + sum - product
    }
}

impl StyblinskiTangFunction {
    pub fn value(agent: &[f64]) -> f64 {
        0.5 * agent
            .iter()
            .map(|x| x.powi(4) - 16.0 * x * x + 5.0 * x)
            .sum::<f64>()
    }
}

/// Adapts a closure and its bounds into a [`Problem`].
///
/// # Example
///
/// ```rust
/// use swarmsearch::problem::{Bounds, FnProblem, Problem};
///
/// let problem = FnProblem::new("shifted", Bounds::uniform(1, -1.0, 1.0).unwrap(), |x: &[f64]| {
///     (x[0] - 0.5).abs()
/// });
/// assert_eq!(problem.evaluate(&[0.5]), 0.0);
/// assert_eq!(problem.name(), "shifted");
/// ```
#[derive(Clone)]
pub struct FnProblem<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    name: String,
    bounds: Bounds,
    function: F,
}

impl<F> FnProblem<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    pub fn new(name: impl Into<String>, bounds: Bounds, function: F) -> Self {
        Self {
            name: name.into(),
            bounds,
            function,
        }
    }
}

impl<F> fmt::Debug for FnProblem<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProblem")
            .field("name", &self.name)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

impl<F> Problem for FnProblem<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    fn evaluate(&self, agent: &[f64]) -> f64 {
        (self.function)(agent)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
