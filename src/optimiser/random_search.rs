//! # RandomSearch
//!
//! Evaluates uniformly random points of the search space until a termination
//! criterion is met. Each iteration costs exactly one evaluation. Mostly useful
//! as a baseline for other optimisers.

use tracing::{debug, info_span};

use super::{OptimiseResult, Optimiser, Termination};
use crate::error::Result;
use crate::problem::Problem;
use crate::rng::RandomNumberGenerator;
use crate::stopwatch::Stopwatch;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RandomSearch {
    termination: Termination,
    seed: Option<u64>,
}

impl RandomSearch {
    pub fn new(termination: Termination) -> Self {
        Self {
            termination,
            seed: None,
        }
    }

    /// Makes runs reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Optimiser for RandomSearch {
    fn name(&self) -> &str {
        "Random Search"
    }

    fn termination(&self) -> &Termination {
        &self.termination
    }

    fn optimise(&self, problem: &dyn Problem) -> Result<OptimiseResult> {
        let span = info_span!("optimise", optimiser = self.name(), dimension = problem.dimension());
        let _entered = span.enter();

        let mut rng = match self.seed {
            Some(seed) => RandomNumberGenerator::from_seed(seed),
            None => RandomNumberGenerator::new(),
        };
        let stopwatch = Stopwatch::start();
        let mut result = OptimiseResult::new(problem.dimension(), self.termination.acceptable_fitness());

        loop {
            for agent in problem.random_agents(1, &mut rng) {
                let fitness = problem.evaluate(&agent);
                result.record(&agent, fitness);
            }
            result.iterations += 1;
            result.evaluations += 1;
            result.duration = stopwatch.elapsed();

            if let Some(reason) = self.termination.check(&result) {
                debug!(%reason, iterations = result.iterations, best_fitness = result.best_fitness, "stopping");
                result.stop_reason = Some(reason);
                return Ok(result);
            }
        }
    }
}
