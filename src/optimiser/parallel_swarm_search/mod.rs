//! # Parallel Swarm Search
//!
//! A particle swarm optimiser in the SPSO 2011 style. Each particle moves
//! towards a random point on a hypersphere around the mean of its position,
//! its personal best and the personal best of its best informant. Informants
//! come from a random directed topology that is redrawn whenever an iteration
//! fails to improve the swarm's best solution.
//!
//! Particle updates of one iteration run in parallel on a `rayon` pool. With a
//! [`Coordinator`] of more than one member, several swarms ("islands") search
//! the same problem and periodically share their best solution.
//!
//! ## Example
//!
//! ```rust
//! use swarmsearch::optimiser::{Optimiser, ParallelSwarmSearch, SwarmOptions, Termination};
//! use swarmsearch::problem::SphereFunction;
//!
//! let problem = SphereFunction::new(2).unwrap();
//! let options = SwarmOptions::builder().swarm_size(10).threads(1).seed(7).build();
//! let termination = Termination::default()
//!     .with_acceptable_fitness(1e-6)
//!     .with_maximal_iterations(500);
//!
//! let result = ParallelSwarmSearch::new(options, termination)
//!     .optimise(&problem)
//!     .unwrap();
//! assert!(result.solved());
//! assert_eq!(result.evaluations, result.iterations * 10);
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, info_span};

use super::{OptimiseResult, Optimiser, StopReason, Termination};
use crate::error::{OptimiseError, Result};
use crate::island::{Coordinator, SingleProcess};
use crate::problem::Problem;
use crate::rng::RandomNumberGenerator;
use crate::stopwatch::Stopwatch;
use crate::trace::TraceWriter;

pub mod options;
pub mod particle;
pub mod swarm;
pub mod topology;

pub use options::{Initialisation, SwarmOptions, SwarmOptionsBuilder};
pub use particle::{Coefficients, Particle};
pub use swarm::{Migration, Swarm};
pub use topology::{Topology, TopologyUpdate};

/// Runs a particle swarm, optionally as one island of a group.
#[derive(Debug, Clone)]
pub struct ParallelSwarmSearch {
    options: SwarmOptions,
    termination: Termination,
    coordinator: Arc<dyn Coordinator>,
}

impl ParallelSwarmSearch {
    /// Creates a standalone optimiser.
    ///
    /// # Arguments
    ///
    /// * `options` - The swarm configuration, validated when `optimise` is called.
    /// * `termination` - The stopping criteria.
    pub fn new(options: SwarmOptions, termination: Termination) -> Self {
        Self {
            options,
            termination,
            coordinator: Arc::new(SingleProcess),
        }
    }

    /// Makes this optimiser one island of the group behind `coordinator`.
    ///
    /// Every island of the group must use the same options apart from the
    /// thread count, and call `optimise` on the same problem.
    pub fn with_coordinator(mut self, coordinator: Arc<dyn Coordinator>) -> Self {
        self.coordinator = coordinator;
        self
    }

    pub fn options(&self) -> &SwarmOptions {
        &self.options
    }

    pub fn coordinator(&self) -> &dyn Coordinator {
        self.coordinator.as_ref()
    }

    /// Decides whether to stop after the current iteration.
    ///
    /// Islands agree on the decision every iteration, so they keep calling the
    /// same collectives in the same order and all stop together. An island that
    /// stops only because another island met a criterion reports
    /// [`StopReason::Peer`].
    fn should_stop(&self, result: &OptimiseResult) -> Result<Option<StopReason>> {
        let reason = self.termination.check(result);
        if self.coordinator.size() <= 1 {
            return Ok(reason);
        }
        let any = self.coordinator.reduce_any(reason.is_some())?;
        Ok(match reason {
            Some(reason) => Some(reason),
            None if any => Some(StopReason::Peer),
            None => None,
        })
    }

    /// Validates the options, opens the trace and initialises the swarm.
    fn prepare<'p>(
        &self,
        problem: &'p dyn Problem,
        rank: usize,
    ) -> Result<(Option<TraceWriter<BufWriter<File>>>, Swarm<'p>)> {
        self.options.validate()?;

        let seed = self
            .options
            .seed()
            .unwrap_or_else(|| RandomNumberGenerator::new().next_seed());
        let trace = match self.options.trace_path() {
            Some(path) => Some(TraceWriter::create(&trace_path_for(
                path,
                rank,
                self.coordinator.size(),
            ))?),
            None => None,
        };
        let swarm = Swarm::new(problem, &self.options, seed, rank)?;
        Ok((trace, swarm))
    }
}

/// The trace file of island `rank`: `path` itself for a lone swarm, otherwise
/// `path` with `.<rank>` appended so islands never share a file.
fn trace_path_for(path: &Path, rank: usize, size: usize) -> PathBuf {
    if size <= 1 {
        return path.to_path_buf();
    }
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}", rank));
    path.with_file_name(name)
}

impl Default for ParallelSwarmSearch {
    fn default() -> Self {
        Self::new(SwarmOptions::default(), Termination::default())
    }
}

impl Optimiser for ParallelSwarmSearch {
    fn name(&self) -> &str {
        "Parallel Swarm Search"
    }

    fn termination(&self) -> &Termination {
        &self.termination
    }

    /// Minimises `problem`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The options are invalid (before any evaluation)
    /// - The worker pool cannot be built
    /// - The trace file cannot be written
    /// - The coordinator fails during an island synchronisation
    /// - Another island of the group failed to start
    fn optimise(&self, problem: &dyn Problem) -> Result<OptimiseResult> {
        let rank = self.coordinator.rank();
        let span = info_span!(
            "optimise",
            optimiser = self.name(),
            dimension = problem.dimension(),
            swarm_size = self.options.swarm_size(),
            rank
        );
        let _entered = span.enter();

        let stopwatch = Stopwatch::start();
        let prepared = self.prepare(problem, rank);

        let islands = self.coordinator.size() > 1;
        if islands {
            // A failed island never reaches the main loop; release the others.
            let failed = self.coordinator.reduce_any(prepared.is_err())?;
            if failed && prepared.is_ok() {
                return Err(OptimiseError::Communication(
                    "Another island failed to start".to_string(),
                ));
            }
        }
        let (mut trace, mut swarm) = prepared?;

        let mut result = OptimiseResult::new(problem.dimension(), self.termination.acceptable_fitness());
        let interval = self.options.migration_interval();

        loop {
            if islands && swarm.iterations() % interval == 0 {
                swarm.migrate(self.coordinator.as_ref())?;
            }

            result.record(swarm.best_position(), swarm.best_fitness());
            result.iterations = swarm.iterations();
            result.evaluations = swarm.evaluations();
            result.duration = stopwatch.elapsed();

            if let Some(trace) = trace.as_mut() {
                trace.record(&result)?;
            }

            if let Some(reason) = self.should_stop(&result)? {
                debug!(%reason, iterations = result.iterations, "stopping");
                result.stop_reason = Some(reason);
                break;
            }

            swarm.step();
        }

        if let Some(trace) = trace {
            trace.finish()?;
        }

        info!(
            best_fitness = result.best_fitness,
            iterations = result.iterations,
            evaluations = result.evaluations,
            solved = result.solved(),
            "optimisation finished"
        );
        Ok(result)
    }
}
