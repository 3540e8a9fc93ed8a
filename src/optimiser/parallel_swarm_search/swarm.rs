//! # Swarm
//!
//! The particles of one island, their topology, and the swarm's best solution.
//!
//! One [`Swarm::step`] is one generation: every particle moves once. Particles
//! are split into contiguous chunks that run on the worker pool. Each particle
//! picks its informant from a snapshot of all personal bests taken before the
//! phase, so no particle ever observes a value written in the same generation.
//! The swarm's best solution is the only state shared between workers; it sits
//! behind a mutex that is held for the comparison and copy only, never during
//! an evaluation.

use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{debug, trace};

use super::options::{Initialisation, SwarmOptions};
use super::particle::{Coefficients, Particle};
use super::topology::{Topology, TopologyUpdate};
use crate::error::{OptimiseError, OptionExt, Result};
use crate::island::Coordinator;
use crate::optimiser::is_improvement;
use crate::problem::Problem;
use crate::rng::{derive_seed, RandomNumberGenerator};

/// The swarm's best solution and whether it improved during the current generation.
#[derive(Debug, Clone, Default)]
struct SharedBest {
    position: Vec<f64>,
    fitness: f64,
    /// Index of the particle the position was taken from.
    holder: usize,
    changed: bool,
}

impl SharedBest {
    /// Takes over `position` if it is strictly better, or equally good and
    /// offered by a lower particle index. The result does not depend on the
    /// order in which workers make their offers.
    fn offer(&mut self, particle: usize, position: &[f64], fitness: f64) {
        let improved = is_improvement(fitness, self.fitness);
        if improved || (fitness == self.fitness && particle < self.holder) {
            self.position.clear();
            self.position.extend_from_slice(position);
            self.fitness = fitness;
            self.holder = particle;
            self.changed |= improved;
        }
    }
}

/// The outcome of one island synchronisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Migration {
    /// This island held the group's best solution and sent it.
    Sent { fitness: f64 },
    /// This island received the group's best solution from `owner` and
    /// overwrote its worst particle, at index `replaced`, with it.
    Received {
        owner: usize,
        fitness: f64,
        replaced: usize,
    },
}

pub struct Swarm<'p> {
    problem: &'p dyn Problem,
    coefficients: Coefficients,
    neighbourhood_probability: f64,
    particles: Vec<Particle>,
    topology: Topology,
    /// Draws topologies; only used on the thread driving the swarm.
    rng: RandomNumberGenerator,
    best: SharedBest,
    best_improved: bool,
    iterations: usize,
    pool: Option<ThreadPool>,
}

impl<'p> Swarm<'p> {
    /// Creates and evaluates the particles of island `rank`.
    ///
    /// Every particle gets its own random stream derived from `seed`, `rank` and
    /// its index, so a run is reproducible regardless of the number of threads.
    /// Costs `options.swarm_size()` evaluations; afterwards `iterations()` is 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid or the thread pool cannot be built.
    pub fn new(
        problem: &'p dyn Problem,
        options: &SwarmOptions,
        seed: u64,
        rank: usize,
    ) -> Result<Self> {
        options.validate()?;

        let pool = build_pool(options.threads())?;
        let island_seed = derive_seed(seed, rank as u64);
        let mut rng = RandomNumberGenerator::for_stream(island_seed, 0);

        let swarm_size = options.swarm_size();
        let starting_positions = match options.initialisation() {
            Initialisation::Uniform => problem.normalised_random_agents(swarm_size, &mut rng),
            Initialisation::Hammersley => problem.normalised_hammersley_agents(swarm_size),
            Initialisation::Mixed => problem.initialise_normalised_agents(swarm_size, &mut rng),
        };

        let create = |(n, position): (usize, &Vec<f64>)| {
            Particle::new(
                problem,
                position,
                RandomNumberGenerator::for_stream(island_seed, n as u64 + 1),
            )
        };
        let particles: Vec<Particle> = match &pool {
            Some(pool) => pool.install(|| starting_positions.par_iter().enumerate().map(create).collect()),
            None => starting_positions.iter().enumerate().map(create).collect(),
        };

        let first = particles
            .first()
            .ok_or_else_optimise(|| OptimiseError::EmptySwarm)?;
        let mut best = SharedBest {
            position: first.personal_best_position().to_vec(),
            fitness: f64::INFINITY,
            holder: 0,
            changed: false,
        };
        for (n, particle) in particles.iter().enumerate() {
            best.offer(n, particle.personal_best_position(), particle.personal_best_fitness());
        }
        best.changed = false;

        let neighbourhood_probability = options.neighbourhood_probability();
        let topology = Topology::random(swarm_size, neighbourhood_probability, &mut rng);

        debug!(
            rank,
            swarm_size,
            threads = pool.as_ref().map_or(1, |pool| pool.current_num_threads()),
            best_fitness = best.fitness,
            "swarm initialised"
        );

        Ok(Self {
            problem,
            coefficients: Coefficients {
                inertia: options.inertia(),
                cognitive_acceleration: options.cognitive_acceleration(),
                social_acceleration: options.social_acceleration(),
            },
            neighbourhood_probability,
            particles,
            topology,
            rng,
            best,
            // The initial topology is fresh; keep it for the first generation.
            best_improved: true,
            iterations: 1,
            pool,
        })
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// The number of generations so far, counting initialisation as the first.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Every particle is evaluated exactly once per generation.
    pub fn evaluations(&self) -> usize {
        self.iterations.saturating_mul(self.particles.len())
    }

    pub fn best_fitness(&self) -> f64 {
        self.best.fitness
    }

    pub fn best_position(&self) -> &[f64] {
        &self.best.position
    }

    /// Whether the last generation (or migration) improved the swarm's best.
    pub fn best_improved(&self) -> bool {
        self.best_improved
    }

    /// Decides what happens to the topology before the next generation.
    pub fn next_topology_update(&self) -> TopologyUpdate {
        TopologyUpdate::after(self.best_improved)
    }

    /// Replaces the topology with a freshly drawn one.
    pub fn regenerate_topology(&mut self) {
        self.topology = Topology::random(
            self.particles.len(),
            self.neighbourhood_probability,
            &mut self.rng,
        );
    }

    /// Runs one generation and returns whether the swarm's best improved.
    pub fn step(&mut self) -> bool {
        if self.next_topology_update() == TopologyUpdate::Regenerate {
            self.regenerate_topology();
            trace!(iteration = self.iterations + 1, "topology regenerated");
        }

        let fitness_snapshot: Vec<f64> = self
            .particles
            .iter()
            .map(Particle::personal_best_fitness)
            .collect();
        let position_snapshot: Vec<Vec<f64>> = self
            .particles
            .iter()
            .map(|particle| particle.personal_best_position().to_vec())
            .collect();

        let problem = self.problem;
        let coefficients = self.coefficients;
        let topology = &self.topology;
        let shared = Mutex::new(std::mem::take(&mut self.best));
        let best = &shared;

        let update_chunk = |(chunk_index, chunk): (usize, &mut [Particle]), chunk_size: usize| {
            for (offset, particle) in chunk.iter_mut().enumerate() {
                let n = chunk_index * chunk_size + offset;
                let informant = topology
                    .best_informant(n, &fitness_snapshot)
                    .map(|m| position_snapshot[m].as_slice());

                if particle.update(problem, &coefficients, informant) {
                    let mut best = best.lock().unwrap_or_else(PoisonError::into_inner);
                    best.offer(
                        n,
                        particle.personal_best_position(),
                        particle.personal_best_fitness(),
                    );
                }
            }
        };

        match &self.pool {
            Some(pool) => {
                let chunk_size = self
                    .particles
                    .len()
                    .div_ceil(pool.current_num_threads())
                    .max(1);
                let particles = &mut self.particles;
                pool.install(|| {
                    particles
                        .par_chunks_mut(chunk_size)
                        .enumerate()
                        .for_each(|chunk| update_chunk(chunk, chunk_size));
                });
            }
            None => {
                let chunk_size = self.particles.len();
                update_chunk((0, self.particles.as_mut_slice()), chunk_size);
            }
        }

        self.best = shared.into_inner().unwrap_or_else(PoisonError::into_inner);
        self.iterations += 1;

        let improved = std::mem::replace(&mut self.best.changed, false);
        if improved {
            trace!(
                iteration = self.iterations,
                fitness = self.best_fitness(),
                "swarm best improved"
            );
        }
        self.best_improved = improved;
        improved
    }

    /// Exchanges the best solution with the other islands of `coordinator`.
    ///
    /// Every island learns the group's best fitness and its owner; the owner
    /// broadcasts its position. Every other island overwrites its worst particle
    /// (highest personal best fitness, lowest index on ties) with it.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinator fails or delivers a position of the
    /// wrong dimension.
    pub fn migrate(&mut self, coordinator: &dyn Coordinator) -> Result<Migration> {
        let rank = coordinator.rank();
        let (fitness, owner) = coordinator.reduce_min_with_owner(self.best_fitness())?;

        let mut payload = if rank == owner {
            self.best_position().to_vec()
        } else {
            Vec::new()
        };
        coordinator.broadcast_from(owner, &mut payload)?;

        if rank == owner {
            debug!(rank, fitness, "sent best solution to other islands");
            return Ok(Migration::Sent { fitness });
        }

        let dimension = self.problem.dimension();
        if payload.len() != dimension {
            return Err(OptimiseError::DimensionMismatch {
                expected: dimension,
                actual: payload.len(),
            });
        }

        let replaced = worst_particle(&self.particles);
        self.particles[replaced].adopt(&payload, fitness);

        self.best.offer(replaced, &payload, fitness);
        let improved = std::mem::replace(&mut self.best.changed, false);
        self.best_improved |= improved;

        debug!(rank, owner, fitness, replaced, "received best solution");
        Ok(Migration::Received {
            owner,
            fitness,
            replaced,
        })
    }
}

/// Index of the particle with the highest personal best fitness; lowest index on ties.
fn worst_particle(particles: &[Particle]) -> usize {
    let mut worst = 0;
    for (n, particle) in particles.iter().enumerate().skip(1) {
        if particle.personal_best_fitness() > particles[worst].personal_best_fitness() {
            worst = n;
        }
    }
    worst
}

/// Builds the worker pool; `None` runs updates on the calling thread.
fn build_pool(threads: usize) -> Result<Option<ThreadPool>> {
    if threads == 1 {
        return Ok(None);
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|index| format!("swarm-worker-{}", index))
        .build()?;
    Ok(Some(pool))
}
