//! # SwarmOptions
//!
//! The `SwarmOptions` struct holds the configuration of a Parallel Swarm Search
//! run. Options are read-only during a run and validated eagerly when
//! `optimise` is called.
//!
//! ## Example
//!
//! ```rust
//! use swarmsearch::optimiser::parallel_swarm_search::{Initialisation, SwarmOptions};
//!
//! // Defaults from the SPSO 2011 description
//! let options = SwarmOptions::default();
//! assert_eq!(options.swarm_size(), 40);
//! assert!((options.neighbourhood_probability() - (1.0 - (1.0 - 1.0 / 40.0f64).powi(3))).abs() < 1e-15);
//!
//! // A reproducible, single-threaded run
//! let options = SwarmOptions::builder()
//!     .swarm_size(10)
//!     .threads(1)
//!     .seed(42)
//!     .initialisation(Initialisation::Uniform)
//!     .build();
//! assert_eq!(options.migration_interval(), 1);
//! ```
//!
//! ## Fields
//!
//! - `swarm_size`: the number of particles, default `40`.
//! - `inertia`: velocity carried over between iterations, default `1 / (2 ln 2)`.
//! - `cognitive_acceleration`: upper limit of the pull towards the personal best,
//!   default `0.5 + ln 2`.
//! - `social_acceleration`: upper limit of the pull towards the best informant,
//!   default `0.5 + ln 2`.
//! - `neighbourhood_probability`: probability of each informant edge, default
//!   `1 − (1 − 1/swarm_size)³`, derived from the swarm size unless set.
//! - `migration_stall`: iterations skipped between island synchronisations,
//!   default `0` (synchronise every iteration).
//! - `threads`: worker threads for the particle updates; `0` uses every hardware
//!   thread, `1` runs on the calling thread. Default `0`.
//! - `seed`: master seed; `None` seeds from system entropy.
//! - `initialisation`: how starting positions are drawn.
//! - `trace_path`: optional file receiving one line per iteration.

use std::path::{Path, PathBuf};

use crate::error::{OptimiseError, Result};

/// How the starting positions of a swarm are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Initialisation {
    /// Uniformly at random.
    Uniform,
    /// Points of the Hammersley sequence.
    Hammersley,
    /// Half Hammersley points, half uniformly random.
    #[default]
    Mixed,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwarmOptions {
    swarm_size: usize,
    inertia: f64,
    cognitive_acceleration: f64,
    social_acceleration: f64,
    /// `None` derives the probability from the swarm size.
    neighbourhood_probability: Option<f64>,
    migration_stall: usize,
    threads: usize,
    seed: Option<u64>,
    initialisation: Initialisation,
    trace_path: Option<PathBuf>,
}

impl SwarmOptions {
    pub fn new(swarm_size: usize) -> Self {
        Self {
            swarm_size,
            ..Self::default()
        }
    }

    /// Returns a builder for creating a `SwarmOptions` instance.
    pub fn builder() -> SwarmOptionsBuilder {
        SwarmOptionsBuilder::default()
    }

    /// The neighbourhood probability derived from a swarm size (Clerc's method 2,
    /// three informants per particle on average).
    pub fn default_neighbourhood_probability(swarm_size: usize) -> f64 {
        1.0 - (1.0 - 1.0 / swarm_size.max(1) as f64).powi(3)
    }

    pub fn swarm_size(&self) -> usize {
        self.swarm_size
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    pub fn cognitive_acceleration(&self) -> f64 {
        self.cognitive_acceleration
    }

    pub fn social_acceleration(&self) -> f64 {
        self.social_acceleration
    }

    pub fn neighbourhood_probability(&self) -> f64 {
        self.neighbourhood_probability
            .unwrap_or_else(|| Self::default_neighbourhood_probability(self.swarm_size))
    }

    pub fn migration_stall(&self) -> usize {
        self.migration_stall
    }

    /// The number of iterations between two island synchronisations.
    pub fn migration_interval(&self) -> usize {
        self.migration_stall.saturating_add(1)
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn initialisation(&self) -> Initialisation {
        self.initialisation
    }

    pub fn trace_path(&self) -> Option<&Path> {
        self.trace_path.as_deref()
    }

    pub fn set_swarm_size(&mut self, swarm_size: usize) {
        self.swarm_size = swarm_size;
    }

    pub fn set_inertia(&mut self, inertia: f64) {
        self.inertia = inertia;
    }

    pub fn set_cognitive_acceleration(&mut self, value: f64) {
        self.cognitive_acceleration = value;
    }

    pub fn set_social_acceleration(&mut self, value: f64) {
        self.social_acceleration = value;
    }

    /// Sets a fixed neighbourhood probability, or `None` to derive it from the swarm size.
    pub fn set_neighbourhood_probability(&mut self, probability: Option<f64>) {
        self.neighbourhood_probability = probability;
    }

    pub fn set_migration_stall(&mut self, migration_stall: usize) {
        self.migration_stall = migration_stall;
    }

    pub fn set_threads(&mut self, threads: usize) {
        self.threads = threads;
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn set_initialisation(&mut self, initialisation: Initialisation) {
        self.initialisation = initialisation;
    }

    pub fn set_trace_path(&mut self, path: Option<PathBuf>) {
        self.trace_path = path;
    }

    /// Checks every option against its valid range.
    ///
    /// # Errors
    ///
    /// Returns `OptimiseError::Configuration` if the swarm is empty, the
    /// neighbourhood probability is outside `(0, 1]`, or the inertia or an
    /// acceleration is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if self.swarm_size == 0 {
            return Err(OptimiseError::Configuration(
                "Swarm size cannot be zero".to_string(),
            ));
        }

        let probability = self.neighbourhood_probability();
        if !(probability > 0.0 && probability <= 1.0) {
            return Err(OptimiseError::Configuration(format!(
                "Neighbourhood probability must be in (0, 1], got {}",
                probability
            )));
        }

        for (name, value) in [
            ("Inertia", self.inertia),
            ("Cognitive acceleration", self.cognitive_acceleration),
            ("Social acceleration", self.social_acceleration),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(OptimiseError::Configuration(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

impl Default for SwarmOptions {
    fn default() -> Self {
        Self {
            swarm_size: 40,
            inertia: 1.0 / (2.0 * 2f64.ln()),
            cognitive_acceleration: 0.5 + 2f64.ln(),
            social_acceleration: 0.5 + 2f64.ln(),
            neighbourhood_probability: None,
            migration_stall: 0,
            threads: 0,
            seed: None,
            initialisation: Initialisation::default(),
            trace_path: None,
        }
    }
}

/// Builder for `SwarmOptions`.
///
/// Provides a fluent interface for constructing `SwarmOptions` instances.
/// Unset fields take their default values.
#[derive(Debug, Clone, Default)]
pub struct SwarmOptionsBuilder {
    swarm_size: Option<usize>,
    inertia: Option<f64>,
    cognitive_acceleration: Option<f64>,
    social_acceleration: Option<f64>,
    neighbourhood_probability: Option<f64>,
    migration_stall: Option<usize>,
    threads: Option<usize>,
    seed: Option<u64>,
    initialisation: Option<Initialisation>,
    trace_path: Option<PathBuf>,
}

impl SwarmOptionsBuilder {
    pub fn swarm_size(mut self, value: usize) -> Self {
        self.swarm_size = Some(value);
        self
    }

    pub fn inertia(mut self, value: f64) -> Self {
        self.inertia = Some(value);
        self
    }

    pub fn cognitive_acceleration(mut self, value: f64) -> Self {
        self.cognitive_acceleration = Some(value);
        self
    }

    pub fn social_acceleration(mut self, value: f64) -> Self {
        self.social_acceleration = Some(value);
        self
    }

    pub fn neighbourhood_probability(mut self, value: f64) -> Self {
        self.neighbourhood_probability = Some(value);
        self
    }

    pub fn migration_stall(mut self, value: usize) -> Self {
        self.migration_stall = Some(value);
        self
    }

    pub fn threads(mut self, value: usize) -> Self {
        self.threads = Some(value);
        self
    }

    pub fn seed(mut self, value: u64) -> Self {
        self.seed = Some(value);
        self
    }

    pub fn initialisation(mut self, value: Initialisation) -> Self {
        self.initialisation = Some(value);
        self
    }

    pub fn trace_path(mut self, value: impl Into<PathBuf>) -> Self {
        self.trace_path = Some(value.into());
        self
    }

    /// Builds the `SwarmOptions` instance.
    pub fn build(self) -> SwarmOptions {
        let defaults = SwarmOptions::default();
        SwarmOptions {
            swarm_size: self.swarm_size.unwrap_or(defaults.swarm_size),
            inertia: self.inertia.unwrap_or(defaults.inertia),
            cognitive_acceleration: self
                .cognitive_acceleration
                .unwrap_or(defaults.cognitive_acceleration),
            social_acceleration: self
                .social_acceleration
                .unwrap_or(defaults.social_acceleration),
            neighbourhood_probability: self.neighbourhood_probability,
            migration_stall: self.migration_stall.unwrap_or(defaults.migration_stall),
            threads: self.threads.unwrap_or(defaults.threads),
            seed: self.seed,
            initialisation: self.initialisation.unwrap_or(defaults.initialisation),
            trace_path: self.trace_path,
        }
    }
}
