//! # RandomNumberGenerator
//!
//! The `RandomNumberGenerator` struct wraps the `rand` crate's `StdRng` and provides
//! the handful of draws the optimisers need: uniform reals in a range, uniform
//! indices, and points distributed uniformly on a spherical shell around a centre.
//!
//! ## Example
//!
//! ```rust
//! use swarmsearch::rng::RandomNumberGenerator;
//!
//! let mut rng = RandomNumberGenerator::from_seed(42);
//! let x = rng.uniform_in_range(-1.0, 1.0);
//! assert!((-1.0..=1.0).contains(&x));
//!
//! let neighbour = rng.random_neighbour(&[0.0, 0.0], 1.0, 2.0);
//! let distance = neighbour.iter().map(|v| v * v).sum::<f64>().sqrt();
//! assert!((1.0..=2.0 + 1e-12).contains(&distance));
//! ```
//!
//! ## Independent streams
//!
//! Generators are never shared between threads. Instead, every consumer that runs
//! inside a parallel region owns its own generator derived from a master seed and
//! a stream index:
//!
//! ```rust
//! use swarmsearch::rng::RandomNumberGenerator;
//!
//! let mut a = RandomNumberGenerator::for_stream(7, 0);
//! let mut b = RandomNumberGenerator::for_stream(7, 1);
//! assert_ne!(a.uniform_in_range(0.0, 1.0), b.uniform_in_range(0.0, 1.0));
//! ```

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Mixes `x` into a well-distributed 64 bit value (SplitMix64 finaliser).
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Derives the seed of stream `stream` from `master`.
///
/// Equal inputs always give equal seeds; neighbouring stream indices give
/// unrelated seeds.
pub fn derive_seed(master: u64, stream: u64) -> u64 {
    splitmix64(master ^ splitmix64(stream))
}

/// A wrapper around the `rand` crate's `StdRng`.
#[derive(Clone, Debug)]
pub struct RandomNumberGenerator {
    pub rng: StdRng,
}

impl RandomNumberGenerator {
    /// Creates a new `RandomNumberGenerator` instance seeded from the system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a new `RandomNumberGenerator` instance with a specific seed.
    ///
    /// This is useful for reproducible tests and benchmarks.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates the generator for stream `stream` of the master seed `master`.
    ///
    /// # Arguments
    ///
    /// * `master` - The seed shared by all streams of one run.
    /// * `stream` - The index of the stream, e.g. a particle index.
    pub fn for_stream(master: u64, stream: u64) -> Self {
        Self::from_seed(derive_seed(master, stream))
    }

    /// Draws a fresh 64 bit seed, e.g. to become the master seed of a run.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.gen()
    }

    /// Returns a uniformly drawn number in `[min, max]`.
    ///
    /// Returns `min` if the range is empty (`min >= max`).
    pub fn uniform_in_range(&mut self, min: f64, max: f64) -> f64 {
        if min < max {
            self.rng.gen_range(min..=max)
        } else {
            min
        }
    }

    /// Returns `true` with probability `probability`.
    pub fn chance(&mut self, probability: f64) -> bool {
        if probability >= 1.0 {
            true
        } else if probability <= 0.0 {
            false
        } else {
            self.rng.gen_bool(probability)
        }
    }

    /// Returns a uniformly drawn index in `[0, upper)`.
    ///
    /// # Panics
    ///
    /// Panics if `upper` is zero.
    pub fn uniform_index(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }

    /// Returns a direction drawn uniformly from the surface of the unit sphere
    /// in `dimension` dimensions.
    ///
    /// Normalising a vector of independent standard normal samples gives a
    /// rotation invariant direction (Muller, 1959).
    pub fn unit_direction(&mut self, dimension: usize) -> Vec<f64> {
        if dimension == 0 {
            return Vec::new();
        }
        loop {
            let direction: Vec<f64> = (0..dimension)
                .map(|_| self.rng.sample::<f64, _>(StandardNormal))
                .collect();
            let norm = direction.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > f64::MIN_POSITIVE {
                return direction.into_iter().map(|v| v / norm).collect();
            }
        }
    }

    /// Returns a point distributed uniformly in direction around `center`, with a
    /// distance to `center` drawn uniformly from `[minimal_distance, maximal_distance]`.
    pub fn random_neighbour(
        &mut self,
        center: &[f64],
        minimal_distance: f64,
        maximal_distance: f64,
    ) -> Vec<f64> {
        debug_assert!(0.0 <= minimal_distance && minimal_distance <= maximal_distance);

        let length = self.uniform_in_range(minimal_distance, maximal_distance);
        self.unit_direction(center.len())
            .into_iter()
            .zip(center)
            .map(|(direction, c)| c + direction * length)
            .collect()
    }
}

impl Default for RandomNumberGenerator {
    fn default() -> Self {
        Self::new()
    }
}
