//! # Particle
//!
//! One member of the swarm: its position, velocity and the best position it has
//! ever visited, plus the random stream it draws from. A particle is only ever
//! mutated by the worker thread that currently owns it.

use crate::optimiser::is_improvement;
use crate::problem::Problem;
use crate::rng::RandomNumberGenerator;

/// The coefficients of the velocity update, copied out of the swarm options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub inertia: f64,
    /// Upper limit of the random pull towards the personal best.
    pub cognitive_acceleration: f64,
    /// Upper limit of the random pull towards the best informant.
    pub social_acceleration: f64,
}

#[derive(Debug, Clone)]
pub struct Particle {
    position: Vec<f64>,
    velocity: Vec<f64>,
    personal_best_position: Vec<f64>,
    personal_best_fitness: f64,
    rng: RandomNumberGenerator,
}

impl Particle {
    /// Places a particle at `normalised_position` (mapped into the problem bounds)
    /// and evaluates it once.
    ///
    /// The initial velocity is drawn per dimension from `[lower − x, upper − x]`,
    /// so that a first step cannot overshoot the search space by more than its span.
    /// A non-finite initial fitness is stored as `+∞`.
    pub fn new(
        problem: &dyn Problem,
        normalised_position: &[f64],
        mut rng: RandomNumberGenerator,
    ) -> Self {
        let bounds = problem.bounds();
        let position = bounds.denormalise(normalised_position);
        let velocity = position
            .iter()
            .zip(bounds.lower().iter().zip(bounds.upper()))
            .map(|(x, (lower, upper))| rng.uniform_in_range(lower - x, upper - x))
            .collect();

        let fitness = problem.evaluate(&position);

        Self {
            personal_best_position: position.clone(),
            personal_best_fitness: if fitness.is_finite() {
                fitness
            } else {
                f64::INFINITY
            },
            position,
            velocity,
            rng,
        }
    }

    pub fn position(&self) -> &[f64] {
        &self.position
    }

    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    pub fn personal_best_position(&self) -> &[f64] {
        &self.personal_best_position
    }

    pub fn personal_best_fitness(&self) -> f64 {
        self.personal_best_fitness
    }

    /// Moves the particle once and evaluates its new position.
    ///
    /// `informant` is the personal best position of the best particle informing
    /// this one, or `None` if no informant is better than the particle itself.
    ///
    /// Returns `true` if the personal best improved.
    pub fn update(
        &mut self,
        problem: &dyn Problem,
        coefficients: &Coefficients,
        informant: Option<&[f64]>,
    ) -> bool {
        let cognitive = self
            .rng
            .uniform_in_range(0.0, coefficients.cognitive_acceleration);
        let personal_attraction = displace(&self.position, &self.personal_best_position, cognitive);

        let social_attraction = informant.map(|informant| {
            let social = self
                .rng
                .uniform_in_range(0.0, coefficients.social_acceleration);
            displace(&self.position, informant, social)
        });

        let center = attraction_center(
            &self.position,
            &personal_attraction,
            social_attraction.as_deref(),
        );
        let radius = distance(&center, &self.position);
        let perturbed_center = self.rng.random_neighbour(&center, 0.0, radius);

        for (k, velocity) in self.velocity.iter_mut().enumerate() {
            *velocity = coefficients.inertia * *velocity + perturbed_center[k] - self.position[k];
        }

        self.advance(problem);

        let fitness = problem.evaluate(&self.position);
        if is_improvement(fitness, self.personal_best_fitness) {
            self.personal_best_position.clone_from(&self.position);
            self.personal_best_fitness = fitness;
            true
        } else {
            false
        }
    }

    /// Overwrites the particle's position and personal best with a migrant.
    ///
    /// The velocity is kept, so the particle continues its own search from the
    /// migrant's position.
    pub fn adopt(&mut self, position: &[f64], fitness: f64) {
        self.position.clear();
        self.position.extend_from_slice(position);
        self.personal_best_position.clear();
        self.personal_best_position.extend_from_slice(position);
        self.personal_best_fitness = fitness;
    }

    /// Applies the velocity and reflects every component leaving the bounds.
    ///
    /// A clamped component has its velocity inverted and halved.
    fn advance(&mut self, problem: &dyn Problem) {
        let bounds = problem.bounds();
        for k in 0..self.position.len() {
            self.position[k] += self.velocity[k];

            let (lower, upper) = (bounds.lower()[k], bounds.upper()[k]);
            if self.position[k] < lower {
                self.position[k] = lower;
                self.velocity[k] *= -0.5;
            } else if self.position[k] > upper {
                self.position[k] = upper;
                self.velocity[k] *= -0.5;
            } else if self.position[k].is_nan() {
                self.position[k] = lower + 0.5 * (upper - lower);
                self.velocity[k] = 0.0;
            }
        }
    }
}

/// Returns `from + fraction · (towards − from)`.
fn displace(from: &[f64], towards: &[f64], fraction: f64) -> Vec<f64> {
    from.iter()
        .zip(towards)
        .map(|(f, t)| f + fraction * (t - f))
        .collect()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// The centre the next move is drawn around.
///
/// Without a social attraction (the particle is its own best informant) this is
/// the midpoint of the position and the personal attraction point, otherwise the
/// mean of the position and both attraction points.
pub(crate) fn attraction_center(
    position: &[f64],
    personal_attraction: &[f64],
    social_attraction: Option<&[f64]>,
) -> Vec<f64> {
    match social_attraction {
        None => position
            .iter()
            .zip(personal_attraction)
            .map(|(x, p)| 0.5 * (x + p))
            .collect(),
        Some(social_attraction) => position
            .iter()
            .zip(personal_attraction.iter().zip(social_attraction))
            .map(|(x, (p, l))| (x + p + l) / 3.0)
            .collect(),
    }
}
