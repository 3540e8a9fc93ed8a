//! # Topology
//!
//! The directed "who informs whom" graph of a swarm. Particle `n` may use the
//! personal best of any of its informants to steer its next move.
//!
//! The random topology follows Clerc's "Method 2": every directed edge exists
//! independently with a fixed probability. A particle never informs itself,
//! since its own personal best is always considered first.

use crate::rng::RandomNumberGenerator;

/// What to do with the topology at the start of an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyUpdate {
    /// Keep the current graph, so a successful search direction persists.
    Persist,
    /// Draw a new random graph.
    Regenerate,
}

impl TopologyUpdate {
    /// Regenerate after an iteration that failed to improve the swarm's best.
    pub fn after(best_improved: bool) -> Self {
        if best_improved {
            TopologyUpdate::Persist
        } else {
            TopologyUpdate::Regenerate
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    /// `informants[n]` lists, in ascending order, every particle informing `n`.
    informants: Vec<Vec<usize>>,
}

impl Topology {
    /// Draws a random topology where each edge exists with `probability`.
    pub fn random(size: usize, probability: f64, rng: &mut RandomNumberGenerator) -> Self {
        let informants = (0..size)
            .map(|n| {
                (0..size)
                    .filter(|&m| m != n && rng.chance(probability))
                    .collect()
            })
            .collect();
        Self { informants }
    }

    /// Every particle informs every other particle.
    pub fn fully_connected(size: usize) -> Self {
        let informants = (0..size)
            .map(|n| (0..size).filter(|&m| m != n).collect())
            .collect();
        Self { informants }
    }

    pub fn size(&self) -> usize {
        self.informants.len()
    }

    pub fn informants(&self, particle: usize) -> &[usize] {
        &self.informants[particle]
    }

    /// Returns `true` if `informant` informs `particle`.
    pub fn informs(&self, informant: usize, particle: usize) -> bool {
        self.informants[particle].binary_search(&informant).is_ok()
    }

    pub fn has_self_loops(&self) -> bool {
        self.informants
            .iter()
            .enumerate()
            .any(|(n, informants)| informants.contains(&n))
    }

    /// Returns the informant of `particle` with the lowest personal best fitness,
    /// or `None` if no informant is strictly better than `particle` itself.
    ///
    /// Ties between informants go to the lowest index.
    pub fn best_informant(&self, particle: usize, personal_best_fitness: &[f64]) -> Option<usize> {
        let mut best: Option<usize> = None;
        let mut best_fitness = personal_best_fitness[particle];
        for &informant in &self.informants[particle] {
            if personal_best_fitness[informant] < best_fitness {
                best = Some(informant);
                best_fitness = personal_best_fitness[informant];
            }
        }
        best
    }
}
