//! # Island Model
//!
//! In the island model several swarms ("islands") optimise the same problem
//! independently and periodically exchange their best solution. A
//! [`Coordinator`] provides the blocking collectives this needs; every member
//! of a group must call the same collectives in the same order.
//!
//! - [`SingleProcess`]: a group of one, where every collective is a no-op.
//! - [`LocalIslands`]: a group of islands running on threads of one process.
//!
//! Distributed back ends (e.g. over MPI) implement the same trait.

use std::fmt::Debug;

use crate::error::Result;

pub mod local;

pub use local::{IslandHandle, LocalIslands};

/// Collective operations of a group of islands.
///
/// Every operation is a synchronous barrier: it returns only once every member
/// of the group has called it.
pub trait Coordinator: Debug + Send + Sync {
    /// The index of this island in `0..size()`.
    fn rank(&self) -> usize;

    /// The number of islands in the group.
    fn size(&self) -> usize;

    /// Returns the minimum of all contributed values and the rank that
    /// contributed it. Ties go to the lowest rank.
    fn reduce_min_with_owner(&self, value: f64) -> Result<(f64, usize)>;

    /// Replaces `payload` on every island with the payload of `owner`.
    fn broadcast_from(&self, owner: usize, payload: &mut Vec<f64>) -> Result<()>;

    /// Returns `true` on every island if any island contributed `true`.
    fn reduce_any(&self, flag: bool) -> Result<bool>;
}

/// A group consisting of this island only.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleProcess;

impl Coordinator for SingleProcess {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn reduce_min_with_owner(&self, value: f64) -> Result<(f64, usize)> {
        Ok((value, 0))
    }

    fn broadcast_from(&self, _owner: usize, _payload: &mut Vec<f64>) -> Result<()> {
        Ok(())
    }

    fn reduce_any(&self, flag: bool) -> Result<bool> {
        Ok(flag)
    }
}

/// Picks the minimum of `values` and its index, lowest index on ties.
///
/// NaN never wins against a number.
pub(crate) fn min_with_owner(values: &[f64]) -> (f64, usize) {
    let mut owner = 0;
    for (rank, &value) in values.iter().enumerate().skip(1) {
        if value < values[owner] || (values[owner].is_nan() && !value.is_nan()) {
            owner = rank;
        }
    }
    (values[owner], owner)
}
