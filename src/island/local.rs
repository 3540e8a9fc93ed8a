//! Islands running on threads of a single process.
//!
//! ```rust
//! use std::thread;
//! use swarmsearch::island::{Coordinator, LocalIslands};
//!
//! let handles = LocalIslands::new(3).unwrap();
//! let owners: Vec<(f64, usize)> = thread::scope(|scope| {
//!     let workers: Vec<_> = handles
//!         .iter()
//!         .map(|handle| scope.spawn(move || {
//!             handle.reduce_min_with_owner(10.0 - handle.rank() as f64).unwrap()
//!         }))
//!         .collect();
//!     workers.into_iter().map(|worker| worker.join().unwrap()).collect()
//! });
//! assert!(owners.iter().all(|&owner| owner == (8.0, 2)));
//! ```

use std::sync::{Arc, Barrier, Mutex, MutexGuard};

use tracing::trace;

use super::{min_with_owner, Coordinator};
use crate::error::{OptimiseError, Result};

/// Shared scratch space of one group of local islands.
#[derive(Debug)]
struct Exchange {
    barrier: Barrier,
    values: Mutex<Vec<f64>>,
    flags: Mutex<Vec<bool>>,
    payload: Mutex<Vec<f64>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| OptimiseError::Communication("An island panicked during an exchange".to_string()))
}

/// Creates groups of islands that run as threads of the current process.
#[derive(Debug, Clone, Copy)]
pub struct LocalIslands;

impl LocalIslands {
    /// Creates a group of `size` islands and returns one handle per island,
    /// ordered by rank. Each handle must be used by exactly one thread.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(size: usize) -> Result<Vec<IslandHandle>> {
        if size == 0 {
            return Err(OptimiseError::Configuration(
                "An island group needs at least one island".to_string(),
            ));
        }

        let exchange = Arc::new(Exchange {
            barrier: Barrier::new(size),
            values: Mutex::new(vec![f64::INFINITY; size]),
            flags: Mutex::new(vec![false; size]),
            payload: Mutex::new(Vec::new()),
        });

        Ok((0..size)
            .map(|rank| IslandHandle {
                rank,
                size,
                exchange: Arc::clone(&exchange),
            })
            .collect())
    }
}

/// One island's view of a [`LocalIslands`] group.
#[derive(Debug, Clone)]
pub struct IslandHandle {
    rank: usize,
    size: usize,
    exchange: Arc<Exchange>,
}

impl Coordinator for IslandHandle {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn reduce_min_with_owner(&self, value: f64) -> Result<(f64, usize)> {
        lock(&self.exchange.values)?[self.rank] = value;
        self.exchange.barrier.wait();
        let reduced = min_with_owner(&lock(&self.exchange.values)?);
        // Nobody may write the next round before everyone has read this one.
        self.exchange.barrier.wait();

        trace!(rank = self.rank, fitness = reduced.0, owner = reduced.1, "reduced");
        Ok(reduced)
    }

    fn broadcast_from(&self, owner: usize, payload: &mut Vec<f64>) -> Result<()> {
        if owner >= self.size {
            return Err(OptimiseError::Communication(format!(
                "Cannot broadcast from rank {} in a group of {}",
                owner, self.size
            )));
        }

        if self.rank == owner {
            lock(&self.exchange.payload)?.clone_from(&*payload);
        }
        self.exchange.barrier.wait();
        if self.rank != owner {
            payload.clone_from(&*lock(&self.exchange.payload)?);
        }
        self.exchange.barrier.wait();
        Ok(())
    }

    fn reduce_any(&self, flag: bool) -> Result<bool> {
        lock(&self.exchange.flags)?[self.rank] = flag;
        self.exchange.barrier.wait();
        let any = lock(&self.exchange.flags)?.iter().any(|&flag| flag);
        self.exchange.barrier.wait();
        Ok(any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn run_on_islands<T, F>(size: usize, work: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&IslandHandle) -> T + Sync,
    {
        let handles = LocalIslands::new(size).unwrap();
        thread::scope(|scope| {
            let workers: Vec<_> = handles
                .iter()
                .map(|handle| {
                    let work = &work;
                    scope.spawn(move || work(handle))
                })
                .collect();
            workers
                .into_iter()
                .map(|worker| worker.join().unwrap())
                .collect()
        })
    }

    #[test]
    fn test_empty_group_is_rejected() {
        assert!(LocalIslands::new(0).is_err());
    }

    #[test]
    fn test_ranks_are_ordered() {
        let handles = LocalIslands::new(4).unwrap();
        let ranks: Vec<usize> = handles.iter().map(|handle| handle.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
        assert!(handles.iter().all(|handle| handle.size() == 4));
    }

    #[test]
    fn test_reduce_min_with_owner() {
        let results = run_on_islands(3, |handle| {
            let value = [5.0, 1.0, 1.0][handle.rank()];
            handle.reduce_min_with_owner(value).unwrap()
        });
        assert!(results.iter().all(|&result| result == (1.0, 1)));
    }

    #[test]
    fn test_broadcast_from_owner() {
        let results = run_on_islands(3, |handle| {
            let mut payload = vec![handle.rank() as f64; 2];
            handle.broadcast_from(2, &mut payload).unwrap();
            payload
        });
        assert!(results.iter().all(|payload| payload == &vec![2.0, 2.0]));
    }

    #[test]
    fn test_reduce_any() {
        let results = run_on_islands(3, |handle| handle.reduce_any(handle.rank() == 1).unwrap());
        assert_eq!(results, vec![true, true, true]);

        let results = run_on_islands(2, |handle| handle.reduce_any(false).unwrap());
        assert_eq!(results, vec![false, false]);
    }

    #[test]
    fn test_repeated_rounds_do_not_interfere() {
        let results = run_on_islands(2, |handle| {
            (0..50)
                .map(|round| {
                    let value = (round * 2 + handle.rank()) as f64;
                    handle.reduce_min_with_owner(value).unwrap()
                })
                .collect::<Vec<_>>()
        });
        for (round, reduced) in results[0].iter().enumerate() {
            assert_eq!(*reduced, ((round * 2) as f64, 0));
        }
        assert_eq!(results[0], results[1]);
    }

    #[test]
    fn test_broadcast_rejects_unknown_owner() {
        let handles = LocalIslands::new(1).unwrap();
        let mut payload = vec![1.0];
        assert!(matches!(
            handles[0].broadcast_from(3, &mut payload),
            Err(OptimiseError::Communication(_))
        ));
    }
}
