//! # Error Types
//!
//! This module defines the error type shared by every optimiser in the crate.
//!
//! Errors are only raised *before* a run starts (invalid configuration, a
//! malformed problem) or when a collaborator outside the optimiser fails
//! (the thread pool, an island coordinator, the trace file). An objective
//! function returning NaN or infinity is never an error: such values simply
//! fail to improve the best solution found so far.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use swarmsearch::error::{OptimiseError, Result};
//!
//! fn check_swarm_size(swarm_size: usize) -> Result<()> {
//!     if swarm_size == 0 {
//!         return Err(OptimiseError::Configuration(
//!             "Swarm size cannot be zero".to_string(),
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_swarm_size(0).is_err());
//! ```
//!
//! Using the `ResultExt` trait to add context to errors:
//!
//! ```rust
//! use swarmsearch::error::{Result, ResultExt};
//! use std::fs::File;
//!
//! fn open_trace(path: &str) -> Result<File> {
//!     File::create(path).context("Failed to create trace file")
//! }
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use swarmsearch::error::{OptimiseError, OptionExt};
//!
//! fn best_of(values: &[f64]) -> swarmsearch::error::Result<f64> {
//!     values
//!         .iter()
//!         .copied()
//!         .reduce(f64::min)
//!         .ok_or_else_optimise(|| OptimiseError::EmptySwarm)
//! }
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while setting up or running an optimiser.
#[derive(Error, Debug)]
pub enum OptimiseError {
    /// Error that occurs when an invalid configuration is provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error that occurs when a swarm without particles is encountered.
    #[error("Empty swarm error: Cannot operate on a swarm without particles")]
    EmptySwarm,

    /// Error that occurs when a problem's bounds are malformed.
    #[error("Bounds error: {0}")]
    InvalidBounds(String),

    /// Error that occurs when a vector does not match the problem dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Error that occurs when the worker thread pool cannot be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Error that occurs when an island coordinator fails to exchange data.
    #[error("Communication error: {0}")]
    Communication(String),

    /// Error that occurs when an I/O operation fails.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for optimiser operations.
pub type Result<T> = std::result::Result<T, OptimiseError>;

/// Extension trait for Result to add context to errors.
///
/// ## Examples
///
/// ```rust
/// use swarmsearch::error::ResultExt;
/// use std::fs::File;
///
/// fn read_file(path: &str) -> swarmsearch::error::Result<()> {
///     File::open(path).context("Failed to open file")?;
///     Ok(())
/// }
/// ```
pub trait ResultExt<T, E> {
    /// Converts the error to an `OptimiseError` prefixed with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| OptimiseError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, OptimiseError>` using
    /// a closure to generate the error.
    fn ok_or_else_optimise<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> OptimiseError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_optimise<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> OptimiseError,
    {
        self.ok_or_else(err_fn)
    }
}
