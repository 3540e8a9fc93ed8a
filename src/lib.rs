pub mod error;
pub mod island;
pub mod optimiser;
pub mod problem;
pub mod rng;
#[cfg(feature = "serde")]
pub(crate) mod serde_float;
pub mod stopwatch;
pub mod trace;

// Re-export commonly used types for convenience
pub use error::{OptimiseError, OptionExt, Result, ResultExt};
pub use optimiser::{OptimiseResult, Optimiser, ParallelSwarmSearch, SwarmOptions, Termination};
pub use problem::{Bounds, Problem};
