//! Worker pool and worker task.
//!
//! ## Structure
//!
//! - [`manager`] - [`WorkerPool`]: spawns the fixed set of workers and joins
//!   them at shutdown.
//! - `worker` - the per-worker loop that pulls, transforms and pushes.

pub mod manager;
mod worker;

pub use manager::{PoolSummary, WorkerPool};

#[cfg(test)]
mod tests;
