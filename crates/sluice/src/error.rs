//! Error types for pipeline construction.
//!
//! The pipeline itself never invents run-time error kinds: a run either
//! succeeds or returns the first error produced by the user's transform,
//! unchanged. The only errors owned by this crate are configuration errors,
//! raised before any task is spawned.
//!
//! ## Error Cases
//! - `ZeroConcurrency`: the worker pool would have no workers and no run
//!   could ever make progress.
//! - `ItemCountTooLarge`: the output queue cannot be allocated with that many
//!   slots.
//! - `ConcurrencyTooLarge`: more workers than the pool will spawn. The work
//!   queue is sized from the worker count and allocated up front.

pub type Result<T, E = ConfigError> = core::result::Result<T, E>;

/// Invalid pipeline configuration.
#[derive(Clone, Copy, thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `concurrency_size` was zero.
    #[error("Concurrency size must be greater than 0")]
    ZeroConcurrency,
    /// `item_count` exceeds the largest bounded queue the runtime supports.
    #[error("Item count exceeds the maximum queue capacity (max = {max})")]
    ItemCountTooLarge { max: usize },
    /// `concurrency_size` exceeds the largest supported worker pool.
    #[error("Concurrency size exceeds the maximum worker count (max = {max})")]
    ConcurrencyTooLarge { max: usize },
}
