use crate::error::{ConfigError, Result};

/// Largest capacity of a Tokio bounded channel. Its semaphore panics above
/// `usize::MAX >> 3` permits.
pub const MAX_QUEUE_CAPACITY: usize = usize::MAX >> 3;

/// Largest worker pool. The work queue holds one slot per worker and is
/// allocated when the pool starts.
pub const MAX_CONCURRENCY: usize = 1 << 16;

/// Sizing for a single pipeline run.
///
/// Both values are fixed for the lifetime of a [`Pipeline`]: the worker pool
/// is never resized and the queues are never reallocated.
///
/// [`Pipeline`]: crate::Pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    item_count: usize,
    concurrency_size: usize,
}

impl PipelineConfig {
    /// Validates and builds a configuration.
    ///
    /// `item_count` is the number of items the source is expected to emit and
    /// sizes the output queue. Zero is allowed and describes an empty run.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroConcurrency`] if `concurrency_size` is zero.
    /// - [`ConfigError::ConcurrencyTooLarge`] if `concurrency_size` is above
    ///   [`MAX_CONCURRENCY`].
    /// - [`ConfigError::ItemCountTooLarge`] if `item_count` is above
    ///   [`MAX_QUEUE_CAPACITY`].
    pub const fn new(item_count: usize, concurrency_size: usize) -> Result<Self> {
        if concurrency_size == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if concurrency_size > MAX_CONCURRENCY {
            return Err(ConfigError::ConcurrencyTooLarge {
                max: MAX_CONCURRENCY,
            });
        }
        if item_count > MAX_QUEUE_CAPACITY {
            return Err(ConfigError::ItemCountTooLarge {
                max: MAX_QUEUE_CAPACITY,
            });
        }

        Ok(Self {
            item_count,
            concurrency_size,
        })
    }

    pub const fn item_count(&self) -> usize {
        self.item_count
    }

    /// Number of workers in the pool.
    pub const fn concurrency_size(&self) -> usize {
        self.concurrency_size
    }

    /// Capacity of the queue between the dispatcher and the workers.
    ///
    /// Equal to the worker count, so at most one item per worker is waiting
    /// while the others are in flight.
    pub const fn work_capacity(&self) -> usize {
        self.concurrency_size
    }

    /// Capacity of the queue between the workers and the sink.
    ///
    /// Bounded channels need room for at least one message, so an empty run
    /// still gets a capacity of 1.
    pub const fn output_capacity(&self) -> usize {
        if self.item_count == 0 {
            1
        } else {
            self.item_count
        }
    }
}
