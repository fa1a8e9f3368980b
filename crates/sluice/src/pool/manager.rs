//! Fixed-size pool of asynchronous transform workers.
//!
//! This module defines the [`WorkerPool`] struct, which spawns exactly
//! `concurrency_size` workers once, before any item flows, and tears them
//! down exactly once through [`WorkerPool::join`].
//!
//! All workers share one multi-consumer work queue, so whichever worker is
//! free takes the next item. There is no per-worker queue to balance and no
//! resizing.

use super::worker::worker_loop;
use crate::{latch::ErrorLatch, transform::Transform};
use core::any::Any;
use portable_atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};

/// Pool-wide totals updated by the workers.
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    processed: AtomicUsize,
    failed: AtomicUsize,
}

impl PoolCounters {
    pub(crate) fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of items transformed successfully.
    pub(crate) fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    /// Number of transform calls that returned an error, including errors
    /// discarded by the latch.
    pub(crate) fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Outcome of [`WorkerPool::join`].
pub struct PoolSummary {
    pub processed: usize,
    pub failed: usize,
    /// Payload of the first worker panic, if any worker panicked.
    pub panic: Option<Box<dyn Any + Send + 'static>>,
}

/// A fixed set of workers pulling from a shared bounded work queue.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    counters: Arc<PoolCounters>,
}

impl WorkerPool {
    /// Spawns `size` workers on the current Tokio runtime.
    ///
    /// Each worker gets its own clone of `work_rx` and `out_tx`. The caller
    /// keeps the original `out_tx` and must only drop it after
    /// [`WorkerPool::join`] has returned.
    pub fn spawn<I, T>(
        size: usize,
        work_rx: &async_channel::Receiver<I>,
        out_tx: &mpsc::Sender<T::Output>,
        transform: &Arc<T>,
        latch: &Arc<ErrorLatch<T::Error>>,
    ) -> Self
    where
        I: Send + 'static,
        T: Transform<I>,
    {
        let counters = Arc::new(PoolCounters::default());

        let handles = (0..size)
            .map(|worker_id| {
                tokio::spawn(worker_loop(
                    worker_id,
                    work_rx.clone(),
                    out_tx.clone(),
                    Arc::clone(transform),
                    Arc::clone(latch),
                    Arc::clone(&counters),
                ))
            })
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!("Spawned {size} workers");

        Self { handles, counters }
    }

    /// Number of workers in the pool.
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every worker to stop.
    ///
    /// This is a barrier with no timeout: it returns only once every worker
    /// task has finished, including any transform still in flight. Workers
    /// stop on their own once the work queue is closed or the latch is
    /// tripped, so the caller must do one of those first.
    pub async fn join(self) -> PoolSummary {
        let mut panic = None;

        for (_worker_id, res) in futures::future::join_all(self.handles)
            .await
            .into_iter()
            .enumerate()
        {
            match res {
                Ok(()) => {}
                Err(e) if e.is_panic() => {
                    #[cfg(feature = "tracing")]
                    tracing::error!("Worker {_worker_id} panicked");
                    if panic.is_none() {
                        panic = Some(e.into_panic());
                    }
                }
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("Worker {_worker_id} was cancelled: {_e}");
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("All workers joined");

        PoolSummary {
            processed: self.counters.processed(),
            failed: self.counters.failed(),
            panic,
        }
    }
}
