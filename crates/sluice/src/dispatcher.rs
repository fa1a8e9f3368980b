//! Source-driven dispatch loop and coordinated shutdown.
//!
//! The [`Dispatcher`] is the only writer of the work queue and the only
//! component that closes either queue. It pulls items from the source and
//! submits them to the worker pool until the source is exhausted or a worker
//! latches an error, then tears the pipeline down in dependency order:
//!
//! 1. Close the work queue, so idle workers exit once it is drained.
//! 2. Join every worker (blocking barrier, no timeout).
//! 3. Close the output queue, which is now provably writer-free.
//! 4. Read the error latch once and return its value.

use crate::{config::PipelineConfig, latch::ErrorLatch, pool::WorkerPool, transform::Transform};
use core::fmt;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Pipeline lifecycle, as seen by the dispatcher.
///
/// `Running -> {ErrorDetected | SourceExhausted | WorkersLost} -> Draining -> Terminated`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Feeding the work queue; both queues open.
    Running,
    /// A worker latched an error; feeding has stopped.
    ErrorDetected,
    /// The source ended with no error latched.
    SourceExhausted,
    /// Every worker stopped without latching an error, so the work queue
    /// has no readers left. Only reachable when workers panic.
    WorkersLost,
    /// Work queue closed; waiting for workers to finish.
    Draining,
    /// All workers stopped and the output queue is closed.
    Terminated,
}

impl PipelineState {
    /// Whether the lifecycle allows moving from `self` to `next`.
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (
                Self::Running,
                Self::ErrorDetected | Self::SourceExhausted | Self::WorkersLost
            ) | (
                Self::ErrorDetected | Self::SourceExhausted | Self::WorkersLost,
                Self::Draining
            ) | (Self::Draining, Self::Terminated)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::ErrorDetected => write!(f, "error-detected"),
            Self::SourceExhausted => write!(f, "source-exhausted"),
            Self::WorkersLost => write!(f, "workers-lost"),
            Self::Draining => write!(f, "draining"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// Drives a source into a running worker pool and owns its shutdown.
pub struct Dispatcher<I, T: Transform<I>> {
    work_tx: async_channel::Sender<I>,
    out_tx: mpsc::Sender<T::Output>,
    latch: Arc<ErrorLatch<T::Error>>,
    pool: WorkerPool,
    state: PipelineState,
}

impl<I, T> Dispatcher<I, T>
where
    I: Send + 'static,
    T: Transform<I>,
{
    /// Creates the work queue and error latch and starts the worker pool.
    ///
    /// Every worker is running before this returns, so no item can be
    /// submitted to a partially built pool. `out_tx` is the original sender
    /// of the output queue; the dispatcher drops it only after every worker
    /// has stopped.
    pub fn start(
        config: &PipelineConfig,
        transform: Arc<T>,
        out_tx: mpsc::Sender<T::Output>,
    ) -> Self {
        let (work_tx, work_rx) = async_channel::bounded(config.work_capacity());
        let latch = Arc::new(ErrorLatch::new());

        let pool = WorkerPool::spawn(
            config.concurrency_size(),
            &work_rx,
            &out_tx,
            &transform,
            &latch,
        );

        // `work_rx` is dropped here: only workers hold receivers, so a send
        // fails instead of hanging once every worker has exited.
        Self {
            work_tx,
            out_tx,
            latch,
            pool,
            state: PipelineState::Running,
        }
    }

    fn transition(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {} -> {next}",
            self.state
        );
        #[cfg(feature = "tracing")]
        tracing::debug!("Pipeline {} -> {}", self.state, next);
        self.state = next;
    }

    /// Submits source items until the source ends, an error is latched, or
    /// the work queue loses every reader. Returns the state that stopped it.
    async fn dispatch<S>(&mut self, mut source: S) -> PipelineState
    where
        S: Stream<Item = I> + Unpin,
    {
        let mut _submitted = 0_usize;

        let stop = loop {
            let item = tokio::select! {
                biased;
                () = self.latch.tripped() => break PipelineState::ErrorDetected,
                next = source.next() => match next {
                    Some(item) => item,
                    None => break PipelineState::SourceExhausted,
                },
            };

            let sent = tokio::select! {
                biased;
                () = self.latch.tripped() => break PipelineState::ErrorDetected,
                sent = self.work_tx.send(item) => sent,
            };

            if sent.is_err() {
                // The last worker may have latched an error on its way out.
                if self.latch.is_tripped() {
                    break PipelineState::ErrorDetected;
                }
                #[cfg(feature = "tracing")]
                tracing::error!("Work queue lost every worker, stopping dispatch");
                break PipelineState::WorkersLost;
            }

            _submitted += 1;
            #[cfg(feature = "tracing")]
            tracing::trace!("Dispatched item {_submitted}");
        };

        #[cfg(feature = "tracing")]
        tracing::debug!("Dispatched {_submitted} items");

        stop
    }

    /// Feeds `source` to the workers and returns the pipeline's result.
    ///
    /// Each step waits on whichever comes first: the next source item or a
    /// latched error. A submission that blocks on a full work queue also
    /// races the latch, so an abort is never stuck behind backpressure.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by the transform. Later errors from
    /// workers that were already in flight are discarded.
    ///
    /// # Panics
    ///
    /// If a worker panicked, the panic is resumed here after the pool has
    /// been joined and the output queue closed.
    pub async fn run<S>(mut self, source: S) -> Result<(), T::Error>
    where
        S: Stream<Item = I> + Unpin,
    {
        let stop = self.dispatch(source).await;
        self.transition(stop);

        // === Phase 1: Close the work queue ===
        self.work_tx.close();
        self.transition(PipelineState::Draining);

        // === Phase 2: Wait for every worker to stop ===
        let summary = self.pool.join().await;

        // === Phase 3: Close the output queue ===
        drop(self.out_tx);
        debug_assert!(self.state.can_advance_to(PipelineState::Terminated));
        #[cfg(feature = "tracing")]
        tracing::debug!("Pipeline {} -> {}", self.state, PipelineState::Terminated);
        self.state = PipelineState::Terminated;

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Pipeline terminated: {} processed, {} failed",
            summary.processed,
            summary.failed
        );

        if let Some(payload) = summary.panic {
            std::panic::resume_unwind(payload);
        }

        // === Phase 4: Read the latch once ===
        match self.latch.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests;
