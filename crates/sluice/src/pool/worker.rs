use super::manager::PoolCounters;
use crate::{latch::ErrorLatch, transform::Transform};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Worker task responsible for transforming items from the work queue.
///
/// Each worker pulls one item at a time, applies the shared [`Transform`],
/// and pushes the result to the output queue. The loop exits when either:
/// - The work queue is closed and drained,
/// - The error latch has been tripped (by this or any other worker),
/// - This worker's transform fails,
/// - The output queue has been closed.
///
/// Cancellation is cooperative: the latch is only checked between items, so a
/// transform that is already running always completes and its result is
/// still delivered.
///
/// # Arguments
/// - `worker_id`: Identifier used for logging.
/// - `work_rx`: Shared receiver of the work queue.
/// - `out_tx`: This worker's handle on the output queue. Dropped on exit.
/// - `transform`: Transform shared by every worker in the pool.
/// - `latch`: First-error-wins latch shared with the dispatcher.
/// - `counters`: Pool-wide processed/failed totals.
pub(crate) async fn worker_loop<I, T>(
    worker_id: usize,
    work_rx: async_channel::Receiver<I>,
    out_tx: mpsc::Sender<T::Output>,
    transform: Arc<T>,
    latch: Arc<ErrorLatch<T::Error>>,
    counters: Arc<PoolCounters>,
) where
    I: Send + 'static,
    T: Transform<I>,
{
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} started");
    #[cfg(not(feature = "tracing"))]
    let _ = worker_id;

    loop {
        // Prefer the latch so a worker never picks up new work after an abort.
        let item = tokio::select! {
            biased;
            () = latch.tripped() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Worker {worker_id} stopping: error latched");
                break;
            }
            item = work_rx.recv() => match item {
                Ok(item) => item,
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Worker {worker_id} stopping: work queue closed");
                    break;
                }
            },
        };

        match transform.apply(item).await {
            Ok(result) => {
                counters.record_processed();
                if out_tx.send(result).await.is_err() {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("Worker {worker_id} stopping: output queue closed");
                    break;
                }
            }
            Err(err) => {
                counters.record_failed();
                let _won = latch.try_set(err);

                #[cfg(feature = "tracing")]
                {
                    if _won {
                        tracing::debug!("Worker {worker_id} latched transform error");
                    } else {
                        tracing::debug!("Worker {worker_id} failed after abort, error discarded");
                    }
                }
                break;
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} stopped");
}
