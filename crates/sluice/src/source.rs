//! Item sources.
//!
//! A source is any [`Stream`] that is `Send + Unpin`: lazy, finite and
//! consumed exactly once by the dispatcher. Sources have no error path.

use crate::config::MAX_QUEUE_CAPACITY;
use futures::{Stream, StreamExt, stream};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Emits the natural numbers `1..=count` in order.
///
/// `count = 0` produces an empty stream.
pub fn counter(count: u64) -> impl Stream<Item = u64> + Send + Unpin {
    stream::iter(1..=count)
}

/// Drives `source` on its own task, buffering up to `capacity` items.
///
/// `capacity` is clamped to `1..=MAX_QUEUE_CAPACITY`.
///
/// This decouples the source's pace from the dispatcher: the producer task
/// keeps emitting until the buffer is full, then waits. If the returned
/// stream is dropped (for example after the pipeline aborts), the producer
/// stops at its next send.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_producer<S>(mut source: S, capacity: usize) -> ReceiverStream<S::Item>
where
    S: Stream + Send + Unpin + 'static,
    S::Item: Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.clamp(1, MAX_QUEUE_CAPACITY));

    tokio::spawn(async move {
        #[cfg(feature = "tracing")]
        let mut _emitted = 0_usize;

        while let Some(item) = source.next().await {
            if tx.send(item).await.is_err() {
                #[cfg(feature = "tracing")]
                tracing::debug!("Producer stopped after {_emitted} items: consumer dropped");
                return;
            }

            #[cfg(feature = "tracing")]
            {
                _emitted += 1;
                tracing::trace!("Producer emitted item {_emitted}");
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Producer exhausted after {_emitted} items");
    });

    ReceiverStream::new(rx)
}
