//! End-to-end pipeline: source, worker pool and sink for a single run.

use crate::{
    config::PipelineConfig,
    dispatcher::Dispatcher,
    sink::{Sink, drain},
    transform::Transform,
};
use futures::Stream;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A bounded-parallelism pipeline around a shared [`Transform`].
///
/// Every call to [`Pipeline::run`] builds fresh queues, a fresh error latch
/// and a fresh worker pool; nothing carries over between runs.
pub struct Pipeline<T> {
    config: PipelineConfig,
    transform: Arc<T>,
}

impl<T> Pipeline<T> {
    pub fn new(config: PipelineConfig, transform: T) -> Self {
        Self {
            config,
            transform: Arc::new(transform),
        }
    }

    /// Runs `source` through the worker pool into `sink`.
    ///
    /// The dispatcher and the sink run concurrently on the calling task while
    /// the workers run as separate Tokio tasks, so this should be awaited on
    /// a multi-threaded runtime to get parallel transforms. Returns once the
    /// sink has consumed every result that reached the output queue.
    ///
    /// # Errors
    ///
    /// Returns the first transform error, unchanged. On error the sink has
    /// received only the results completed before the abort.
    #[cfg_attr(feature = "tracing", tracing::instrument(
        name = "pipeline",
        skip_all,
        fields(
            items = self.config.item_count(),
            workers = self.config.concurrency_size(),
        ),
    ))]
    pub async fn run<I, S, K>(&self, source: S, sink: K) -> Result<(), T::Error>
    where
        I: Send + 'static,
        T: Transform<I>,
        S: Stream<Item = I> + Unpin,
        K: Sink<T::Output>,
    {
        let (out_tx, out_rx) = mpsc::channel(self.config.output_capacity());
        let dispatcher =
            Dispatcher::<I, T>::start(&self.config, Arc::clone(&self.transform), out_tx);

        let (res, _consumed) = tokio::join!(dispatcher.run(source), drain(out_rx, sink));

        #[cfg(feature = "tracing")]
        {
            if res.is_ok() {
                tracing::info!("Pipeline completed, sink consumed {_consumed} results");
            } else {
                tracing::warn!("Pipeline aborted, sink consumed {_consumed} results");
            }
        }

        res
    }
}
