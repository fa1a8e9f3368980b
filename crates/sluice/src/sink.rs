//! Result sinks.
//!
//! The sink is a pure consumer at the end of the pipeline. It is fed from the
//! output queue until that queue is closed and empty; it is never told to
//! stop directly and has no way to signal back into the pipeline.

use tokio::sync::mpsc;

/// Consumes pipeline results, one call per result, in arrival order.
pub trait Sink<T> {
    fn consume(&mut self, result: T);
}

impl<T> Sink<T> for Vec<T> {
    fn consume(&mut self, result: T) {
        self.push(result);
    }
}

impl<T, S: Sink<T> + ?Sized> Sink<T> for &mut S {
    fn consume(&mut self, result: T) {
        (**self).consume(result);
    }
}

/// Sink backed by a closure. See [`from_fn`].
#[derive(Debug, Clone)]
pub struct FromFn<F>(F);

/// Wraps `f` so that it is called once per result.
pub const fn from_fn<F>(f: F) -> FromFn<F> {
    FromFn(f)
}

impl<T, F: FnMut(T)> Sink<T> for FromFn<F> {
    fn consume(&mut self, result: T) {
        (self.0)(result);
    }
}

/// Feeds every result from `rx` into `sink` until the channel is closed and
/// drained. Returns the number of results consumed.
pub async fn drain<T, S: Sink<T>>(mut rx: mpsc::Receiver<T>, mut sink: S) -> usize {
    let mut consumed = 0;

    while let Some(result) = rx.recv().await {
        sink.consume(result);
        consumed += 1;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("Sink drained {consumed} results");

    consumed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drains_until_closed() {
        let (tx, rx) = mpsc::channel(4);
        let producer = tokio::spawn(async move {
            for i in 0..10 {
                tx.send(i).await.unwrap();
            }
        });

        let mut results = Vec::new();
        let consumed = drain(rx, &mut results).await;
        producer.await.unwrap();

        assert_eq!(consumed, 10);
        assert_eq!(results, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn closure_sink_sees_every_result() {
        let (tx, rx) = mpsc::channel(3);
        for i in 1..=3 {
            tx.send(i).await.unwrap();
        }
        drop(tx);

        let mut sum = 0;
        let consumed = drain(rx, from_fn(|v: i32| sum += v)).await;

        assert_eq!(consumed, 3);
        assert_eq!(sum, 6);
    }
}
