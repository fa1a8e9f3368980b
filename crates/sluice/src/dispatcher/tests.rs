use super::{Dispatcher, PipelineState};
use crate::{PipelineConfig, Transform};
use futures::stream;
use std::sync::Arc;
use tokio::sync::mpsc;

fn start<T>(concurrency: usize, transform: T) -> (Dispatcher<u64, T>, mpsc::Receiver<T::Output>)
where
    T: Transform<u64>,
{
    let config = PipelineConfig::new(16, concurrency).unwrap();
    let (out_tx, out_rx) = mpsc::channel(config.output_capacity());
    let dispatcher = Dispatcher::<u64, T>::start(&config, Arc::new(transform), out_tx);
    (dispatcher, out_rx)
}

fn failing_on(n: u64) -> impl Transform<u64, Output = u64, Error = u64> {
    move |i: u64| async move { if i == n { Err(i) } else { Ok(i) } }
}

fn panicking() -> impl Transform<u64, Output = u64, Error = u64> {
    |i: u64| async move {
        if i > 0 {
            panic!("worker lost on item {i}");
        }
        Ok::<u64, u64>(i)
    }
}

#[test]
fn lifecycle_allows_only_forward_transitions() {
    use PipelineState::*;

    for stop in [ErrorDetected, SourceExhausted, WorkersLost] {
        assert!(Running.can_advance_to(stop));
        assert!(stop.can_advance_to(Draining));
        assert!(!stop.can_advance_to(Terminated));
    }
    assert!(Draining.can_advance_to(Terminated));

    assert!(!Running.can_advance_to(Draining));
    assert!(!Running.can_advance_to(Terminated));
    assert!(!Draining.can_advance_to(Running));
    assert!(!Terminated.can_advance_to(Running));
    assert!(!SourceExhausted.can_advance_to(ErrorDetected));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dispatch_stops_when_source_is_exhausted() {
    let (mut dispatcher, _out_rx) = start(2, failing_on(0));

    let stop = dispatcher.dispatch(stream::iter(1..=5)).await;
    assert_eq!(stop, PipelineState::SourceExhausted);

    dispatcher.work_tx.close();
    let summary = dispatcher.pool.join().await;
    assert_eq!(summary.processed, 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dispatch_stops_when_an_error_is_latched() {
    let (mut dispatcher, _out_rx) = start(1, failing_on(3));

    let stop = dispatcher.dispatch(stream::iter(1..=100)).await;
    assert_eq!(stop, PipelineState::ErrorDetected);
    assert!(dispatcher.latch.is_tripped());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dispatch_reports_lost_workers_when_all_panic() {
    let (mut dispatcher, _out_rx) = start(2, panicking());

    let stop = dispatcher.dispatch(stream::iter(1..=100)).await;
    assert_eq!(stop, PipelineState::WorkersLost);
    assert!(!dispatcher.latch.is_tripped());

    let summary = dispatcher.pool.join().await;
    assert!(summary.panic.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn run_resumes_worker_panic_after_teardown() {
    let (dispatcher, mut out_rx) = start(2, panicking());

    let res = tokio::spawn(dispatcher.run(stream::iter(1..=100))).await;
    assert!(res.unwrap_err().is_panic());

    // The output queue was closed before the panic resumed.
    assert_eq!(out_rx.recv().await, None);
}
