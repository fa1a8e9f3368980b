use super::WorkerPool;
use crate::latch::ErrorLatch;
use core::time::Duration;
use std::sync::Arc;
use tokio::sync::mpsc;

fn doubler() -> Arc<impl crate::Transform<u32, Output = u32, Error = u32>> {
    Arc::new(|i: u32| async move { Ok::<_, u32>(i * 2) })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn drains_queue_after_close() {
    let (work_tx, work_rx) = async_channel::bounded(4);
    let (out_tx, mut out_rx) = mpsc::channel(64);
    let latch = Arc::new(ErrorLatch::new());

    let pool = WorkerPool::spawn(4, &work_rx, &out_tx, &doubler(), &latch);
    drop(work_rx);
    assert_eq!(pool.size(), 4);

    for i in 0..32 {
        work_tx.send(i).await.unwrap();
    }
    work_tx.close();

    let summary = pool.join().await;
    drop(out_tx);

    assert_eq!(summary.processed, 32);
    assert_eq!(summary.failed, 0);
    assert!(summary.panic.is_none());

    let mut results = Vec::new();
    while let Some(v) = out_rx.recv().await {
        results.push(v);
    }
    results.sort_unstable();
    assert_eq!(results, (0..32).map(|i| i * 2).collect::<Vec<_>>());
    assert!(latch.take().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failing_worker_stops_and_latches() {
    let (work_tx, work_rx) = async_channel::bounded(1);
    let (out_tx, mut out_rx) = mpsc::channel(8);
    let latch = Arc::new(ErrorLatch::new());
    let transform = Arc::new(|i: u32| async move { if i == 3 { Err(i) } else { Ok(i) } });

    let pool = WorkerPool::spawn(1, &work_rx, &out_tx, &transform, &latch);
    drop(work_rx);

    for i in 1..=3 {
        work_tx.send(i).await.unwrap();
    }
    // The only worker has exited, so the queue now has no receivers.
    let summary = pool.join().await;
    assert!(work_tx.send(4).await.is_err());
    drop(out_tx);

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(latch.take(), Some(3));

    assert_eq!(out_rx.recv().await, Some(1));
    assert_eq!(out_rx.recv().await, Some(2));
    assert_eq!(out_rx.recv().await, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tripped_latch_stops_idle_workers() {
    let (_work_tx, work_rx) = async_channel::bounded::<u32>(2);
    let (out_tx, _out_rx) = mpsc::channel(2);
    let latch = Arc::new(ErrorLatch::new());

    let pool = WorkerPool::spawn(3, &work_rx, &out_tx, &doubler(), &latch);

    // The work queue stays open; only the latch can release the workers.
    latch.try_set(7);
    let summary = pool.join().await;

    assert_eq!(summary.processed, 0);
    assert_eq!(latch.take(), Some(7));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_flight_items_finish_after_abort() {
    let (work_tx, work_rx) = async_channel::bounded(4);
    let (out_tx, mut out_rx) = mpsc::channel(8);
    let latch = Arc::new(ErrorLatch::new());
    let transform = Arc::new(|i: u32| async move {
        if i == 0 {
            Err("zero")
        } else {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(i)
        }
    });

    let pool = WorkerPool::spawn(2, &work_rx, &out_tx, &transform, &latch);
    drop(work_rx);

    work_tx.send(1).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    work_tx.send(0).await.unwrap();

    let summary = pool.join().await;
    drop(out_tx);

    // Item 1 was already running when item 0 failed and still completes.
    assert_eq!(summary.processed, 1);
    assert_eq!(out_rx.recv().await, Some(1));
    assert_eq!(out_rx.recv().await, None);
    assert_eq!(latch.take(), Some("zero"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn join_reports_worker_panic() {
    let (work_tx, work_rx) = async_channel::bounded(1);
    let (out_tx, _out_rx) = mpsc::channel(1);
    let latch = Arc::new(ErrorLatch::<()>::new());
    let transform = Arc::new(|i: u32| async move {
        if i > 0 {
            panic!("transform exploded");
        }
        Ok::<u32, ()>(i)
    });

    let pool = WorkerPool::spawn(1, &work_rx, &out_tx, &transform, &latch);
    drop(work_rx);
    work_tx.send(1).await.unwrap();
    work_tx.close();

    let summary = pool.join().await;
    let payload = summary.panic.expect("worker panic should be reported");
    assert_eq!(
        payload.downcast_ref::<&'static str>().copied(),
        Some("transform exploded")
    );
}
