//! Tests for AsyncLogChannel
//!
//! Validates ordering, graceful shutdown, back-pressure and idempotent close
//! against real files in a temp directory.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

use hourlog_core::{AsyncLogChannel, ChannelState, LogError, PathTemplate, FLUSH_INTERVAL};
use tests::fixtures::{TestLogDir, FLAT_HOURLY};
use tests::tracing_init;

fn spawn_channel(log_dir: &TestLogDir, capacity: usize) -> AsyncLogChannel {
    tracing_init::init();
    let template = PathTemplate::parse(FLAT_HOURLY).unwrap();
    AsyncLogChannel::spawn(log_dir.path().join("orders"), template, capacity)
}

#[tokio::test]
async fn lines_are_persisted_in_enqueue_order() {
    let log_dir = TestLogDir::new();
    let channel = spawn_channel(&log_dir, 4);

    let expected: Vec<String> = (0..50).map(|i| format!("line {}", i)).collect();
    for line in &expected {
        channel.write(line.clone()).await.unwrap();
    }
    channel.close().await.unwrap();

    assert_eq!(log_dir.lines("orders"), expected);
    assert_eq!(channel.state(), ChannelState::Stopped);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn close_drains_everything_enqueued_by_concurrent_producers() {
    let log_dir = TestLogDir::new();
    let channel = Arc::new(spawn_channel(&log_dir, 8));

    let producers: Vec<_> = (0..4)
        .map(|p| {
            let channel = Arc::clone(&channel);
            tokio::spawn(async move {
                for i in 0..250 {
                    channel.write(format!("p{}-{}", p, i)).await.unwrap();
                }
            })
        })
        .collect();
    for producer in futures::future::join_all(producers).await {
        producer.unwrap();
    }
    channel.close().await.unwrap();

    let lines = log_dir.lines("orders");
    assert_eq!(lines.len(), 1000);

    // Per-producer order survives interleaving
    for p in 0..4 {
        let prefix = format!("p{}-", p);
        let seq: Vec<usize> = lines
            .iter()
            .filter_map(|l| l.strip_prefix(&prefix))
            .map(|n| n.parse().unwrap())
            .collect();
        assert_eq!(seq, (0..250).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn full_queue_blocks_the_producer() {
    let log_dir = TestLogDir::new();
    let channel = Arc::new(spawn_channel(&log_dir, 2));

    // Stall the worker by holding the file writer
    let writer = channel.writer();
    let guard = writer.lock().await;

    let producer = {
        let channel = Arc::clone(&channel);
        tokio::spawn(async move {
            for i in 0..4 {
                channel.write(format!("m{}", i)).await.unwrap();
            }
        })
    };

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!producer.is_finished(), "producer should be blocked");

    drop(guard);
    producer.await.unwrap();
    channel.close().await.unwrap();

    assert_eq!(log_dir.lines("orders"), vec!["m0", "m1", "m2", "m3"]);
}

#[tokio::test]
async fn close_is_idempotent_and_rejects_later_writes() {
    let log_dir = TestLogDir::new();
    let channel = spawn_channel(&log_dir, 2);

    channel.write("only").await.unwrap();
    channel.close().await.unwrap();
    channel.close().await.unwrap();

    let err = channel.write("late").await.unwrap_err();
    assert!(matches!(err, LogError::AlreadyClosed(_)));
    assert!(err.is_closed());
    assert_eq!(log_dir.lines("orders"), vec!["only"]);
}

#[tokio::test]
async fn flush_makes_lines_visible_without_close() {
    let log_dir = TestLogDir::new();
    let channel = spawn_channel(&log_dir, 4);

    channel.write("a").await.unwrap();
    channel.write("b").await.unwrap();

    // Give the worker a chance to drain the queue, then force the buffer out
    tokio::time::sleep(Duration::from_millis(100)).await;
    channel.flush().await.unwrap();

    assert_eq!(log_dir.lines("orders"), vec!["a", "b"]);
    channel.close().await.unwrap();
}

/// Block the destination directory with a plain file, then wait until the
/// worker has taken `msg` off the queue
async fn write_while_blocked(log_dir: &TestLogDir, channel: &AsyncLogChannel, msg: &str) {
    channel.write(msg.to_string()).await.unwrap();
    while channel.pending().await > 0 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(log_dir.path().join("orders").is_file());
}

#[tokio::test]
async fn worker_reopens_file_on_tick_after_failed_rotation() {
    let log_dir = TestLogDir::new();
    std::fs::write(log_dir.path().join("orders"), b"not a directory").unwrap();
    let channel = spawn_channel(&log_dir, 4);

    write_while_blocked(&log_dir, &channel, "lost").await;
    std::fs::remove_file(log_dir.path().join("orders")).unwrap();

    // The next tick reopens the file without any write
    tokio::time::sleep(FLUSH_INTERVAL + Duration::from_millis(500)).await;
    assert_eq!(log_dir.files("orders").len(), 1);
    assert_eq!(channel.state(), ChannelState::Running);

    channel.write("kept").await.unwrap();
    channel.close().await.unwrap();

    assert_eq!(log_dir.lines("orders"), vec!["kept"]);
}

#[tokio::test]
async fn write_rotates_without_waiting_for_tick() {
    let log_dir = TestLogDir::new();
    std::fs::write(log_dir.path().join("orders"), b"not a directory").unwrap();
    let channel = spawn_channel(&log_dir, 4);

    write_while_blocked(&log_dir, &channel, "lost").await;
    std::fs::remove_file(log_dir.path().join("orders")).unwrap();

    // Written and closed well within one tick
    channel.write("kept").await.unwrap();
    channel.close().await.unwrap();

    assert_eq!(log_dir.lines("orders"), vec!["kept"]);
}
