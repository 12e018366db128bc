//! Tests for DestinationRegistry
//!
//! Covers destination layout, channel reuse, flush/close fan-out and the
//! rejection of writes after shutdown.

use pretty_assertions::assert_eq;
use std::sync::Arc;

use hourlog_core::{DestinationRegistry, LineSink, LogConfig, LogError};
use tests::fixtures::TestLogDir;
use tests::tracing_init;

fn registry(log_dir: &TestLogDir, buffer: usize) -> DestinationRegistry {
    tracing_init::init();
    DestinationRegistry::new(&log_dir.config(buffer as i64)).unwrap()
}

#[tokio::test]
async fn two_lines_to_one_destination_share_a_file() {
    let log_dir = TestLogDir::new();
    let registry = registry(&log_dir, 2);

    registry.write("cat", "a").await.unwrap();
    registry.write("cat", "b").await.unwrap();
    registry.close_all().await.unwrap();

    let files = log_dir.files("cat");
    assert_eq!(files.len(), 1);
    assert_eq!(std::fs::read_to_string(&files[0]).unwrap(), "a\nb\n");
}

#[tokio::test]
async fn destinations_get_separate_directories() {
    let log_dir = TestLogDir::new();
    let registry = registry(&log_dir, 4);

    registry.write("record/orders", "o1").await.unwrap();
    registry.write("record/payments", "p1").await.unwrap();
    registry.write("record/orders", "o2").await.unwrap();
    registry.write("stat", "s1").await.unwrap();

    assert_eq!(registry.len().await, 3);
    let mut expected: Vec<String> = ["record/orders", "record/payments", "stat"]
        .iter()
        .map(|d| registry.destination_dir(d).to_string_lossy().into_owned())
        .collect();
    expected.sort();
    assert_eq!(registry.keys().await, expected);

    registry.close_all().await.unwrap();

    assert_eq!(log_dir.lines("record/orders"), vec!["o1", "o2"]);
    assert_eq!(log_dir.lines("record/payments"), vec!["p1"]);
    assert_eq!(log_dir.files("stat").len(), 1);
}

#[tokio::test]
async fn nested_template_creates_month_and_day_directories() {
    let log_dir = TestLogDir::new();
    let config = LogConfig::new(log_dir.path()).with_buffer(2);
    let registry = DestinationRegistry::new(&config).unwrap();

    registry.write("record/orders", "x").await.unwrap();
    registry.close_all().await.unwrap();

    let files = log_dir.files("record/orders");
    assert_eq!(files.len(), 1);

    // <month>/<day>/<day>-<hour>.log
    let relative = files[0].strip_prefix(log_dir.path().join("record/orders")).unwrap();
    let parts: Vec<String> = relative
        .iter()
        .map(|c| c.to_string_lossy().into_owned())
        .collect();
    assert_eq!(parts.len(), 3);
    assert!(parts[1].starts_with(&parts[0]));
    assert!(parts[2].starts_with(&parts[1]));
    assert!(parts[2].ends_with(".log"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_writes_create_one_channel() {
    let log_dir = TestLogDir::new();
    let registry = Arc::new(registry(&log_dir, 16));

    let writers: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.write("hot", format!("w{}", i)).await })
        })
        .collect();
    for writer in futures::future::join_all(writers).await {
        writer.unwrap().unwrap();
    }

    assert_eq!(registry.len().await, 1);
    registry.close_all().await.unwrap();

    let mut lines = log_dir.lines("hot");
    lines.sort();
    assert_eq!(lines, (0..8).map(|i| format!("w{}", i)).collect::<Vec<_>>());
}

#[tokio::test]
async fn close_all_is_idempotent_and_final() {
    let log_dir = TestLogDir::new();
    let registry = registry(&log_dir, 2);

    registry.write("cat", "before").await.unwrap();
    registry.close_all().await.unwrap();
    registry.close_all().await.unwrap();

    assert!(registry.is_closed().await);
    assert!(registry.is_empty().await);

    let err = registry.write("cat", "after").await.unwrap_err();
    assert!(matches!(err, LogError::AlreadyClosed(_)));
    assert_eq!(log_dir.lines("cat"), vec!["before"]);
}

#[tokio::test]
async fn sink_trait_routes_to_registry() {
    let log_dir = TestLogDir::new();
    let sink: Arc<dyn LineSink> = Arc::new(registry(&log_dir, 2));

    sink.ensure_destination("stat/qps").await.unwrap();
    assert!(log_dir.path().join("stat/qps").is_dir());

    sink.write_line("stat/qps", "100".to_string()).await.unwrap();
    sink.flush().await.unwrap();
    sink.close().await.unwrap();
    sink.close().await.unwrap();

    assert_eq!(log_dir.lines("stat/qps"), vec!["100"]);
}

#[tokio::test]
async fn invalid_template_is_rejected_up_front() {
    let log_dir = TestLogDir::new();
    let config = log_dir.config(2).with_sub_rel_path("/etc/2006.log");

    let err = DestinationRegistry::new(&config).unwrap_err();
    assert!(matches!(err, LogError::InvalidTemplate { .. }));
}
