//! Tests for the telemetry batcher: size and timer triggers, failure absorption.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agenda_client::{BatcherConfig, ClientError, LogBatcher, LogEntry, LogLevel, LogSink, Result};
use futures::future::{BoxFuture, FutureExt};
use tokio::sync::mpsc;

// ── Helpers ─────────────────────────────────────────────────────────────────

struct ChannelSink(mpsc::UnboundedSender<LogEntry>);

impl LogSink for ChannelSink {
    fn send(&self, entry: LogEntry) -> BoxFuture<'static, Result<()>> {
        let tx = self.0.clone();
        async move {
            let _ = tx.send(entry);
            Ok(())
        }
        .boxed()
    }
}

struct FailingSink(Arc<AtomicUsize>);

impl LogSink for FailingSink {
    fn send(&self, _entry: LogEntry) -> BoxFuture<'static, Result<()>> {
        let attempts = Arc::clone(&self.0);
        async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::Api {
                status: 503,
                detail: "unavailable".to_string(),
            })
        }
        .boxed()
    }
}

fn channel_batcher() -> (LogBatcher, mpsc::UnboundedReceiver<LogEntry>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (LogBatcher::new(ChannelSink(tx), BatcherConfig::default()), rx)
}

// ── Size trigger ────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn twenty_records_flush_exactly_once() {
    let (batcher, mut rx) = channel_batcher();

    for i in 0..19 {
        batcher.info("CLICK", &format!("event {i}"));
    }
    assert_eq!(batcher.flush_cycles(), 0);
    assert_eq!(batcher.buffered(), 19);

    batcher.info("CLICK", "event 19");
    assert_eq!(batcher.flush_cycles(), 1);
    assert_eq!(batcher.buffered(), 0);

    let mut delivered = Vec::new();
    for _ in 0..20 {
        delivered.push(rx.recv().await.unwrap());
    }
    assert!(delivered.iter().all(|e| e.timestamp.is_some()));
    assert_eq!(batcher.flush_cycles(), 1);
}

#[tokio::test(start_paused = true)]
async fn levels_are_kept_per_entry() {
    let (batcher, mut rx) = channel_batcher();
    batcher.warn("SLOW", "slow");
    batcher.error("BOOM", "boom");
    batcher.flush();

    let mut levels = vec![rx.recv().await.unwrap().level, rx.recv().await.unwrap().level];
    levels.sort_by_key(|l| format!("{l:?}"));
    assert_eq!(levels, vec![LogLevel::Error, LogLevel::Warn]);
}

#[tokio::test(start_paused = true)]
async fn empty_flush_is_not_a_cycle() {
    let (batcher, _rx) = channel_batcher();
    batcher.flush();
    assert_eq!(batcher.flush_cycles(), 0);
}

// ── Timer trigger ───────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn timer_flushes_partial_buffer() {
    let (batcher, mut rx) = channel_batcher();
    let _task = batcher.start();

    batcher.info("OPEN", "dashboard");
    batcher.info("OPEN", "calendar");

    tokio::time::sleep(Duration::from_millis(2900)).await;
    assert_eq!(batcher.flush_cycles(), 0);
    assert_eq!(batcher.buffered(), 2);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(batcher.flush_cycles(), 1);
    assert_eq!(rx.recv().await.unwrap().action, "OPEN");
}

#[tokio::test(start_paused = true)]
async fn timer_task_ends_with_last_handle() {
    let (batcher, _rx) = channel_batcher();
    let task = batcher.start();
    drop(batcher);

    tokio::time::sleep(Duration::from_millis(3100)).await;
    assert!(task.is_finished());
}

#[tokio::test(start_paused = true)]
async fn zero_interval_timer_keeps_flushing() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let config = BatcherConfig {
        flush_interval: Duration::ZERO,
        max_buffer: 20,
    };
    let batcher = LogBatcher::new(ChannelSink(tx), config);
    let task = batcher.start();

    batcher.info("OPEN", "dashboard");
    tokio::time::sleep(Duration::from_millis(5)).await;

    assert!(!task.is_finished());
    assert_eq!(batcher.buffered(), 0);
    assert_eq!(rx.recv().await.unwrap().action, "OPEN");
}

// ── Failure absorption ──────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn failed_delivery_never_reaches_caller() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let batcher = LogBatcher::new(FailingSink(Arc::clone(&attempts)), BatcherConfig::default());

    for _ in 0..20 {
        batcher.record(LogEntry::new(LogLevel::Error, "HTTP_ERROR", "GET /x failed with 503"));
    }
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert_eq!(attempts.load(Ordering::SeqCst), 20);
    assert_eq!(batcher.flush_cycles(), 1);

    // Still usable afterwards.
    batcher.info("AFTER", "still fine");
    batcher.flush();
    assert_eq!(batcher.flush_cycles(), 2);
}

#[test]
fn flush_without_runtime_drops_entries() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let config = BatcherConfig {
        flush_interval: Duration::from_millis(3000),
        max_buffer: 2,
    };
    let batcher = LogBatcher::new(ChannelSink(tx), config);

    batcher.info("A", "one");
    batcher.info("B", "two");

    assert_eq!(batcher.flush_cycles(), 1);
    assert_eq!(batcher.buffered(), 0);
}
