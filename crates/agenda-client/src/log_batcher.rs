//! Best-effort batching of client telemetry.
//!
//! Entries accumulate in memory and are flushed every `flush_interval`, or as soon as the
//! buffer reaches `max_buffer`. A flush hands each entry to the sink as its own task;
//! delivery is at most once, unordered, and failures only reach the local `tracing`
//! output. Nothing here ever returns an error to the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub action: String,
    pub message: String,
    pub level: LogLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Stamped when the entry is recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl LogEntry {
    pub fn new(level: LogLevel, action: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            message: message.into(),
            level,
            trace_id: None,
            metadata: None,
            timestamp: None,
        }
    }

    pub fn with_trace_id(mut self, trace_id: Option<String>) -> Self {
        self.trace_id = trace_id;
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Remote destination for log entries.
pub trait LogSink: Send + Sync + 'static {
    fn send(&self, entry: LogEntry) -> BoxFuture<'static, Result<()>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatcherConfig {
    pub flush_interval: Duration,
    pub max_buffer: usize,
}

/// Floor for the timer period; a zero period would stop the timer task.
const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(1);

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_millis(3000),
            max_buffer: 20,
        }
    }
}

struct Inner {
    sink: Arc<dyn LogSink>,
    config: BatcherConfig,
    buffer: Mutex<Vec<LogEntry>>,
    cycles: AtomicU64,
}

/// Cheap to clone; clones share one buffer.
#[derive(Clone)]
pub struct LogBatcher {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for LogBatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogBatcher")
            .field("config", &self.inner.config)
            .field("buffered", &self.buffered())
            .field("flush_cycles", &self.flush_cycles())
            .finish()
    }
}

impl LogBatcher {
    pub fn new(sink: impl LogSink, config: BatcherConfig) -> Self {
        Self::from_arc(Arc::new(sink), config)
    }

    pub fn from_arc(sink: Arc<dyn LogSink>, config: BatcherConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                sink,
                config,
                buffer: Mutex::new(Vec::new()),
                cycles: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> BatcherConfig {
        self.inner.config
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.inner.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append an entry, flushing when the buffer is full.
    pub fn record(&self, mut entry: LogEntry) {
        entry.timestamp.get_or_insert_with(Utc::now);
        let full = {
            let mut buffer = self.buffer();
            buffer.push(entry);
            buffer.len() >= self.inner.config.max_buffer
        };
        if full {
            self.flush();
        }
    }

    pub fn info(&self, action: &str, message: &str) {
        self.record(LogEntry::new(LogLevel::Info, action, message));
    }

    pub fn warn(&self, action: &str, message: &str) {
        self.record(LogEntry::new(LogLevel::Warn, action, message));
    }

    pub fn error(&self, action: &str, message: &str) {
        self.record(LogEntry::new(LogLevel::Error, action, message));
    }

    /// Drain the buffer and dispatch every entry independently.
    ///
    /// Outside a tokio runtime the drained entries are written to the local log and dropped.
    pub fn flush(&self) {
        let entries = std::mem::take(&mut *self.buffer());
        if entries.is_empty() {
            return;
        }
        self.inner.cycles.fetch_add(1, Ordering::Relaxed);

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(dropped = entries.len(), "no async runtime; dropping log entries");
                for entry in &entries {
                    fallback(entry, "no runtime");
                }
                return;
            }
        };

        for entry in entries {
            let sink = Arc::clone(&self.inner.sink);
            handle.spawn(async move {
                let action = entry.action.clone();
                let message = entry.message.clone();
                if let Err(e) = sink.send(entry).await {
                    warn!(%action, %message, error = %e, "log delivery failed");
                }
            });
        }
    }

    /// Spawn the periodic flush task. Must be called from within a tokio runtime.
    ///
    /// The task stops on its own once every `LogBatcher` clone has been dropped.
    pub fn start(&self) -> JoinHandle<()> {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let period = self.inner.config.flush_interval.max(MIN_FLUSH_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                match weak.upgrade() {
                    Some(inner) => LogBatcher { inner }.flush(),
                    None => break,
                }
            }
        })
    }

    /// Number of flushes that drained at least one entry.
    pub fn flush_cycles(&self) -> u64 {
        self.inner.cycles.load(Ordering::Relaxed)
    }

    pub fn buffered(&self) -> usize {
        self.buffer().len()
    }
}

fn fallback(entry: &LogEntry, reason: &str) {
    warn!(action = %entry.action, message = %entry.message, reason, "log fallback");
}
