//! Log sinks for store lifecycle events.
//!
//! Entries are only produced when [`StoreConfig::debug`] is set. Each entry
//! carries a sequence number so interleaved output from several scopes can be
//! put back in order.

use crate::config::StoreConfig;
use crate::scope::ScopePath;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One log entry emitted by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// Sequence number, unique per engine.
    pub id: u64,
    pub message: String,
    /// Joined scope path the entry concerns, if any.
    pub scope: Option<String>,
    /// Rendered payload (state, caller, step index...).
    pub detail: Option<String>,
}

/// A sink for engine log entries.
pub trait StoreLogger: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// Default sink: forwards entries to `tracing` at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl StoreLogger for TracingLogger {
    fn log(&self, entry: &LogEntry) {
        tracing::debug!(
            log_id = entry.id,
            scope = entry.scope.as_deref().unwrap_or("-"),
            detail = entry.detail.as_deref().unwrap_or(""),
            "{}",
            entry.message
        );
    }
}

/// Sink that keeps every entry in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Messages of all entries, in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.entries.lock().iter().map(|e| e.message.clone()).collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl StoreLogger for MemoryLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().push(entry.clone());
    }
}

/// Debug-gated front end over a [`StoreLogger`].
pub(crate) struct Journal {
    config: StoreConfig,
    sink: Arc<dyn StoreLogger>,
    next_id: AtomicU64,
}

impl Journal {
    pub(crate) fn new(config: StoreConfig, sink: Arc<dyn StoreLogger>) -> Self {
        Self {
            config,
            sink,
            next_id: AtomicU64::new(0),
        }
    }

    pub(crate) fn enabled(&self) -> bool {
        self.config.is_debug()
    }

    /// Emit an entry. `detail` is only rendered when logging is enabled.
    pub(crate) fn log<F>(&self, message: &str, scope: Option<&ScopePath>, detail: F)
    where
        F: FnOnce() -> Option<String>,
    {
        if !self.enabled() {
            return;
        }
        let entry = LogEntry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            message: message.to_string(),
            scope: scope.map(|s| s.to_string()),
            detail: detail(),
        };
        self.sink.log(&entry);
    }
}
