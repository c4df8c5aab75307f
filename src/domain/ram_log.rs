//! Bounded in-memory log buffer backing the `log` and `plainlog` pages.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

/// A single RAM log entry.
#[derive(Debug, Clone)]
pub struct RamLogEntry {
    /// Time the entry was recorded.
    pub timestamp: DateTime<Utc>,
    /// Severity level.
    pub level: tracing::Level,
    /// Log line text.
    pub message: String,
}

/// Ring buffer of recent log lines.
///
/// The gateway records notable events here in addition to the normal
/// `tracing` output, so the internal `log` pages can show them without
/// any file access. Oldest entries are dropped once `capacity` is
/// reached.
#[derive(Debug)]
pub struct RamLog {
    capacity: usize,
    entries: Mutex<VecDeque<RamLogEntry>>,
}

impl RamLog {
    /// Creates an empty RAM log retaining at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Records a log line, evicting the oldest entry when full.
    ///
    /// A zero-capacity log retains nothing.
    pub fn record(&self, level: tracing::Level, message: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(RamLogEntry {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        });
    }

    /// Returns a copy of all retained entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<RamLogEntry> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.iter().cloned().collect()
    }

    /// Renders the log as plain text, one line per entry.
    #[must_use]
    pub fn dump_plain(&self) -> String {
        self.entries()
            .iter()
            .map(|e| {
                format!(
                    "{} {:5} {}",
                    e.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    e.level,
                    e.message
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Returns the number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no entries are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let log = RamLog::new(10);
        log.record(tracing::Level::INFO, "first");
        log.record(tracing::Level::WARN, "second");

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.first().map(|e| e.message.as_str()), Some("first"));
        assert_eq!(entries.last().map(|e| e.message.as_str()), Some("second"));
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let log = RamLog::new(2);
        log.record(tracing::Level::INFO, "a");
        log.record(tracing::Level::INFO, "b");
        log.record(tracing::Level::INFO, "c");

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.first().map(|e| e.message.as_str()), Some("b"));
    }

    #[test]
    fn zero_capacity_retains_nothing() {
        let log = RamLog::new(0);
        for i in 0..100 {
            log.record(tracing::Level::INFO, format!("line {i}"));
        }
        assert!(log.is_empty());
        assert!(log.entries().is_empty());
    }

    #[test]
    fn dump_plain_contains_level_and_message() {
        let log = RamLog::new(10);
        log.record(tracing::Level::ERROR, "boom");
        let dump = log.dump_plain();
        assert!(dump.contains("ERROR"));
        assert!(dump.contains("boom"));
    }
}
