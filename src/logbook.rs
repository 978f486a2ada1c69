// logbook.rs

use crate::constants::LOG_TIMESTAMP_FORMAT;
use chrono::{Local, NaiveDateTime, Timelike};
use parking_lot::Mutex;
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.timestamp.format(LOG_TIMESTAMP_FORMAT),
            self.message
        )
    }
}

/// Append-only record of what a client session did.
///
/// Entries are stamped with local time at second precision. Stamps never go
/// backwards, even if the wall clock does.
#[derive(Debug, Default)]
pub struct Logbook {
    entries: Mutex<Vec<LogEntry>>,
}

impl Logbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, message: impl Into<String>) {
        let message = message.into();
        debug!(target: "ww_historian::logbook", "{}", message);
        self.push(message);
    }

    /// Appends a message describing a failure.
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(target: "ww_historian::logbook", "{}", message);
        self.push(message);
    }

    fn push(&self, message: String) {
        let now = Local::now().naive_local();
        let now = now.with_nanosecond(0).unwrap_or(now);

        let mut entries = self.entries.lock();
        let timestamp = match entries.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };
        entries.push(LogEntry { timestamp, message });
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Snapshot of all entries in insertion order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Renders every entry as `<timestamp>: <message>`, one per line.
    pub fn dump(&self) -> String {
        self.entries
            .lock()
            .iter()
            .map(|entry| format!("{}\n", entry))
            .collect()
    }
}
