//! Bounded in-memory ring of log entries.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};

use console_protocols::log::LogLevel;

/// A recorded log entry.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub context: Map<String, Value>,
}

/// Keeps the last `capacity` entries; older ones are dropped.
pub struct LogBuffer {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.entries.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Up to `limit` most recent entries at or above `min_level`, oldest first.
    pub fn recent(&self, limit: usize, min_level: LogLevel) -> Vec<LogEntry> {
        let entries = self.entries.lock();
        let mut selected: Vec<LogEntry> = entries
            .iter()
            .rev()
            .filter(|e| e.level >= min_level)
            .take(limit)
            .cloned()
            .collect();
        selected.reverse();
        selected
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: LogLevel, message: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.to_string(),
            context: Map::new(),
        }
    }

    #[test]
    fn test_drops_oldest_when_full() {
        let buffer = LogBuffer::new(2);
        buffer.push(entry(LogLevel::Info, "one"));
        buffer.push(entry(LogLevel::Info, "two"));
        buffer.push(entry(LogLevel::Info, "three"));

        let messages: Vec<String> = buffer
            .recent(10, LogLevel::Debug)
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn test_recent_limit_and_level() {
        let buffer = LogBuffer::new(10);
        buffer.push(entry(LogLevel::Debug, "d"));
        buffer.push(entry(LogLevel::Error, "e1"));
        buffer.push(entry(LogLevel::Warning, "w"));
        buffer.push(entry(LogLevel::Error, "e2"));

        let messages: Vec<String> = buffer
            .recent(2, LogLevel::Warning)
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(messages, vec!["w", "e2"]);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let buffer = LogBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
        buffer.push(entry(LogLevel::Info, "x"));
        assert_eq!(buffer.len(), 1);
    }
}
