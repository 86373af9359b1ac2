//! Logging module for homeconsole.
//!
//! Provides the `logger.log` service every other component reports through,
//! forwarding entries to `tracing` and keeping the most recent ones in memory.

mod buffer;
mod module;

pub use buffer::{LogBuffer, LogEntry};
pub use module::{LOGGER_MODULE, LoggerModule};
