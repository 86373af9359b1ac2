//! SQLite storage backend for homeconsole.
//!
//! Persists the namespaced key-value store in a single table.

mod backend;
mod schema;

pub use backend::SqliteStorage;
