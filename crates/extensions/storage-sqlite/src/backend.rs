//! SQLite storage implementation.

use std::path::Path;

use async_trait::async_trait;
use rusqlite::{OptionalExtension, params};
use serde_json::Value;
use tokio_rusqlite::Connection;
use tracing::debug;

use console_protocols::error::StorageError;
use console_protocols::storage::Storage;

use crate::schema::init_schema;

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;

/// SQLite-based storage.
///
/// Values are stored as JSON text keyed by `(namespace, key)`.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Create a new in-memory database.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    /// Open (or create) a file-backed database.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        debug!(path = %path.display(), "Opening SQLite storage");
        let conn = Connection::open(path)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(backend_error)?;
        Ok(Self { conn })
    }
}

fn backend_error(e: tokio_rusqlite::Error) -> StorageError {
    StorageError::Backend(e.to_string())
}

#[async_trait]
impl Storage for SqliteStorage {
    fn id(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StorageError> {
        let namespace = namespace.to_string();
        let key = key.to_string();
        let raw: Option<String> = self
            .conn
            .call(move |conn| {
                let value = conn
                    .query_row(
                        "SELECT value FROM kv_store WHERE namespace = ?1 AND key = ?2",
                        params![namespace, key],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(value)
            })
            .await
            .map_err(backend_error)?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, namespace: &str, key: &str, value: Value) -> Result<(), StorageError> {
        let namespace = namespace.to_string();
        let key = key.to_string();
        let text = serde_json::to_string(&value)?;
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO kv_store (namespace, key, value) VALUES (?1, ?2, ?3)
                     ON CONFLICT(namespace, key) DO UPDATE SET
                        value = excluded.value,
                        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                    params![namespace, key, text],
                )?;
                Ok(())
            })
            .await
            .map_err(backend_error)
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<bool, StorageError> {
        let namespace = namespace.to_string();
        let key = key.to_string();
        let affected = self
            .conn
            .call(move |conn| {
                Ok(conn.execute(
                    "DELETE FROM kv_store WHERE namespace = ?1 AND key = ?2",
                    params![namespace, key],
                )?)
            })
            .await
            .map_err(backend_error)?;
        Ok(affected > 0)
    }

    async fn list_keys(&self, namespace: &str) -> Result<Vec<String>, StorageError> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt =
                    conn.prepare("SELECT key FROM kv_store WHERE namespace = ?1 ORDER BY key")?;
                let keys = stmt
                    .query_map([&namespace], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(backend_error)
    }

    async fn clear_namespace(&self, namespace: &str) -> Result<(), StorageError> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM kv_store WHERE namespace = ?1", [&namespace])?;
                Ok(())
            })
            .await
            .map_err(backend_error)
    }
}
