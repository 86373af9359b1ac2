//! Storage protocol definitions.
//!
//! The kernel only ever sees storage through this namespaced key-value
//! interface; engines live behind it.

use async_trait::async_trait;

use crate::error::StorageError;

/// Namespaced key-value store.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Returns the backend ID.
    fn id(&self) -> &str;

    /// Read a value. `None` when the key is absent.
    async fn get(&self, namespace: &str, key: &str)
        -> Result<Option<serde_json::Value>, StorageError>;

    /// Write (insert or replace) a value.
    async fn set(
        &self,
        namespace: &str,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), StorageError>;

    /// Delete a value. Returns whether something was removed.
    async fn delete(&self, namespace: &str, key: &str) -> Result<bool, StorageError>;

    /// List the keys of a namespace in ascending order.
    async fn list_keys(&self, namespace: &str) -> Result<Vec<String>, StorageError>;

    /// Remove every key of a namespace.
    async fn clear_namespace(&self, namespace: &str) -> Result<(), StorageError>;
}
