//! In-process storage backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use console_protocols::error::StorageError;
use console_protocols::storage::Storage;

/// Storage held entirely in memory. Contents are lost on drop.
pub struct MemoryStorage {
    namespaces: DashMap<String, BTreeMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            namespaces: DashMap::new(),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn id(&self) -> &str {
        "memory"
    }

    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self
            .namespaces
            .get(namespace)
            .and_then(|ns| ns.get(key).cloned()))
    }

    async fn set(&self, namespace: &str, key: &str, value: Value) -> Result<(), StorageError> {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<bool, StorageError> {
        let removed = match self.namespaces.get_mut(namespace) {
            Some(mut ns) => ns.remove(key).is_some(),
            None => false,
        };
        self.namespaces.remove_if(namespace, |_, ns| ns.is_empty());
        Ok(removed)
    }

    async fn list_keys(&self, namespace: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .namespaces
            .get(namespace)
            .map(|ns| ns.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn clear_namespace(&self, namespace: &str) -> Result<(), StorageError> {
        self.namespaces.remove(namespace);
        Ok(())
    }
}
