//! Service registry for late-bound, name-addressed capabilities.

use std::future::Future;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use console_protocols::error::ServiceError;
use console_protocols::service::{service_fn, ServiceArgs, ServiceHandler};

/// Registry mapping dotted service names (`<owner>.<verb>`) to handlers.
///
/// The registry does not track ownership. Any caller may unregister any
/// name; the `<owner>.` prefix is a naming convention only.
pub struct ServiceRegistry {
    services: DashMap<String, Arc<dyn ServiceHandler>>,
}

impl ServiceRegistry {
    /// Create a new service registry.
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
        }
    }

    /// Bind a handler to a name.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRegistered` if the name is bound; the existing handler
    /// is kept.
    pub fn register(
        &self,
        name: impl Into<String>,
        handler: Arc<dyn ServiceHandler>,
    ) -> Result<(), ServiceError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ServiceError::InvalidArgument(
                "service name must not be empty".to_string(),
            ));
        }

        match self.services.entry(name) {
            Entry::Occupied(entry) => Err(ServiceError::AlreadyRegistered(entry.key().clone())),
            Entry::Vacant(entry) => {
                debug!(service = %entry.key(), "Service registered");
                entry.insert(handler);
                Ok(())
            }
        }
    }

    /// Bind an async closure to a name.
    pub fn register_fn<F, Fut>(&self, name: impl Into<String>, f: F) -> Result<(), ServiceError>
    where
        F: Fn(ServiceArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ServiceError>> + Send + 'static,
    {
        self.register(name, service_fn(f))
    }

    /// Remove a binding. Returns whether a binding existed.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.services.remove(name).is_some();
        if removed {
            debug!(service = %name, "Service unregistered");
        }
        removed
    }

    /// Remove every service named `<owner>.*`. Returns how many were removed.
    pub fn unregister_owner(&self, owner: &str) -> usize {
        let prefix = format!("{}.", owner);
        let names: Vec<String> = self
            .services
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .map(|entry| entry.key().clone())
            .collect();

        names.iter().filter(|name| self.unregister(name)).count()
    }

    /// Check whether a name is bound.
    pub fn has_service(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Get the handler bound to a name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ServiceHandler>> {
        self.services.get(name).map(|entry| entry.value().clone())
    }

    /// Invoke a service.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the name is unbound, otherwise whatever the
    /// handler returns.
    pub async fn call(&self, name: &str, args: ServiceArgs) -> Result<Value, ServiceError> {
        // clone out of the map so no shard lock is held across the await
        let handler = self
            .get(name)
            .ok_or_else(|| ServiceError::NotFound(name.to_string()))?;
        handler.call(args).await
    }

    /// Invoke a service with a JSON value converted by [`ServiceArgs::from_value`].
    pub async fn call_value(&self, name: &str, value: Value) -> Result<Value, ServiceError> {
        self.call(name, ServiceArgs::from_value(value)).await
    }

    /// Snapshot of bound names, sorted.
    pub fn list_services(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of bound services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
