//! HTTP contract registry.
//!
//! Modules declare which service serves which route; the gateway reads the
//! snapshot and builds the actual router.

use parking_lot::RwLock;
use tracing::debug;

use console_protocols::error::HttpContractError;
use console_protocols::http::{normalize_path, HttpContract, HttpMethod};

/// Ordered table of HTTP contracts, unique per `(method, path)`.
pub struct HttpRegistry {
    contracts: RwLock<Vec<HttpContract>>,
}

impl HttpRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            contracts: RwLock::new(Vec::new()),
        }
    }

    /// Register a contract.
    ///
    /// Re-registering the same route for the same service is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the route is already bound to another service.
    pub fn register(&self, mut contract: HttpContract) -> Result<(), HttpContractError> {
        contract.path = normalize_path(&contract.path);
        if contract.service.is_empty() {
            return Err(HttpContractError::MissingService(format!(
                "{} {}",
                contract.method, contract.path
            )));
        }
        if contract.path.chars().any(char::is_whitespace) {
            return Err(HttpContractError::InvalidPath(contract.path));
        }

        let mut contracts = self.contracts.write();
        if let Some(existing) = contracts
            .iter()
            .find(|c| c.method == contract.method && c.path == contract.path)
        {
            if existing.service == contract.service {
                return Ok(());
            }
            return Err(HttpContractError::Conflict {
                method: contract.method.to_string(),
                path: contract.path,
                existing: existing.service.clone(),
                requested: contract.service,
            });
        }

        debug!(method = %contract.method, path = %contract.path, service = %contract.service, "HTTP contract registered");
        contracts.push(contract);
        Ok(())
    }

    /// Register several contracts, stopping at the first failure.
    pub fn register_all(
        &self,
        contracts: impl IntoIterator<Item = HttpContract>,
    ) -> Result<(), HttpContractError> {
        for contract in contracts {
            self.register(contract)?;
        }
        Ok(())
    }

    /// Find the contract serving a route. The path is normalized first.
    pub fn resolve(&self, method: HttpMethod, path: &str) -> Option<HttpContract> {
        let path = normalize_path(path);
        self.contracts
            .read()
            .iter()
            .find(|c| c.method == method && c.path == path)
            .cloned()
    }

    /// Remove a single route. Returns whether it existed.
    pub fn remove(&self, method: HttpMethod, path: &str) -> bool {
        let path = normalize_path(path);
        let mut contracts = self.contracts.write();
        let before = contracts.len();
        contracts.retain(|c| !(c.method == method && c.path == path));
        contracts.len() != before
    }

    /// Remove every contract owned by a component. Returns how many were removed.
    pub fn clear_owner(&self, owner: &str) -> usize {
        let mut contracts = self.contracts.write();
        let before = contracts.len();
        contracts.retain(|c| c.owner() != owner);
        let removed = before - contracts.len();
        if removed > 0 {
            debug!(owner = %owner, removed, "HTTP contracts cleared");
        }
        removed
    }

    /// Snapshot of every contract in registration order.
    pub fn list(&self) -> Vec<HttpContract> {
        self.contracts.read().clone()
    }

    /// Number of contracts.
    pub fn len(&self) -> usize {
        self.contracts.read().len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.contracts.read().is_empty()
    }
}

impl Default for HttpRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
