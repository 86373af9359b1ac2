//! Runtime handle handed to module factories.

use std::sync::{Arc, Weak};

use console_protocols::log::Logger;
use console_protocols::storage::Storage;

use crate::manager::ModuleManager;
use crate::registry::{EventBus, HttpRegistry, ServiceRegistry};
use crate::reporter::ServiceLogger;

/// Everything a module may touch, scoped to one module.
///
/// The manager is held weakly: modules live inside it, so a strong
/// reference would keep the table alive forever.
#[derive(Clone)]
pub struct ModuleContext {
    /// Name of the module this context was built for.
    pub module_name: String,

    /// The module's `[modules.<name>]` table, or `Null`.
    pub config: serde_json::Value,

    pub services: Arc<ServiceRegistry>,
    pub events: Arc<EventBus>,
    pub http: Arc<HttpRegistry>,
    pub storage: Arc<dyn Storage>,

    modules: Weak<ModuleManager>,
}

impl ModuleContext {
    pub fn new(
        module_name: impl Into<String>,
        config: serde_json::Value,
        services: Arc<ServiceRegistry>,
        events: Arc<EventBus>,
        http: Arc<HttpRegistry>,
        storage: Arc<dyn Storage>,
        modules: Weak<ModuleManager>,
    ) -> Self {
        Self {
            module_name: module_name.into(),
            config,
            services,
            events,
            http,
            storage,
            modules,
        }
    }

    /// Same handles, different module.
    pub fn for_module(&self, module_name: impl Into<String>, config: serde_json::Value) -> Self {
        Self {
            module_name: module_name.into(),
            config,
            ..self.clone()
        }
    }

    /// Get a config value.
    pub fn get_config<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.config
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// The module manager, while the runtime is alive.
    pub fn modules(&self) -> Option<Arc<ModuleManager>> {
        self.modules.upgrade()
    }

    /// Logging capability backed by the `logger.log` service.
    pub fn logger(&self) -> Arc<dyn Logger> {
        Arc::new(ServiceLogger::new(self.services.clone()))
    }
}
