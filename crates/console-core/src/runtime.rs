//! Composition root: owns every registry and drives module lifecycle.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::{error, info, warn};

use console_protocols::error::ModuleError;
use console_protocols::log::LogLevel;
use console_protocols::storage::Storage;

use crate::context::ModuleContext;
use crate::lifecycle::{RuntimeState, ShutdownSignal, StateCell};
use crate::manager::ModuleManager;
use crate::registry::{EventBus, HttpRegistry, ServiceRegistry};
use crate::reporter::{self, ServiceLogger};
use crate::spec::ModuleCatalog;

/// The console runtime.
///
/// There is exactly one per process. Modules reach its registries through
/// the [`ModuleContext`] their factory receives.
pub struct CoreRuntime {
    catalog: ModuleCatalog,
    manager: Arc<ModuleManager>,
    services: Arc<ServiceRegistry>,
    events: Arc<EventBus>,
    http: Arc<HttpRegistry>,
    storage: Arc<dyn Storage>,
    module_config: HashMap<String, Value>,
    state: StateCell,
    shutdown: ShutdownSignal,
}

impl CoreRuntime {
    /// Create a runtime over `catalog`, persisting through `storage`.
    pub fn new(catalog: ModuleCatalog, storage: Arc<dyn Storage>) -> Self {
        let services = Arc::new(ServiceRegistry::new());
        let manager = Arc::new(ModuleManager::from_catalog(&catalog));
        manager.set_logger(Arc::new(ServiceLogger::new(services.clone())));

        Self {
            catalog,
            manager,
            services,
            events: Arc::new(EventBus::new()),
            http: Arc::new(HttpRegistry::new()),
            storage,
            module_config: HashMap::new(),
            state: StateCell::new(),
            shutdown: ShutdownSignal::new(),
        }
    }

    /// Per-module configuration, keyed by module name.
    pub fn with_module_config(mut self, config: HashMap<String, Value>) -> Self {
        self.module_config = config;
        self
    }

    /// Handle for a module named `name`.
    pub fn context_for(&self, name: &str) -> ModuleContext {
        ModuleContext::new(
            name,
            self.module_config.get(name).cloned().unwrap_or(Value::Null),
            self.services.clone(),
            self.events.clone(),
            self.http.clone(),
            self.storage.clone(),
            Arc::downgrade(&self.manager),
        )
    }

    /// Build and register every catalog module in catalog order.
    ///
    /// A required module that fails to build or register aborts with its
    /// error. A failing optional module is reported and left out.
    pub async fn register_modules(&self) -> Result<(), ModuleError> {
        for spec in self.catalog.specs() {
            let module = (spec.factory)(&self.context_for(&spec.name));
            if module.name() != spec.name {
                return Err(ModuleError::Custom(format!(
                    "Module built for spec '{}' is named '{}'",
                    spec.name,
                    module.name()
                )));
            }

            if let Err(e) = self.manager.register(module.clone()).await {
                if spec.required {
                    error!(module = %spec.name, error = %e, "Required module failed to register");
                    self.state.set(RuntimeState::Failed);
                    return Err(e);
                }
                // a duplicate never ran its hook and the entry is someone else's
                if !matches!(e, ModuleError::DuplicateModule(_)) {
                    if let Err(stop_err) = module.stop().await {
                        warn!(module = %spec.name, error = %stop_err, "Cleanup of failed module failed");
                    }
                    self.manager.unregister(&spec.name);
                }
                let mut context = Map::new();
                context.insert("module".to_string(), json!(spec.name));
                context.insert("error".to_string(), Value::String(e.to_string()));
                reporter::report(
                    Some(Arc::new(ServiceLogger::new(self.services.clone()))),
                    LogLevel::Warning,
                    "Optional module failed to register",
                    context,
                )
                .await;
            }
        }

        info!(count = self.manager.len(), "Modules registered");
        Ok(())
    }

    /// Start every registered module.
    ///
    /// Starting again after [`stop`](Self::stop) first re-runs every
    /// module's `register()` hook, since stopping withdrew its services and
    /// contracts.
    pub async fn start(&self) -> Result<(), ModuleError> {
        let previous = self.state.transition(
            &[RuntimeState::Created, RuntimeState::Stopped],
            RuntimeState::Starting,
        )?;
        info!("Starting runtime...");

        let result = async {
            if previous == RuntimeState::Stopped {
                self.manager.reregister_stopped().await?;
            }
            self.manager.check_required_modules_registered()?;
            self.manager.start_all().await
        }
        .await;

        match result {
            Ok(()) => {
                self.state.set(RuntimeState::Running);
                info!("Runtime running");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Runtime failed to start");
                self.state.set(RuntimeState::Failed);
                Err(e)
            }
        }
    }

    /// Stop every module and fire the shutdown signal.
    ///
    /// Returns the names of modules whose `stop()` failed.
    pub async fn stop(&self) -> Result<Vec<String>, ModuleError> {
        self.state.transition(
            &[RuntimeState::Running, RuntimeState::Failed],
            RuntimeState::ShuttingDown,
        )?;
        info!("Stopping runtime...");

        let failed = self.manager.stop_all().await;
        if !failed.is_empty() {
            warn!(modules = ?failed, "Some modules failed to stop");
        }

        self.shutdown.trigger();
        self.state.set(RuntimeState::Stopped);
        info!("Runtime stopped");
        Ok(failed)
    }

    pub fn state(&self) -> RuntimeState {
        self.state.get()
    }

    pub fn is_running(&self) -> bool {
        self.state.get() == RuntimeState::Running
    }

    /// Get shutdown signal for graceful shutdown.
    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    pub fn modules(&self) -> &Arc<ModuleManager> {
        &self.manager
    }

    pub fn services(&self) -> &Arc<ServiceRegistry> {
        &self.services
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn http(&self) -> &Arc<HttpRegistry> {
        &self.http
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
