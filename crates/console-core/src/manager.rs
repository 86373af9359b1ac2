//! Module manager: the registered-module table and its lifecycle ordering.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, error, info, warn};

use console_protocols::error::ModuleError;
use console_protocols::log::{LogLevel, Logger};
use console_protocols::module::Module;

use crate::reporter;
use crate::spec::ModuleCatalog;

/// Per-module lifecycle state as observed by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    /// Inserted, `register()` hook still running.
    Pending,
    Registered,
    Started,
    Stopped,
    /// The last hook returned an error.
    Failed,
}

struct ModuleEntry {
    name: String,
    module: Arc<dyn Module>,
    state: ModuleState,
}

/// Snapshot of one registered module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    pub name: String,
    pub required: bool,
    pub state: ModuleState,
}

/// Registered-module table.
///
/// Insertion order is preserved; `start_all` and `stop_all` both walk it in
/// that order. The table lock is never held while a hook runs.
pub struct ModuleManager {
    entries: RwLock<Vec<ModuleEntry>>,
    declared: RwLock<Vec<(String, bool)>>,
    logger: RwLock<Option<Arc<dyn Logger>>>,
}

impl ModuleManager {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            declared: RwLock::new(Vec::new()),
            logger: RwLock::new(None),
        }
    }

    /// Create a manager that knows which modules of `catalog` are required.
    pub fn from_catalog(catalog: &ModuleCatalog) -> Self {
        let manager = Self::new();
        for spec in catalog.specs() {
            manager.declare(spec.name.clone(), spec.required);
        }
        manager
    }

    /// Declare a module spec. Redeclaring a name updates its `required` flag.
    pub fn declare(&self, name: impl Into<String>, required: bool) {
        let name = name.into();
        let mut declared = self.declared.write();
        match declared.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = required,
            None => declared.push((name, required)),
        }
    }

    /// Install the logger used to report lifecycle failures.
    pub fn set_logger(&self, logger: Arc<dyn Logger>) {
        *self.logger.write() = Some(logger);
    }

    fn is_required(&self, name: &str) -> bool {
        self.declared
            .read()
            .iter()
            .any(|(n, required)| n == name && *required)
    }

    /// Register a module and run its `register()` hook.
    ///
    /// Registering the instance already present under its name is a no-op.
    /// A hook error is returned unchanged; the module stays in the table
    /// marked [`ModuleState::Failed`].
    pub async fn register(&self, module: Arc<dyn Module>) -> Result<(), ModuleError> {
        let name = module.name().to_string();
        if name.is_empty() {
            return Err(ModuleError::EmptyName);
        }

        {
            let mut entries = self.entries.write();
            if let Some(existing) = entries.iter().find(|e| e.name == name) {
                if std::ptr::addr_eq(Arc::as_ptr(&existing.module), Arc::as_ptr(&module)) {
                    debug!(module = %name, "Module already registered");
                    return Ok(());
                }
                return Err(ModuleError::DuplicateModule(name));
            }
            entries.push(ModuleEntry {
                name: name.clone(),
                module: module.clone(),
                state: ModuleState::Pending,
            });
        }

        match module.register().await {
            Ok(()) => {
                self.set_state(&name, ModuleState::Registered);
                info!(module = %name, "Module registered");
                Ok(())
            }
            Err(e) => {
                self.set_state(&name, ModuleState::Failed);
                warn!(module = %name, error = %e, "Module register hook failed");
                Err(e)
            }
        }
    }

    /// Remove a module from the table without calling `stop()`.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn Module>> {
        let mut entries = self.entries.write();
        let index = entries.iter().position(|e| e.name == name)?;
        Some(entries.remove(index).module)
    }

    pub fn get_module(&self, name: &str) -> Option<Arc<dyn Module>> {
        self.entries
            .read()
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.module.clone())
    }

    /// Registered module names in registration order.
    pub fn list_modules(&self) -> Vec<String> {
        self.entries.read().iter().map(|e| e.name.clone()).collect()
    }

    pub fn state(&self, name: &str) -> Option<ModuleState> {
        self.entries
            .read()
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.state)
    }

    /// Snapshot of every registered module.
    pub fn module_info(&self) -> Vec<ModuleInfo> {
        let snapshot: Vec<(String, ModuleState)> = self
            .entries
            .read()
            .iter()
            .map(|e| (e.name.clone(), e.state))
            .collect();
        snapshot
            .into_iter()
            .map(|(name, state)| ModuleInfo {
                required: self.is_required(&name),
                name,
                state,
            })
            .collect()
    }

    fn set_state(&self, name: &str, state: ModuleState) {
        if let Some(entry) = self.entries.write().iter_mut().find(|e| e.name == name) {
            entry.state = state;
        }
    }

    fn snapshot(&self) -> Vec<(String, Arc<dyn Module>)> {
        self.entries
            .read()
            .iter()
            .map(|e| (e.name.clone(), e.module.clone()))
            .collect()
    }

    /// Re-run the `register()` hook of every stopped module.
    ///
    /// `stop()` withdraws what `register()` published, so a stopped module
    /// must register again before it can start. A module whose hook fails is
    /// stopped to undo any partial registration. A required failure is
    /// returned and the module stays marked [`ModuleState::Failed`]; an
    /// optional one is reported and dropped from the table.
    pub async fn reregister_stopped(&self) -> Result<(), ModuleError> {
        for (name, module) in self.snapshot() {
            if self.state(&name) != Some(ModuleState::Stopped) {
                continue;
            }

            match module.register().await {
                Ok(()) => {
                    self.set_state(&name, ModuleState::Registered);
                    debug!(module = %name, "Module registered again");
                }
                Err(e) => {
                    self.set_state(&name, ModuleState::Failed);
                    if let Err(stop_err) = module.stop().await {
                        self.report(LogLevel::Error, "Module failed to stop", &name, &stop_err)
                            .await;
                    }
                    if self.is_required(&name) {
                        return Err(e);
                    }
                    self.unregister(&name);
                    self.report(LogLevel::Warning, "Optional module failed to register", &name, &e)
                        .await;
                }
            }
        }
        Ok(())
    }

    /// Start every module in registration order.
    ///
    /// Stops at the first required module that fails. Optional failures are
    /// reported and skipped.
    pub async fn start_all(&self) -> Result<(), ModuleError> {
        for (name, module) in self.snapshot() {
            match module.start().await {
                Ok(()) => {
                    self.set_state(&name, ModuleState::Started);
                    debug!(module = %name, "Module started");
                }
                Err(e) => {
                    self.set_state(&name, ModuleState::Failed);
                    if self.is_required(&name) {
                        return Err(ModuleError::RequiredModuleStart {
                            module: name,
                            source: Box::new(e),
                        });
                    }
                    self.report(LogLevel::Warning, "Optional module failed to start", &name, &e)
                        .await;
                }
            }
        }
        Ok(())
    }

    /// Stop every module in registration order.
    ///
    /// Never fails; returns the names of modules whose `stop()` errored.
    pub async fn stop_all(&self) -> Vec<String> {
        let mut failed = Vec::new();
        for (name, module) in self.snapshot() {
            match module.stop().await {
                Ok(()) => {
                    self.set_state(&name, ModuleState::Stopped);
                    debug!(module = %name, "Module stopped");
                }
                Err(e) => {
                    self.set_state(&name, ModuleState::Failed);
                    self.report(LogLevel::Error, "Module failed to stop", &name, &e)
                        .await;
                    failed.push(name);
                }
            }
        }
        failed
    }

    /// Error unless every declared required module has an entry.
    pub fn check_required_modules_registered(&self) -> Result<(), ModuleError> {
        let registered = self.list_modules();
        let missing: Vec<String> = self
            .declared
            .read()
            .iter()
            .filter(|(name, required)| *required && !registered.contains(name))
            .map(|(name, _)| name.clone())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ModuleError::MissingRequired(missing))
        }
    }

    /// Empty the table without running any hook.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    async fn report(&self, level: LogLevel, message: &str, module: &str, error: &ModuleError) {
        match level {
            LogLevel::Debug => debug!(module = %module, error = %error, "{}", message),
            LogLevel::Info => info!(module = %module, error = %error, "{}", message),
            LogLevel::Warning => warn!(module = %module, error = %error, "{}", message),
            LogLevel::Error => error!(module = %module, error = %error, "{}", message),
        }
        let logger = self.logger.read().clone();
        let mut context = Map::new();
        context.insert("module".to_string(), json!(module));
        context.insert("error".to_string(), Value::String(error.to_string()));
        reporter::report(logger, level, message, context).await;
    }
}

impl Default for ModuleManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
