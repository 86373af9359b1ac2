//! Module lifecycle errors.

use thiserror::Error;

use super::{EventError, HttpContractError, ServiceError, StorageError};

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("Module name must not be empty")]
    EmptyName,

    #[error("Module already registered with a different instance: {0}")]
    DuplicateModule(String),

    #[error("Module spec declared more than once: {0}")]
    DuplicateSpec(String),

    #[error("Required module failed to start: {module}: {source}")]
    RequiredModuleStart {
        module: String,
        #[source]
        source: Box<ModuleError>,
    },

    #[error("Required modules not registered: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("Module not found: {0}")]
    NotFound(String),

    #[error("Module registration failed: {0}")]
    RegistrationFailed(String),

    #[error("Module start failed: {0}")]
    StartFailed(String),

    #[error("Module stop failed: {0}")]
    StopFailed(String),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("HTTP contract error: {0}")]
    Http(#[from] HttpContractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Custom(String),
}

impl ModuleError {
    /// Name of the module a required-start failure refers to.
    pub fn failed_module(&self) -> Option<&str> {
        match self {
            ModuleError::RequiredModuleStart { module, .. } => Some(module),
            _ => None,
        }
    }
}
