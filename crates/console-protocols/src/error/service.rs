//! Service registry errors.

use thiserror::Error;

use super::StorageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Service not found: {0}")]
    NotFound(String),

    #[error("Service already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Service call failed: {0}")]
    Failed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServiceError {
    /// Shorthand for an argument that was expected but not supplied.
    pub fn missing(name: &str) -> Self {
        ServiceError::InvalidArgument(format!("missing argument '{}'", name))
    }
}
