//! Top-level protocol error type.

use thiserror::Error;

use super::{EventError, HttpContractError, LogError, ModuleError, ServiceError, StorageError};

/// Top-level protocol error type.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Module error: {0}")]
    Module(#[from] ModuleError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("HTTP contract error: {0}")]
    Http(#[from] HttpContractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Log error: {0}")]
    Log(#[from] LogError),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_error_from() {
        let err = ProtocolError::from(ModuleError::NotFound("x".to_string()));
        assert!(err.to_string().contains("Module error"));
    }

    #[test]
    fn test_service_error_from() {
        let err = ProtocolError::from(ServiceError::NotFound("x.y".to_string()));
        assert!(err.to_string().contains("Service error"));
    }

    #[test]
    fn test_storage_error_from() {
        let err = ProtocolError::from(StorageError::Backend("locked".to_string()));
        assert!(err.to_string().contains("Storage error"));
    }

    #[test]
    fn test_validation_error() {
        let err = ProtocolError::Validation("bad name".to_string());
        assert!(err.to_string().contains("bad name"));
    }

    #[test]
    fn test_all_error_variants() {
        let errors: Vec<ProtocolError> = vec![
            ModuleError::EmptyName.into(),
            ServiceError::Failed("a".to_string()).into(),
            EventError::HandlerFailed("b".to_string()).into(),
            HttpContractError::InvalidPath("c".to_string()).into(),
            StorageError::Connection("d".to_string()).into(),
            LogError::Unavailable("e".to_string()).into(),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
