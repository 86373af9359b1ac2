//! Event bus errors.

use thiserror::Error;

use super::ServiceError;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event handler failed: {0}")]
    HandlerFailed(String),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
