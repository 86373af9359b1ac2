//! Logging capability errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Logging capability unavailable: {0}")]
    Unavailable(String),

    #[error("Log write failed: {0}")]
    Failed(String),
}
