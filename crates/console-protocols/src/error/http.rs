//! HTTP contract registry errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpContractError {
    #[error("HTTP contract conflict on {method} {path}: bound to {existing}, requested {requested}")]
    Conflict {
        method: String,
        path: String,
        existing: String,
        requested: String,
    },

    #[error("Invalid HTTP path: {0}")]
    InvalidPath(String),

    #[error("HTTP contract for {0} has no service name")]
    MissingService(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_error() {
        let err = HttpContractError::Conflict {
            method: "GET".to_string(),
            path: "/x".to_string(),
            existing: "a.list".to_string(),
            requested: "b.list".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("GET /x"));
        assert!(display.contains("a.list"));
        assert!(display.contains("b.list"));
    }
}
