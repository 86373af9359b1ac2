//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub modules: ModulesConfig,
}

impl Config {
    /// Per-module settings as JSON, keyed by module name.
    pub fn module_config(&self) -> HashMap<String, serde_json::Value> {
        self.modules.settings.clone()
    }
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Delay before the gateway snapshots the HTTP contract table.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            grace_period_ms: default_grace_period_ms(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8123
}

fn default_grace_period_ms() -> u64 {
    500
}

/// Storage backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `memory` or `sqlite`.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Database file, required for `sqlite`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
        }
    }
}

fn default_backend() -> String {
    "memory".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for the rolling log file.
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: default_log_dir(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".homeconsole")
        .join("logs")
}

/// Module selection and per-module settings.
///
/// ```toml
/// [modules]
/// disabled = ["admin"]
///
/// [modules.presence]
/// members = ["alice", "bob"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModulesConfig {
    /// Optional modules to leave out.
    #[serde(default)]
    pub disabled: Vec<String>,

    /// Every other `[modules.<name>]` table.
    #[serde(flatten)]
    pub settings: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
