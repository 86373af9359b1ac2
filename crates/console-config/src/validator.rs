//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

const STORAGE_BACKENDS: [&str; 2] = ["memory", "sqlite"];
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Collapse the errors into a single [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        if self.errors.is_empty() {
            return Ok(self.warnings);
        }
        Err(ConfigError::Invalid(
            self.errors
                .iter()
                .map(|e| format!("{}: {}", e.path, e.message))
                .collect(),
        ))
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration against the known modules, given as
    /// `(name, required)` pairs.
    pub fn validate(
        config: &Config,
        modules: &[(&str, bool)],
    ) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_storage(config, &mut result);
        Self::validate_logging(config, &mut result);
        Self::validate_modules(config, modules, &mut result);

        Ok(result)
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }

        if config.server.grace_period_ms > 60_000 {
            result.add_warning(ValidationWarning::new(
                "server.grace_period_ms",
                "Grace period is over a minute, routes will be late to appear",
            ));
        }
    }

    fn validate_storage(config: &Config, result: &mut ValidationResult) {
        let backend = config.storage.backend.as_str();
        if !STORAGE_BACKENDS.contains(&backend) {
            result.add_error(ValidationError::new(
                "storage.backend",
                format!(
                    "Unknown storage backend '{}', valid values: {:?}",
                    backend, STORAGE_BACKENDS
                ),
            ));
        }

        if backend == "sqlite" && config.storage.path.is_none() {
            result.add_error(ValidationError::new(
                "storage.path",
                "SQLite backend requires a path",
            ));
        }

        if backend == "memory" && config.storage.path.is_some() {
            result.add_warning(ValidationWarning::new(
                "storage.path",
                "Path is ignored by the memory backend",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let level = config.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                format!("Unrecognized level '{}', using it as a filter directive", level),
            ));
        }
    }

    fn validate_modules(
        config: &Config,
        modules: &[(&str, bool)],
        result: &mut ValidationResult,
    ) {
        for name in &config.modules.disabled {
            match modules.iter().find(|(n, _)| n == name) {
                Some((_, true)) => result.add_error(ValidationError::new(
                    "modules.disabled",
                    format!("Module '{}' is required and cannot be disabled", name),
                )),
                Some((_, false)) => {}
                None => result.add_warning(ValidationWarning::new(
                    "modules.disabled",
                    format!("Unknown module '{}'", name),
                )),
            }
        }

        for name in config.modules.settings.keys() {
            if !modules.iter().any(|(n, _)| n == name) {
                result.add_warning(ValidationWarning::new(
                    format!("modules.{}", name),
                    "Settings for an unknown module are ignored",
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
