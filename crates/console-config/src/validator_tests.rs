use super::*;
use std::path::PathBuf;

const MODULES: [(&str, bool); 3] = [("logger", true), ("devices", true), ("admin", false)];

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config, &MODULES).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_invalid_port() {
    let mut config = Config::default();
    config.server.port = 0;

    let result = ConfigValidator::validate(&config, &MODULES).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "server.port"));
}

#[test]
fn test_validate_empty_host() {
    let mut config = Config::default();
    config.server.host = String::new();

    let result = ConfigValidator::validate(&config, &MODULES).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "server.host"));
}

#[test]
fn test_validate_long_grace_period_warning() {
    let mut config = Config::default();
    config.server.grace_period_ms = 120_000;

    let result = ConfigValidator::validate(&config, &MODULES).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "server.grace_period_ms"));
}

#[test]
fn test_validate_unknown_backend() {
    let mut config = Config::default();
    config.storage.backend = "redis".to_string();

    let result = ConfigValidator::validate(&config, &MODULES).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "storage.backend"));
}

#[test]
fn test_validate_sqlite_requires_path() {
    let mut config = Config::default();
    config.storage.backend = "sqlite".to_string();

    let result = ConfigValidator::validate(&config, &MODULES).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "storage.path"));

    config.storage.path = Some(PathBuf::from("/tmp/console.db"));
    let result = ConfigValidator::validate(&config, &MODULES).unwrap();
    assert!(result.is_valid());
}

#[test]
fn test_validate_memory_with_path_warning() {
    let mut config = Config::default();
    config.storage.path = Some(PathBuf::from("/tmp/console.db"));

    let result = ConfigValidator::validate(&config, &MODULES).unwrap();
    assert!(result.is_valid());
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_validate_unknown_log_level_warning() {
    let mut config = Config::default();
    config.logging.level = "verbose".to_string();

    let result = ConfigValidator::validate(&config, &MODULES).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "logging.level"));
}

#[test]
fn test_validate_disabling_required_module() {
    let mut config = Config::default();
    config.modules.disabled = vec!["devices".to_string(), "admin".to_string()];

    let result = ConfigValidator::validate(&config, &MODULES).unwrap();
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].message.contains("devices"));
}

#[test]
fn test_validate_unknown_module_warnings() {
    let mut config = Config::default();
    config.modules.disabled = vec!["zigbee".to_string()];
    config
        .modules
        .settings
        .insert("thermostat".to_string(), serde_json::json!({}));

    let result = ConfigValidator::validate(&config, &MODULES).unwrap();
    assert!(result.is_valid());
    assert_eq!(result.warnings.len(), 2);
}

#[test]
fn test_into_result() {
    let mut config = Config::default();
    config.server.port = 0;
    config.storage.backend = "redis".to_string();

    let err = ConfigValidator::validate(&config, &MODULES)
        .unwrap()
        .into_result()
        .unwrap_err();
    let display = err.to_string();
    assert!(display.contains("server.port"));
    assert!(display.contains("storage.backend"));

    let ok = ConfigValidator::validate(&Config::default(), &MODULES)
        .unwrap()
        .into_result()
        .unwrap();
    assert!(ok.is_empty());
}
