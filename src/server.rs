//! Runtime assembly and the foreground run loop.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use console_builtins::builtin_catalog;
use console_config::{Config, ConfigValidator, LoggingConfig, StorageConfig};
use console_core::{CoreRuntime, MemoryStorage, ModuleCatalog};
use console_protocols::error::{ModuleError, StorageError};
use console_protocols::storage::Storage;
use console_storage_sqlite::SqliteStorage;

/// Initialize tracing with console and file output.
///
/// `RUST_LOG` wins over the configured level. Files rotate daily under
/// `logging.dir`.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&logging.dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("homeconsole")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&logging.dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Dropping the guard stops the file writer.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// `(name, required)` pairs of every built-in module.
pub(crate) fn known_modules(catalog: &ModuleCatalog) -> Vec<(&str, bool)> {
    catalog
        .specs()
        .iter()
        .map(|spec| (spec.name.as_str(), spec.required))
        .collect()
}

/// Validate `config` against the built-in catalog and log the warnings.
pub(crate) fn validate(config: &Config) -> Result<ModuleCatalog, Box<dyn std::error::Error>> {
    let catalog = builtin_catalog()?;
    let warnings = ConfigValidator::validate(config, &known_modules(&catalog))?.into_result()?;
    for warning in &warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }
    Ok(catalog)
}

/// Drop the modules listed in `modules.disabled`.
fn apply_disabled(catalog: &mut ModuleCatalog, disabled: &[String]) -> Result<(), ModuleError> {
    for name in disabled {
        match catalog.disable(name) {
            Ok(()) => info!(module = %name, "Module disabled"),
            Err(ModuleError::NotFound(_)) => warn!(module = %name, "Unknown module in disabled list"),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

pub(crate) async fn open_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>, StorageError> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryStorage::new())),
        "sqlite" => match &config.path {
            Some(path) => {
                info!(path = %path.display(), "Opening SQLite storage");
                Ok(Arc::new(SqliteStorage::open(path).await?))
            }
            None => Ok(Arc::new(SqliteStorage::in_memory().await?)),
        },
        other => Err(StorageError::Backend(format!("unknown storage backend '{}'", other))),
    }
}

/// Per-module settings with the `[server]` section folded into `http`.
///
/// Keys under `[modules.http]` take precedence over `[server]`.
pub(crate) fn module_settings(config: &Config) -> Result<HashMap<String, Value>, serde_json::Error> {
    let mut settings = config.module_config();

    let mut gateway = match serde_json::to_value(&config.server)? {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    if let Some(Value::Object(overrides)) = settings.get("http") {
        gateway.extend(overrides.clone());
    }
    settings.insert("http".to_string(), Value::Object(gateway));
    Ok(settings)
}

/// Run the console in foreground until Ctrl+C or an internal shutdown.
pub(crate) async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting homeconsole v{}", env!("CARGO_PKG_VERSION"));

    let mut catalog = validate(&config)?;
    apply_disabled(&mut catalog, &config.modules.disabled)?;

    let storage = open_storage(&config.storage).await?;
    info!(backend = storage.id(), "Storage ready");

    let runtime = CoreRuntime::new(catalog, storage).with_module_config(module_settings(&config)?);
    runtime.register_modules().await?;

    if let Err(e) = runtime.start().await {
        error!(error = %e, "Startup failed, stopping registered modules");
        if let Err(stop_err) = runtime.stop().await {
            error!(error = %stop_err, "Cleanup after failed startup failed");
        }
        return Err(e.into());
    }

    info!("homeconsole ready:");
    for name in runtime.modules().list_modules() {
        info!("  module  {}", name);
    }
    if runtime.modules().get_module("http").is_some() {
        info!("  gateway http://{}:{}", config.server.host, config.server.port);
    }

    let mut shutdown = runtime.shutdown_signal().subscribe();
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Received Ctrl+C");
        }
        _ = shutdown.recv() => {
            info!("Shutdown requested");
        }
    }

    info!("Shutting down...");
    let failed = runtime.stop().await?;
    if !failed.is_empty() {
        warn!(modules = ?failed, "Modules failed to stop cleanly");
    }
    Ok(())
}
