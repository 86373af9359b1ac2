//! The `logger` module.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use console_core::ModuleContext;
use console_protocols::error::{ModuleError, ServiceError};
use console_protocols::http::HttpContract;
use console_protocols::log::LogLevel;
use console_protocols::module::Module;
use console_protocols::service::ServiceArgs;

use crate::buffer::{LogBuffer, LogEntry};

pub const LOGGER_MODULE: &str = "logger";

const DEFAULT_CAPACITY: usize = 200;
const DEFAULT_RECENT_LIMIT: usize = 50;

/// Exposes the logging capability as services.
///
/// Settings: `capacity` (entries kept for `logger.recent`).
pub struct LoggerModule {
    ctx: ModuleContext,
    buffer: Arc<LogBuffer>,
}

impl LoggerModule {
    pub fn new(ctx: ModuleContext) -> Self {
        let capacity = ctx.get_config::<usize>("capacity").unwrap_or(DEFAULT_CAPACITY);
        Self {
            ctx,
            buffer: Arc::new(LogBuffer::new(capacity)),
        }
    }

    /// Factory for the module catalog.
    pub fn build(ctx: &ModuleContext) -> Arc<dyn Module> {
        Arc::new(Self::new(ctx.clone()))
    }

    pub fn buffer(&self) -> &Arc<LogBuffer> {
        &self.buffer
    }
}

fn emit(level: LogLevel, message: &str, context: &Map<String, Value>) {
    let context = Value::Object(context.clone());
    match level {
        LogLevel::Debug => debug!(target: "homeconsole::log", %context, "{}", message),
        LogLevel::Info => info!(target: "homeconsole::log", %context, "{}", message),
        LogLevel::Warning => warn!(target: "homeconsole::log", %context, "{}", message),
        LogLevel::Error => error!(target: "homeconsole::log", %context, "{}", message),
    }
}

fn parse_level(args: &ServiceArgs, key: &str, default: LogLevel) -> Result<LogLevel, ServiceError> {
    match args.get::<String>(key)? {
        Some(text) => text
            .parse()
            .map_err(|e: console_protocols::error::LogError| {
                ServiceError::InvalidArgument(e.to_string())
            }),
        None => Ok(default),
    }
}

#[async_trait]
impl Module for LoggerModule {
    fn name(&self) -> &str {
        LOGGER_MODULE
    }

    async fn register(&self) -> Result<(), ModuleError> {
        let buffer = self.buffer.clone();
        self.ctx.services.register_fn("logger.log", move |args: ServiceArgs| {
            let buffer = buffer.clone();
            async move {
                let level = parse_level(&args, "level", LogLevel::Info)?;
                let message: String = args.require("message")?;
                let context: Map<String, Value> = args.get_or("context", Map::new())?;

                emit(level, &message, &context);
                buffer.push(LogEntry {
                    timestamp: Utc::now(),
                    level,
                    message,
                    context,
                });
                Ok(Value::Null)
            }
        })?;

        let buffer = self.buffer.clone();
        self.ctx.services.register_fn("logger.recent", move |args: ServiceArgs| {
            let buffer = buffer.clone();
            async move {
                let limit = args.get_or("limit", DEFAULT_RECENT_LIMIT)?;
                let min_level = parse_level(&args, "level", LogLevel::Debug)?;
                Ok(serde_json::to_value(buffer.recent(limit, min_level))?)
            }
        })?;

        self.ctx.http.register(
            HttpContract::get("/logs", "logger.recent")
                .with_description("Recent log entries; `limit` and minimum `level` query params"),
        )?;

        Ok(())
    }

    async fn stop(&self) -> Result<(), ModuleError> {
        self.ctx.services.unregister_owner(LOGGER_MODULE);
        self.ctx.http.clear_owner(LOGGER_MODULE);
        Ok(())
    }
}

#[cfg(test)]
#[path = "module_tests.rs"]
mod tests;
