//! Best-effort failure reporting.
//!
//! Lifecycle failures are reported through the injected [`Logger`]. When no
//! logger is installed, or the logger itself fails, the report is written
//! straight to stderr so it is never lost.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use console_protocols::error::{LogError, ServiceError};
use console_protocols::log::{LogLevel, Logger};
use console_protocols::service::ServiceArgs;

use crate::registry::ServiceRegistry;

/// Name of the service backing [`ServiceLogger`].
pub const LOG_SERVICE: &str = "logger.log";

/// [`Logger`] that forwards to the `logger.log` service.
///
/// Fails with `Unavailable` until some module binds that service.
pub struct ServiceLogger {
    services: Arc<ServiceRegistry>,
}

impl ServiceLogger {
    pub fn new(services: Arc<ServiceRegistry>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Logger for ServiceLogger {
    async fn log(
        &self,
        level: LogLevel,
        message: &str,
        context: Map<String, Value>,
    ) -> Result<(), LogError> {
        let args = ServiceArgs::new()
            .with_kwarg("level", level.as_str())
            .with_kwarg("message", message)
            .with_kwarg("context", Value::Object(context));

        match self.services.call(LOG_SERVICE, args).await {
            Ok(_) => Ok(()),
            Err(ServiceError::NotFound(name)) => Err(LogError::Unavailable(name)),
            Err(e) => Err(LogError::Failed(e.to_string())),
        }
    }
}

/// Report through `logger`, falling back to stderr.
pub async fn report(
    logger: Option<Arc<dyn Logger>>,
    level: LogLevel,
    message: &str,
    context: Map<String, Value>,
) {
    let fallback_reason = match logger {
        Some(logger) => match logger.log(level, message, context.clone()).await {
            Ok(()) => return,
            Err(e) => e.to_string(),
        },
        None => "no logger installed".to_string(),
    };

    eprintln!(
        "[homeconsole] {}: {} {} ({})",
        level,
        message,
        Value::Object(context),
        fallback_reason
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    struct RecordingLogger {
        entries: Mutex<Vec<(LogLevel, String)>>,
    }

    #[async_trait]
    impl Logger for RecordingLogger {
        async fn log(
            &self,
            level: LogLevel,
            message: &str,
            _context: Map<String, Value>,
        ) -> Result<(), LogError> {
            self.entries.lock().push((level, message.to_string()));
            Ok(())
        }
    }

    struct BrokenLogger;

    #[async_trait]
    impl Logger for BrokenLogger {
        async fn log(
            &self,
            _level: LogLevel,
            _message: &str,
            _context: Map<String, Value>,
        ) -> Result<(), LogError> {
            Err(LogError::Failed("sink closed".to_string()))
        }
    }

    #[tokio::test]
    async fn test_report_uses_logger() {
        let logger = Arc::new(RecordingLogger {
            entries: Mutex::new(Vec::new()),
        });
        report(Some(logger.clone()), LogLevel::Error, "devices failed", Map::new()).await;

        let entries = logger.entries.lock();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], (LogLevel::Error, "devices failed".to_string()));
    }

    #[tokio::test]
    async fn test_report_survives_broken_logger() {
        report(Some(Arc::new(BrokenLogger)), LogLevel::Warning, "x", Map::new()).await;
        report(None, LogLevel::Warning, "y", Map::new()).await;
    }

    #[tokio::test]
    async fn test_service_logger_unavailable_without_service() {
        let logger = ServiceLogger::new(Arc::new(ServiceRegistry::new()));
        let err = logger.log(LogLevel::Info, "hi", Map::new()).await.unwrap_err();
        assert!(matches!(err, LogError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_service_logger_forwards_arguments() {
        let services = Arc::new(ServiceRegistry::new());
        let seen = Arc::new(Mutex::new(None));
        let slot = seen.clone();
        services
            .register_fn(LOG_SERVICE, move |args| {
                let slot = slot.clone();
                async move {
                    *slot.lock() = Some(args);
                    Ok(Value::Null)
                }
            })
            .unwrap();

        let logger = ServiceLogger::new(services);
        let mut context = Map::new();
        context.insert("module".to_string(), json!("presence"));
        logger.log(LogLevel::Warning, "start failed", context).await.unwrap();

        let args = seen.lock().clone().unwrap();
        assert_eq!(args.raw("level"), Some(&json!("warning")));
        assert_eq!(args.raw("message"), Some(&json!("start failed")));
        assert_eq!(args.raw("context").unwrap()["module"], "presence");
    }

    #[tokio::test]
    async fn test_service_logger_maps_handler_failure() {
        let services = Arc::new(ServiceRegistry::new());
        services
            .register_fn(LOG_SERVICE, |_| async {
                Err::<Value, _>(ServiceError::Failed("disk".to_string()))
            })
            .unwrap();

        let logger = ServiceLogger::new(services);
        let err = logger.log(LogLevel::Error, "x", Map::new()).await.unwrap_err();
        assert!(matches!(err, LogError::Failed(_)));
    }
}
