//! Event protocol definitions.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::EventError;

/// Subscriber callback for the event bus.
///
/// Handlers are identified by the `Arc` they were subscribed with; keep the
/// same `Arc` around to unsubscribe.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event_type: &str, payload: &Value) -> Result<(), EventError>;
}

/// Adapter turning an async closure into an [`EventHandler`].
pub struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(String, Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), EventError>> + Send + 'static,
{
    async fn handle(&self, event_type: &str, payload: &Value) -> Result<(), EventError> {
        (self.f)(event_type.to_string(), payload.clone()).await
    }
}

/// Wrap an async closure as a shareable event handler.
pub fn event_fn<F, Fut>(f: F) -> Arc<dyn EventHandler>
where
    F: Fn(String, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), EventError>> + Send + 'static,
{
    Arc::new(FnHandler { f })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_event_fn_receives_type_and_payload() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let handler = event_fn(move |event_type, payload| {
            let counter = counter.clone();
            async move {
                assert_eq!(event_type, "device.state_changed");
                assert_eq!(payload["id"], "lamp");
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        handler
            .handle("device.state_changed", &serde_json::json!({"id": "lamp"}))
            .await
            .unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
