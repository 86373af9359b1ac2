//! In-process event bus.
//!
//! Fan-out is sequential and awaited by the publisher. A failing handler is
//! logged and skipped; there is no retry and no durable queue.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use console_protocols::event::EventHandler;

/// Outcome of a single publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Publish/subscribe hub keyed by event-type string.
pub struct EventBus {
    subscriptions: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
}

fn same_handler(a: &Arc<dyn EventHandler>, b: &Arc<dyn EventHandler>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl EventBus {
    /// Create a new event bus.
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
        }
    }

    /// Append a handler for an event type.
    ///
    /// Subscribing the same handler twice makes it run twice per publish.
    pub fn subscribe(&self, event_type: impl Into<String>, handler: Arc<dyn EventHandler>) {
        let event_type = event_type.into();
        debug!(event_type = %event_type, "Handler subscribed");
        self.subscriptions
            .write()
            .entry(event_type)
            .or_default()
            .push(handler);
    }

    /// Remove the first subscription of exactly this handler `Arc`.
    ///
    /// Returns whether a subscription was removed.
    pub fn unsubscribe(&self, event_type: &str, handler: &Arc<dyn EventHandler>) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let Some(handlers) = subscriptions.get_mut(event_type) else {
            return false;
        };

        let Some(index) = handlers.iter().position(|h| same_handler(h, handler)) else {
            return false;
        };
        handlers.remove(index);

        if handlers.is_empty() {
            subscriptions.remove(event_type);
        }
        true
    }

    /// Deliver an event to every handler subscribed at the time of the call.
    pub async fn publish(&self, event_type: &str, payload: Value) -> PublishReport {
        let handlers: Vec<Arc<dyn EventHandler>> = self
            .subscriptions
            .read()
            .get(event_type)
            .cloned()
            .unwrap_or_default();

        let mut report = PublishReport::default();
        for handler in handlers {
            match handler.handle(event_type, &payload).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(event_type = %event_type, error = %e, "Event handler failed");
                }
            }
        }

        debug!(
            event_type = %event_type,
            delivered = report.delivered,
            failed = report.failed,
            "Event published"
        );
        report
    }

    /// Number of handlers subscribed to an event type.
    pub fn subscriber_count(&self, event_type: &str) -> usize {
        self.subscriptions
            .read()
            .get(event_type)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Event types with at least one subscriber, sorted.
    pub fn event_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.subscriptions.read().keys().cloned().collect();
        types.sort();
        types
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
