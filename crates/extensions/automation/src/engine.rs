//! Rule storage and event dispatch.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use console_core::{EventBus, ServiceRegistry};
use console_protocols::error::{EventError, ServiceError};
use console_protocols::event::{EventHandler, event_fn};
use console_protocols::service::ServiceArgs;
use console_protocols::storage::Storage;

use crate::rule::{NewRule, Rule};

const NAMESPACE: &str = "automation";

/// Published after every rule run, successful or not.
pub const TRIGGERED: &str = "automation.triggered";

/// Owns the rules and the event subscriptions that fire them.
pub struct AutomationEngine {
    storage: Arc<dyn Storage>,
    services: Arc<ServiceRegistry>,
    events: Arc<EventBus>,
    subscriptions: Mutex<HashMap<String, Arc<dyn EventHandler>>>,
    active: AtomicBool,
    me: Weak<AutomationEngine>,
}

impl AutomationEngine {
    pub fn new(
        storage: Arc<dyn Storage>,
        services: Arc<ServiceRegistry>,
        events: Arc<EventBus>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            storage,
            services,
            events,
            subscriptions: Mutex::new(HashMap::new()),
            active: AtomicBool::new(false),
            me: me.clone(),
        })
    }

    /// All rules ordered by id.
    pub async fn rules(&self) -> Result<Vec<Rule>, ServiceError> {
        let mut rules = Vec::new();
        for id in self.storage.list_keys(NAMESPACE).await? {
            if let Some(value) = self.storage.get(NAMESPACE, &id).await? {
                rules.push(serde_json::from_value(value)?);
            }
        }
        Ok(rules)
    }

    async fn save(&self, rule: &Rule) -> Result<(), ServiceError> {
        self.storage
            .set(NAMESPACE, &rule.id, serde_json::to_value(rule)?)
            .await?;
        Ok(())
    }

    pub async fn add(&self, new: NewRule) -> Result<Rule, ServiceError> {
        if new.trigger.event.trim().is_empty() {
            return Err(ServiceError::InvalidArgument("trigger.event must not be empty".into()));
        }
        if new.trigger.event == TRIGGERED {
            return Err(ServiceError::InvalidArgument(format!(
                "rules cannot trigger on '{}'",
                TRIGGERED
            )));
        }
        if new.action.service.trim().is_empty() {
            return Err(ServiceError::InvalidArgument("action.service must not be empty".into()));
        }

        let rule = Rule::from_new(new);
        self.save(&rule).await?;
        if self.is_active() {
            self.ensure_subscribed(&rule.trigger.event);
        }
        info!(rule = %rule.id, event = %rule.trigger.event, "Automation rule added");
        Ok(rule)
    }

    pub async fn remove(&self, id: &str) -> Result<bool, ServiceError> {
        let removed = self.storage.delete(NAMESPACE, id).await?;
        if removed && self.is_active() {
            self.prune_subscriptions().await?;
        }
        Ok(removed)
    }

    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<Rule, ServiceError> {
        let value = self
            .storage
            .get(NAMESPACE, id)
            .await?
            .ok_or_else(|| ServiceError::InvalidArgument(format!("unknown rule '{}'", id)))?;
        let mut rule: Rule = serde_json::from_value(value)?;
        rule.enabled = enabled;
        self.save(&rule).await?;
        Ok(rule)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Subscribe to every trigger event of the stored rules.
    pub async fn activate(&self) -> Result<(), ServiceError> {
        self.active.store(true, Ordering::SeqCst);
        let events: BTreeSet<String> = self
            .rules()
            .await?
            .into_iter()
            .map(|r| r.trigger.event)
            .collect();
        for event in &events {
            self.ensure_subscribed(event);
        }
        debug!(events = events.len(), "Automation engine active");
        Ok(())
    }

    /// Drop every subscription. Returns how many were removed.
    pub fn deactivate(&self) -> usize {
        self.active.store(false, Ordering::SeqCst);
        let drained: Vec<(String, Arc<dyn EventHandler>)> =
            self.subscriptions.lock().drain().collect();
        drained
            .iter()
            .filter(|(event, handler)| self.events.unsubscribe(event, handler))
            .count()
    }

    /// Event types currently subscribed, sorted.
    pub fn subscribed_events(&self) -> Vec<String> {
        let mut events: Vec<String> = self.subscriptions.lock().keys().cloned().collect();
        events.sort();
        events
    }

    fn ensure_subscribed(&self, event: &str) {
        let mut subscriptions = self.subscriptions.lock();
        if subscriptions.contains_key(event) {
            return;
        }

        let engine = self.me.clone();
        let handler = event_fn(move |event_type, payload| {
            let engine = engine.clone();
            async move {
                match engine.upgrade() {
                    Some(engine) => engine.dispatch(&event_type, &payload).await,
                    None => Ok(()),
                }
            }
        });
        self.events.subscribe(event, handler.clone());
        subscriptions.insert(event.to_string(), handler);
    }

    async fn prune_subscriptions(&self) -> Result<(), ServiceError> {
        let wanted: BTreeSet<String> = self
            .rules()
            .await?
            .into_iter()
            .map(|r| r.trigger.event)
            .collect();

        let stale: Vec<(String, Arc<dyn EventHandler>)> = {
            let mut subscriptions = self.subscriptions.lock();
            let keys: Vec<String> = subscriptions
                .keys()
                .filter(|event| !wanted.contains(*event))
                .cloned()
                .collect();
            keys.into_iter()
                .filter_map(|k| subscriptions.remove_entry(&k))
                .collect()
        };
        for (event, handler) in stale {
            self.events.unsubscribe(&event, &handler);
        }
        Ok(())
    }

    /// Run every enabled rule matching the event.
    ///
    /// All matching rules run even when one fails; the failures are then
    /// returned together.
    pub async fn dispatch(&self, event_type: &str, payload: &Value) -> Result<(), EventError> {
        let rules: Vec<Rule> = self
            .rules()
            .await?
            .into_iter()
            .filter(|rule| rule.matches(event_type, payload))
            .collect();

        let mut failures = Vec::new();
        for rule in rules {
            let args = ServiceArgs::from_kwargs(rule.action.args.clone());
            let outcome = self.services.call(&rule.action.service, args).await;

            let error = outcome.as_ref().err().map(|e| e.to_string());
            if let Some(e) = &error {
                warn!(rule = %rule.id, service = %rule.action.service, error = %e, "Automation action failed");
                failures.push(format!("{}: {}", rule.name, e));
            } else {
                debug!(rule = %rule.id, service = %rule.action.service, "Automation action ran");
            }

            self.events
                .publish(
                    TRIGGERED,
                    json!({
                        "rule_id": rule.id,
                        "rule": rule.name,
                        "event": event_type,
                        "service": rule.action.service,
                        "ok": error.is_none(),
                        "error": error,
                    }),
                )
                .await;
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(EventError::HandlerFailed(failures.join("; ")))
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
