//! Rule definitions and payload matching.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event that fires a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// Event type, e.g. `device.state_changed`.
    pub event: String,

    /// Dotted payload paths and the values they must equal.
    #[serde(default)]
    pub conditions: Map<String, Value>,
}

/// Service call performed when a rule fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub service: String,

    #[serde(default)]
    pub args: Map<String, Value>,
}

/// A stored automation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub trigger: Trigger,
    pub action: Action,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Input of `automation.add`.
#[derive(Debug, Clone)]
pub struct NewRule {
    pub name: String,
    pub trigger: Trigger,
    pub action: Action,
    pub enabled: bool,
}

impl Rule {
    pub fn from_new(new: NewRule) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: new.name,
            trigger: new.trigger,
            action: new.action,
            enabled: new.enabled,
            created_at: Utc::now(),
        }
    }

    /// Whether this rule should run for `event_type` carrying `payload`.
    pub fn matches(&self, event_type: &str, payload: &Value) -> bool {
        self.enabled
            && self.trigger.event == event_type
            && self
                .trigger
                .conditions
                .iter()
                .all(|(path, expected)| lookup(payload, path) == Some(expected))
    }
}

/// Resolve a dotted path (`state.on`, `changed.0`) inside a JSON value.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}
