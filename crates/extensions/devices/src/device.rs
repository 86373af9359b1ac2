//! Device record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A device known to the console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    /// Free-form kind, e.g. `light`, `switch`, `sensor`.
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default)]
    pub state: Map<String, Value>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted by `devices.upsert`. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceUpdate {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub area: Option<String>,
    pub state: Option<Map<String, Value>>,
}

impl Device {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind: "generic".to_string(),
            area: None,
            state: Map::new(),
            updated_at: Utc::now(),
        }
    }

    /// Apply an update in place.
    pub fn apply(&mut self, update: DeviceUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if update.area.is_some() {
            self.area = update.area;
        }
        if let Some(state) = update.state {
            self.merge_state(state);
        }
        self.updated_at = Utc::now();
    }

    /// Merge `changes` into the state. Returns the keys whose value changed.
    ///
    /// A `null` value removes the key.
    pub fn merge_state(&mut self, changes: Map<String, Value>) -> Vec<String> {
        let mut changed = Vec::new();
        for (key, value) in changes {
            let differs = match (&value, self.state.get(&key)) {
                (Value::Null, None) => false,
                (Value::Null, Some(_)) => {
                    self.state.remove(&key);
                    true
                }
                (_, Some(current)) if *current == value => false,
                _ => {
                    self.state.insert(key.clone(), value);
                    true
                }
            };
            if differs {
                changed.push(key);
            }
        }
        if !changed.is_empty() {
            self.updated_at = Utc::now();
        }
        changed
    }
}
