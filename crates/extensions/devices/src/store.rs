//! Persistence and event publication for devices.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::debug;

use console_core::EventBus;
use console_protocols::error::ServiceError;
use console_protocols::storage::Storage;

use crate::device::{Device, DeviceUpdate};

pub const NAMESPACE: &str = "devices";
pub const STATE_CHANGED: &str = "device.state_changed";
pub const REMOVED: &str = "device.removed";

/// Device table over the shared storage.
pub struct DeviceStore {
    storage: Arc<dyn Storage>,
    events: Arc<EventBus>,
}

impl DeviceStore {
    pub fn new(storage: Arc<dyn Storage>, events: Arc<EventBus>) -> Self {
        Self { storage, events }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Device>, ServiceError> {
        match self.storage.get(NAMESPACE, id).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn require(&self, id: &str) -> Result<Device, ServiceError> {
        self.get(id)
            .await?
            .ok_or_else(|| ServiceError::InvalidArgument(format!("unknown device '{}'", id)))
    }

    async fn save(&self, device: &Device) -> Result<(), ServiceError> {
        self.storage
            .set(NAMESPACE, &device.id, serde_json::to_value(device)?)
            .await?;
        Ok(())
    }

    /// All devices ordered by id.
    pub async fn list(&self) -> Result<Vec<Device>, ServiceError> {
        let mut devices = Vec::new();
        for id in self.storage.list_keys(NAMESPACE).await? {
            if let Some(device) = self.get(&id).await? {
                devices.push(device);
            }
        }
        Ok(devices)
    }

    /// Create a device or update its metadata.
    pub async fn upsert(&self, id: &str, update: DeviceUpdate) -> Result<Device, ServiceError> {
        if id.trim().is_empty() {
            return Err(ServiceError::InvalidArgument("device id must not be empty".into()));
        }
        let mut device = self.get(id).await?.unwrap_or_else(|| Device::new(id));
        device.apply(update);
        self.save(&device).await?;
        debug!(device = %id, "Device saved");
        Ok(device)
    }

    /// Merge `changes` into a device's state.
    ///
    /// Publishes `device.state_changed` when at least one key changed.
    pub async fn set_state(
        &self,
        id: &str,
        changes: Map<String, Value>,
    ) -> Result<Device, ServiceError> {
        let mut device = self.require(id).await?;
        let previous = device.state.clone();
        let changed = device.merge_state(changes);
        if changed.is_empty() {
            return Ok(device);
        }

        self.save(&device).await?;
        self.events
            .publish(
                STATE_CHANGED,
                json!({
                    "id": device.id,
                    "kind": device.kind,
                    "area": device.area,
                    "state": device.state,
                    "previous": previous,
                    "changed": changed,
                }),
            )
            .await;
        Ok(device)
    }

    /// Delete a device. Publishes `device.removed` if it existed.
    pub async fn remove(&self, id: &str) -> Result<bool, ServiceError> {
        let removed = self.storage.delete(NAMESPACE, id).await?;
        if removed {
            self.events.publish(REMOVED, json!({ "id": id })).await;
        }
        Ok(removed)
    }
}
