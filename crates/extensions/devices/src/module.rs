//! The `devices` module.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use console_core::ModuleContext;
use console_protocols::error::ModuleError;
use console_protocols::http::{HttpContract, HttpMethod};
use console_protocols::module::Module;
use console_protocols::service::ServiceArgs;

use crate::device::DeviceUpdate;
use crate::store::DeviceStore;

pub const DEVICES_MODULE: &str = "devices";

pub struct DevicesModule {
    ctx: ModuleContext,
    store: Arc<DeviceStore>,
}

impl DevicesModule {
    pub fn new(ctx: ModuleContext) -> Self {
        let store = Arc::new(DeviceStore::new(ctx.storage.clone(), ctx.events.clone()));
        Self { ctx, store }
    }

    /// Factory for the module catalog.
    pub fn build(ctx: &ModuleContext) -> Arc<dyn Module> {
        Arc::new(Self::new(ctx.clone()))
    }

    fn contracts() -> Vec<HttpContract> {
        vec![
            HttpContract::get("/devices", "devices.list").with_description("List devices"),
            HttpContract::get("/devices/{id}", "devices.get").with_description("Get a device"),
            HttpContract::new(HttpMethod::Put, "/devices/{id}", "devices.upsert")
                .with_description("Create or update a device"),
            HttpContract::post("/devices/{id}/state", "devices.set_state")
                .with_description("Merge a `state` object into the device state"),
            HttpContract::delete("/devices/{id}", "devices.remove")
                .with_description("Remove a device"),
        ]
    }
}

#[async_trait]
impl Module for DevicesModule {
    fn name(&self) -> &str {
        DEVICES_MODULE
    }

    async fn register(&self) -> Result<(), ModuleError> {
        let services = &self.ctx.services;

        let store = self.store.clone();
        services.register_fn("devices.list", move |_args: ServiceArgs| {
            let store = store.clone();
            async move { Ok(serde_json::to_value(store.list().await?)?) }
        })?;

        let store = self.store.clone();
        services.register_fn("devices.get", move |args: ServiceArgs| {
            let store = store.clone();
            async move {
                let id: String = args.require("id")?;
                Ok(serde_json::to_value(store.get(&id).await?)?)
            }
        })?;

        let store = self.store.clone();
        services.register_fn("devices.upsert", move |args: ServiceArgs| {
            let store = store.clone();
            async move {
                let id: String = args.require("id")?;
                let update = DeviceUpdate {
                    name: args.get("name")?,
                    kind: args.get("kind")?,
                    area: args.get("area")?,
                    state: args.get("state")?,
                };
                Ok(serde_json::to_value(store.upsert(&id, update).await?)?)
            }
        })?;

        let store = self.store.clone();
        services.register_fn("devices.set_state", move |args: ServiceArgs| {
            let store = store.clone();
            async move {
                let id: String = args.require("id")?;
                let state: Map<String, Value> = args.require("state")?;
                Ok(serde_json::to_value(store.set_state(&id, state).await?)?)
            }
        })?;

        let store = self.store.clone();
        services.register_fn("devices.remove", move |args: ServiceArgs| {
            let store = store.clone();
            async move {
                let id: String = args.require("id")?;
                Ok(Value::Bool(store.remove(&id).await?))
            }
        })?;

        self.ctx.http.register_all(Self::contracts())?;
        Ok(())
    }

    async fn stop(&self) -> Result<(), ModuleError> {
        self.ctx.services.unregister_owner(DEVICES_MODULE);
        self.ctx.http.clear_owner(DEVICES_MODULE);
        Ok(())
    }
}

#[cfg(test)]
#[path = "module_tests.rs"]
mod tests;
