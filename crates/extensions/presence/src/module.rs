//! The `presence` module.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use console_core::{EventBus, ModuleContext};
use console_protocols::error::{ModuleError, ServiceError};
use console_protocols::http::{HttpContract, HttpMethod};
use console_protocols::module::Module;
use console_protocols::service::ServiceArgs;
use console_protocols::storage::Storage;

pub const PRESENCE_MODULE: &str = "presence";

const NAMESPACE: &str = "presence";
const CHANGED: &str = "presence.changed";

/// Presence of one household member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occupant {
    pub name: String,
    pub home: bool,
    pub since: DateTime<Utc>,
}

struct PresenceTable {
    storage: Arc<dyn Storage>,
    events: Arc<EventBus>,
}

impl PresenceTable {
    async fn get(&self, name: &str) -> Result<Option<Occupant>, ServiceError> {
        match self.storage.get(NAMESPACE, name).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Occupant>, ServiceError> {
        let mut occupants = Vec::new();
        for name in self.storage.list_keys(NAMESPACE).await? {
            if let Some(occupant) = self.get(&name).await? {
                occupants.push(occupant);
            }
        }
        Ok(occupants)
    }

    /// Record `home` for `name`, publishing `presence.changed` on a change.
    async fn set(&self, name: &str, home: bool) -> Result<Occupant, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::InvalidArgument("name must not be empty".into()));
        }

        let previous = self.get(name).await?;
        if let Some(current) = previous.as_ref().filter(|o| o.home == home) {
            return Ok(current.clone());
        }

        let occupant = Occupant {
            name: name.to_string(),
            home,
            since: Utc::now(),
        };
        self.storage
            .set(NAMESPACE, name, serde_json::to_value(&occupant)?)
            .await?;

        self.events
            .publish(
                CHANGED,
                json!({
                    "name": name,
                    "home": home,
                    "previous": previous.map(|o| o.home),
                    "anyone_home": self.anyone_home().await?,
                }),
            )
            .await;
        Ok(occupant)
    }

    async fn anyone_home(&self) -> Result<bool, ServiceError> {
        Ok(self.list().await?.iter().any(|o| o.home))
    }
}

/// Settings: `members`, names seeded as away when first seen.
pub struct PresenceModule {
    ctx: ModuleContext,
    table: Arc<PresenceTable>,
}

impl PresenceModule {
    pub fn new(ctx: ModuleContext) -> Self {
        let table = Arc::new(PresenceTable {
            storage: ctx.storage.clone(),
            events: ctx.events.clone(),
        });
        Self { ctx, table }
    }

    /// Factory for the module catalog.
    pub fn build(ctx: &ModuleContext) -> Arc<dyn Module> {
        Arc::new(Self::new(ctx.clone()))
    }
}

#[async_trait]
impl Module for PresenceModule {
    fn name(&self) -> &str {
        PRESENCE_MODULE
    }

    async fn register(&self) -> Result<(), ModuleError> {
        let services = &self.ctx.services;

        let table = self.table.clone();
        services.register_fn("presence.set", move |args: ServiceArgs| {
            let table = table.clone();
            async move {
                let name: String = args.require("name")?;
                let home: bool = args.require("home")?;
                Ok(serde_json::to_value(table.set(&name, home).await?)?)
            }
        })?;

        let table = self.table.clone();
        services.register_fn("presence.get", move |args: ServiceArgs| {
            let table = table.clone();
            async move {
                let name: String = args.require("name")?;
                Ok(serde_json::to_value(table.get(&name).await?)?)
            }
        })?;

        let table = self.table.clone();
        services.register_fn("presence.list", move |_args: ServiceArgs| {
            let table = table.clone();
            async move { Ok(serde_json::to_value(table.list().await?)?) }
        })?;

        let table = self.table.clone();
        services.register_fn("presence.anyone_home", move |_args: ServiceArgs| {
            let table = table.clone();
            async move { Ok(Value::Bool(table.anyone_home().await?)) }
        })?;

        self.ctx.http.register_all([
            HttpContract::get("/presence", "presence.list"),
            HttpContract::get("/presence/anyone_home", "presence.anyone_home"),
            HttpContract::get("/presence/{name}", "presence.get"),
            HttpContract::new(HttpMethod::Put, "/presence/{name}", "presence.set")
                .with_description("Body: {\"home\": bool}"),
        ])?;
        Ok(())
    }

    async fn start(&self) -> Result<(), ModuleError> {
        let members: Vec<String> = self.ctx.get_config("members").unwrap_or_default();
        let mut seeded = 0;
        for name in members {
            if self.table.get(&name).await?.is_none() {
                let occupant = Occupant {
                    name: name.clone(),
                    home: false,
                    since: Utc::now(),
                };
                self.ctx
                    .storage
                    .set(
                        NAMESPACE,
                        &name,
                        serde_json::to_value(&occupant).map_err(ServiceError::from)?,
                    )
                    .await?;
                seeded += 1;
            }
        }
        if seeded > 0 {
            info!(count = seeded, "Seeded household members");
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), ModuleError> {
        self.ctx.services.unregister_owner(PRESENCE_MODULE);
        self.ctx.http.clear_owner(PRESENCE_MODULE);
        Ok(())
    }
}

#[cfg(test)]
#[path = "module_tests.rs"]
mod tests;
