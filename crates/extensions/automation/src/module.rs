//! The `automation` module.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use console_core::ModuleContext;
use console_protocols::error::ModuleError;
use console_protocols::http::HttpContract;
use console_protocols::module::Module;
use console_protocols::service::ServiceArgs;

use crate::engine::AutomationEngine;
use crate::rule::{Action, NewRule, Trigger};

pub const AUTOMATION_MODULE: &str = "automation";

pub struct AutomationModule {
    ctx: ModuleContext,
    engine: Arc<AutomationEngine>,
}

impl AutomationModule {
    pub fn new(ctx: ModuleContext) -> Self {
        let engine = AutomationEngine::new(
            ctx.storage.clone(),
            ctx.services.clone(),
            ctx.events.clone(),
        );
        Self { ctx, engine }
    }

    /// Factory for the module catalog.
    pub fn build(ctx: &ModuleContext) -> Arc<dyn Module> {
        Arc::new(Self::new(ctx.clone()))
    }

    pub fn engine(&self) -> &Arc<AutomationEngine> {
        &self.engine
    }

    fn contracts() -> Vec<HttpContract> {
        vec![
            HttpContract::get("/automations", "automation.list")
                .with_description("List automation rules"),
            HttpContract::post("/automations", "automation.add")
                .with_description("Create a rule from `name`, `trigger` and `action`"),
            HttpContract::delete("/automations/{id}", "automation.remove")
                .with_description("Delete a rule"),
            HttpContract::post("/automations/{id}/enabled", "automation.set_enabled")
                .with_description("Enable or disable a rule"),
        ]
    }
}

#[async_trait]
impl Module for AutomationModule {
    fn name(&self) -> &str {
        AUTOMATION_MODULE
    }

    async fn register(&self) -> Result<(), ModuleError> {
        let services = &self.ctx.services;

        let engine = self.engine.clone();
        services.register_fn("automation.list", move |_args: ServiceArgs| {
            let engine = engine.clone();
            async move { Ok(serde_json::to_value(engine.rules().await?)?) }
        })?;

        let engine = self.engine.clone();
        services.register_fn("automation.add", move |args: ServiceArgs| {
            let engine = engine.clone();
            async move {
                let trigger: Trigger = args.require("trigger")?;
                let action: Action = args.require("action")?;
                let name = args.get::<String>("name")?.unwrap_or_else(|| trigger.event.clone());
                let rule = NewRule {
                    name,
                    trigger,
                    action,
                    enabled: args.get_or("enabled", true)?,
                };
                Ok(serde_json::to_value(engine.add(rule).await?)?)
            }
        })?;

        let engine = self.engine.clone();
        services.register_fn("automation.remove", move |args: ServiceArgs| {
            let engine = engine.clone();
            async move {
                let id: String = args.require("id")?;
                Ok(Value::Bool(engine.remove(&id).await?))
            }
        })?;

        let engine = self.engine.clone();
        services.register_fn("automation.set_enabled", move |args: ServiceArgs| {
            let engine = engine.clone();
            async move {
                let id: String = args.require("id")?;
                let enabled: bool = args.require("enabled")?;
                Ok(serde_json::to_value(engine.set_enabled(&id, enabled).await?)?)
            }
        })?;

        self.ctx.http.register_all(Self::contracts())?;
        Ok(())
    }

    async fn start(&self) -> Result<(), ModuleError> {
        if !self.engine.is_active() {
            self.engine.activate().await?;
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), ModuleError> {
        self.engine.deactivate();
        self.ctx.services.unregister_owner(AUTOMATION_MODULE);
        self.ctx.http.clear_owner(AUTOMATION_MODULE);
        Ok(())
    }
}

#[cfg(test)]
#[path = "module_tests.rs"]
mod tests;
