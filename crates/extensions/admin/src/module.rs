//! The `admin` module.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use console_core::ModuleContext;
use console_protocols::error::{ModuleError, ServiceError};
use console_protocols::http::HttpContract;
use console_protocols::module::Module;
use console_protocols::service::ServiceArgs;

pub const ADMIN_MODULE: &str = "admin";

pub struct AdminModule {
    ctx: ModuleContext,
}

impl AdminModule {
    pub fn new(ctx: ModuleContext) -> Self {
        Self { ctx }
    }

    /// Factory for the module catalog.
    pub fn build(ctx: &ModuleContext) -> Arc<dyn Module> {
        Arc::new(Self::new(ctx.clone()))
    }

    fn contracts() -> Vec<HttpContract> {
        vec![
            HttpContract::get("/admin/modules", "admin.modules")
                .with_description("Registered modules and their state"),
            HttpContract::get("/admin/services", "admin.services")
                .with_description("Bound service names"),
            HttpContract::get("/admin/routes", "admin.routes")
                .with_description("Published HTTP contracts"),
        ]
    }
}

#[async_trait]
impl Module for AdminModule {
    fn name(&self) -> &str {
        ADMIN_MODULE
    }

    async fn register(&self) -> Result<(), ModuleError> {
        let services = &self.ctx.services;

        let ctx = self.ctx.clone();
        services.register_fn("admin.modules", move |_args: ServiceArgs| {
            let manager = ctx.modules();
            async move {
                let manager = manager
                    .ok_or_else(|| ServiceError::Failed("module manager is gone".to_string()))?;
                Ok(serde_json::to_value(manager.module_info())?)
            }
        })?;

        let registry = self.ctx.services.clone();
        services.register_fn("admin.services", move |_args: ServiceArgs| {
            let names = registry.list_services();
            async move { Ok(serde_json::to_value(names)?) }
        })?;

        let http = self.ctx.http.clone();
        services.register_fn("admin.routes", move |_args: ServiceArgs| {
            let contracts = http.list();
            async move { Ok(serde_json::to_value(contracts)?) }
        })?;

        self.ctx.http.register_all(Self::contracts())?;
        debug!("Admin views registered");
        Ok(())
    }

    async fn stop(&self) -> Result<(), ModuleError> {
        self.ctx.services.unregister_owner(ADMIN_MODULE);
        self.ctx.http.clear_owner(ADMIN_MODULE);
        Ok(())
    }
}
