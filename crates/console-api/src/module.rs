//! The `http` module: runs the gateway between `start()` and `stop()`.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

use console_core::ModuleContext;
use console_protocols::error::ModuleError;
use console_protocols::module::Module;

use crate::server::{GatewayConfig, GatewayServer};

/// Module name of the gateway.
pub const GATEWAY_MODULE: &str = "http";

pub struct GatewayModule {
    ctx: ModuleContext,
    config: GatewayConfig,
    server: Mutex<Option<GatewayServer>>,
}

impl GatewayModule {
    pub fn new(ctx: ModuleContext) -> Self {
        let config = serde_json::from_value(ctx.config.clone()).unwrap_or_else(|e| {
            if !ctx.config.is_null() {
                warn!(error = %e, "Invalid http module settings, using defaults");
            }
            GatewayConfig::default()
        });
        Self::with_config(ctx, config)
    }

    pub fn with_config(ctx: ModuleContext, config: GatewayConfig) -> Self {
        Self {
            ctx,
            config,
            server: Mutex::new(None),
        }
    }

    /// Factory for the module catalog.
    pub fn build(ctx: &ModuleContext) -> Arc<dyn Module> {
        Arc::new(Self::new(ctx.clone()))
    }

    /// Bound address while running.
    pub async fn local_addr(&self) -> Option<std::net::SocketAddr> {
        self.server.lock().await.as_ref().map(|s| s.local_addr())
    }
}

#[async_trait]
impl Module for GatewayModule {
    fn name(&self) -> &str {
        GATEWAY_MODULE
    }

    async fn start(&self) -> Result<(), ModuleError> {
        let mut server = self.server.lock().await;
        if server.is_some() {
            return Ok(());
        }

        let spawned = GatewayServer::spawn(
            &self.config,
            self.ctx.http.clone(),
            self.ctx.services.clone(),
        )
        .await
        .map_err(|e| ModuleError::StartFailed(format!("bind {}: {}", self.config.addr(), e)))?;

        info!(addr = %spawned.local_addr(), "HTTP gateway bound");
        *server = Some(spawned);
        Ok(())
    }

    async fn stop(&self) -> Result<(), ModuleError> {
        let Some(server) = self.server.lock().await.take() else {
            return Ok(());
        };
        server
            .shutdown()
            .await
            .map_err(|e| ModuleError::StopFailed(e.to_string()))?;
        info!("HTTP gateway stopped");
        Ok(())
    }
}
