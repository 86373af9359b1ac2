//! Gateway server: binds the listener and serves the contract router.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

use console_core::{HttpRegistry, ServiceRegistry};

use crate::router::build_router;

/// Gateway configuration, read from the `http` module's settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Delay between binding and snapshotting the contract table.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,
}

impl GatewayConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            grace_period_ms: default_grace_period_ms(),
        }
    }

    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace_period_ms = grace.as_millis() as u64;
        self
    }

    /// Get the server address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            grace_period_ms: default_grace_period_ms(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8123
}

fn default_grace_period_ms() -> u64 {
    500
}

/// A running gateway.
pub struct GatewayServer {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl GatewayServer {
    /// Bind the listener and spawn the serve task.
    ///
    /// The router is built from the contract table once the grace period
    /// has elapsed, so contracts registered late in startup are included.
    pub async fn spawn(
        config: &GatewayConfig,
        http: Arc<HttpRegistry>,
        services: Arc<ServiceRegistry>,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(config.addr()).await?;
        let local_addr = listener.local_addr()?;
        let grace = config.grace_period();
        let (tx, rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut rx = rx;
            tokio::select! {
                _ = tokio::time::sleep(grace) => {}
                _ = &mut rx => return,
            }

            let contracts = http.list();
            let app = build_router(&contracts, services);
            info!(addr = %local_addr, routes = contracts.len(), "HTTP gateway listening");

            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = rx.await;
                })
                .await;
            if let Err(e) = served {
                error!(error = %e, "HTTP gateway stopped with error");
            }
        });

        Ok(Self {
            local_addr,
            shutdown: Some(tx),
            task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Signal graceful shutdown and wait for the serve task.
    pub async fn shutdown(mut self) -> Result<(), tokio::task::JoinError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.task.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_protocols::http::HttpContract;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    #[test]
    fn test_gateway_config_default() {
        let config = GatewayConfig::default();
        assert_eq!(config.addr(), "127.0.0.1:8123");
        assert_eq!(config.grace_period(), Duration::from_millis(500));
    }

    #[test]
    fn test_gateway_config_from_json() {
        let config: GatewayConfig =
            serde_json::from_value(json!({"port": 9000, "grace_period_ms": 0})).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.grace_period(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_serves_contracts_after_grace() {
        let http = Arc::new(HttpRegistry::new());
        let services = Arc::new(ServiceRegistry::new());
        services
            .register_fn("presence.list", |_| async { Ok(json!(["alice"])) })
            .unwrap();

        let config = GatewayConfig::new("127.0.0.1", 0).with_grace_period(Duration::from_millis(20));
        let server = GatewayServer::spawn(&config, http.clone(), services)
            .await
            .unwrap();
        // Registered after bind, before the grace period ends.
        http.register(HttpContract::get("/presence", "presence.list"))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut stream = TcpStream::connect(server.local_addr()).await.unwrap();
        stream
            .write_all(b"GET /presence HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("alice"));

        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_during_grace() {
        let config = GatewayConfig::new("127.0.0.1", 0).with_grace_period(Duration::from_secs(60));
        let server = GatewayServer::spawn(
            &config,
            Arc::new(HttpRegistry::new()),
            Arc::new(ServiceRegistry::new()),
        )
        .await
        .unwrap();

        server.shutdown().await.unwrap();
    }
}
