//! # Console API
//!
//! HTTP gateway for homeconsole.
//!
//! The gateway owns no routes of its own beyond `/health`. After a short
//! grace period it snapshots the HTTP contract table and mounts one route per
//! contract, turning each request into a service call:
//!
//! ```text
//! GET /devices/{id}?verbose=true
//!        │
//!        ▼  path params + query params + JSON object body
//! services.call("devices.get", {id, verbose})
//!        │
//!        ▼
//! 200 JSON result │ 404 unbound service │ 400 invalid argument │ 500 other
//! ```

pub mod error;
pub mod module;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use module::{GATEWAY_MODULE, GatewayModule};
pub use router::build_router;
pub use server::{GatewayConfig, GatewayServer};
