//! Registries shared by every module: services, events, HTTP contracts.

mod event;
mod http;
mod service;

pub use event::{EventBus, PublishReport};
pub use http::HttpRegistry;
pub use service::ServiceRegistry;
