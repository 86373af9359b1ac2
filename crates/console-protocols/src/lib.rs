//! # Console Protocols
//!
//! Protocol definitions (traits) for the homeconsole module kernel.
//! Contains only interface definitions and the shared error taxonomy.
//!
//! ## Core Traits
//!
//! - [`Module`] - Base trait for every pluggable domain
//! - [`ServiceHandler`] - Late-bound capability invoked by name
//! - [`EventHandler`] - Subscriber callback for the event bus
//! - [`Storage`] - Namespaced key-value persistence
//! - [`Logger`] - Best-effort logging capability

pub mod error;
pub mod event;
pub mod http;
pub mod log;
pub mod module;
pub mod service;
pub mod storage;

pub use error::{
    EventError, HttpContractError, LogError, ModuleError, ProtocolError, ServiceError,
    StorageError,
};
pub use event::{event_fn, EventHandler};
pub use http::{normalize_path, HttpContract, HttpMethod};
pub use log::{LogLevel, Logger};
pub use module::Module;
pub use service::{service_fn, ServiceArgs, ServiceHandler};
pub use storage::Storage;
