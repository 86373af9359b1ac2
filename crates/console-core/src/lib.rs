//! # Console Core
//!
//! Microkernel of the homeconsole backend.
//!
//! ## Components
//!
//! - [`CoreRuntime`] - Composition root driving module startup and shutdown
//! - [`ModuleManager`] - Registered-module table and lifecycle ordering
//! - [`ModuleCatalog`] - Statically declared module specs
//! - [`ServiceRegistry`], [`EventBus`], [`HttpRegistry`] - Mediation registries
//! - [`MemoryStorage`] - In-process [`Storage`](console_protocols::Storage) backend
//!
//! Modules never hold references to each other. Everything they share goes
//! through the registries handed to them in a [`ModuleContext`].

pub mod context;
pub mod lifecycle;
pub mod manager;
pub mod registry;
pub mod reporter;
pub mod runtime;
pub mod spec;
pub mod storage;

pub use context::ModuleContext;
pub use lifecycle::{RuntimeState, ShutdownSignal};
pub use manager::{ModuleInfo, ModuleManager, ModuleState};
pub use registry::{EventBus, HttpRegistry, PublishReport, ServiceRegistry};
pub use reporter::ServiceLogger;
pub use runtime::CoreRuntime;
pub use spec::{ModuleCatalog, ModuleFactory, ModuleSpec};
pub use storage::MemoryStorage;
