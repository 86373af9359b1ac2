//! Error types for the console protocol layer.

mod event;
mod http;
mod log;
mod module;
mod protocol;
mod service;
mod storage;

pub use event::*;
pub use http::*;
pub use log::*;
pub use module::*;
pub use protocol::*;
pub use service::*;
pub use storage::*;
