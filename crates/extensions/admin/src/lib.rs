//! Admin module for homeconsole.
//!
//! Read-only views of the running kernel: registered modules and their
//! lifecycle state, bound service names and published HTTP contracts.

mod module;

pub use module::{ADMIN_MODULE, AdminModule};
