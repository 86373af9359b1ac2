//! Devices module for homeconsole.
//!
//! Keeps the set of known devices and their state, persisted in the
//! `devices` storage namespace. State changes are announced on the event bus
//! as `device.state_changed`, removals as `device.removed`.

mod device;
mod module;
mod store;

pub use device::{Device, DeviceUpdate};
pub use module::{DEVICES_MODULE, DevicesModule};
pub use store::DeviceStore;
