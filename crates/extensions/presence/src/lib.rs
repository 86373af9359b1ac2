//! Presence module for homeconsole.
//!
//! Tracks whether each household member is home. Members live in the
//! `presence` storage namespace; every change is published as
//! `presence.changed`.

mod module;

pub use module::{Occupant, PRESENCE_MODULE, PresenceModule};
