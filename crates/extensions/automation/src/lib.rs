//! Automation module for homeconsole.
//!
//! A rule names a trigger event, optional conditions on its payload and a
//! service to call. While the module is started, the engine holds one
//! subscription per distinct trigger event type and runs every matching,
//! enabled rule when that event is published.

mod engine;
mod module;
mod rule;

pub use engine::{AutomationEngine, TRIGGERED};
pub use module::{AUTOMATION_MODULE, AutomationModule};
pub use rule::{Action, NewRule, Rule, Trigger};
