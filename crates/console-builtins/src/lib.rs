//! # Console Builtins
//!
//! The static table of modules shipped with homeconsole.
//!
//! | module       | required | provides                         |
//! |--------------|----------|----------------------------------|
//! | `logger`     | yes      | `logger.*`, `GET /logs`          |
//! | `devices`    | yes      | `devices.*`, `/devices`          |
//! | `presence`   | yes      | `presence.*`, `/presence`        |
//! | `automation` | yes      | `automation.*`, `/automations`   |
//! | `admin`      | no       | `admin.*`, `/admin`              |
//! | `http`       | no       | the HTTP gateway                 |

use console_core::{ModuleCatalog, ModuleSpec};
use console_protocols::error::ModuleError;

use console_admin::{ADMIN_MODULE, AdminModule};
use console_api::{GATEWAY_MODULE, GatewayModule};
use console_automation::{AUTOMATION_MODULE, AutomationModule};
use console_devices::{DEVICES_MODULE, DevicesModule};
use console_logger::{LOGGER_MODULE, LoggerModule};
use console_presence::{PRESENCE_MODULE, PresenceModule};

/// Every built-in module spec, in start order.
pub fn builtin_specs() -> Vec<ModuleSpec> {
    vec![
        ModuleSpec::required(LOGGER_MODULE, LoggerModule::build),
        ModuleSpec::required(DEVICES_MODULE, DevicesModule::build),
        ModuleSpec::required(PRESENCE_MODULE, PresenceModule::build),
        ModuleSpec::required(AUTOMATION_MODULE, AutomationModule::build),
        ModuleSpec::optional(ADMIN_MODULE, AdminModule::build),
        ModuleSpec::optional(GATEWAY_MODULE, GatewayModule::build),
    ]
}

/// Catalog of [`builtin_specs`].
pub fn builtin_catalog() -> Result<ModuleCatalog, ModuleError> {
    ModuleCatalog::new(builtin_specs())
}
