//! Module trait definition.
//!
//! Modules are the pluggable building blocks of the console. Each one owns a
//! single domain (devices, presence, the HTTP gateway, ...) and talks to the
//! others only through the shared registries.

use async_trait::async_trait;

use crate::error::ModuleError;

/// Core trait for all modules.
///
/// Lifecycle, as driven by the module manager:
///
/// 1. [`register`](Self::register) - publish services, subscriptions and
///    HTTP contracts into the shared registries. Called exactly once.
/// 2. [`start`](Self::start) - work that needs every other module's
///    registrations in place (binding a listener, loading state).
/// 3. [`stop`](Self::stop) - undo everything `register`/`start` published.
///
/// `start`/`stop` may be called repeatedly and must tolerate redundant calls.
/// All hooks default to a no-op.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    /// Unique module name. Must match the name of the spec it was built from.
    fn name(&self) -> &str;

    /// Publish capabilities into the shared registries.
    async fn register(&self) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Begin operating.
    async fn start(&self) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Release everything this module published or acquired.
    ///
    /// Implementations should keep going when an individual teardown step
    /// fails so one leak does not cause others.
    async fn stop(&self) -> Result<(), ModuleError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    impl Module for Bare {
        fn name(&self) -> &str {
            "bare"
        }
    }

    #[tokio::test]
    async fn test_default_hooks_are_noops() {
        let module = Bare;
        assert_eq!(module.name(), "bare");
        assert!(module.register().await.is_ok());
        assert!(module.start().await.is_ok());
        assert!(module.stop().await.is_ok());
        // redundant calls are fine
        assert!(module.start().await.is_ok());
        assert!(module.stop().await.is_ok());
    }
}
