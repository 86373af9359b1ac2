//! Runtime lifecycle state.
//!
//! Tracks where the [`CoreRuntime`](crate::CoreRuntime) is in its
//! startup/shutdown sequence and broadcasts the shutdown signal.

use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::broadcast;

use console_protocols::error::ModuleError;

/// Runtime state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RuntimeState {
    /// Constructed, modules may or may not be registered.
    Created = 0,
    /// `start()` in progress.
    Starting = 1,
    /// Every required module started.
    Running = 2,
    /// `stop()` in progress.
    ShuttingDown = 3,
    /// Stopped; may be started again.
    Stopped = 4,
    /// A required module failed to start or register.
    Failed = 5,
}

impl From<u8> for RuntimeState {
    fn from(v: u8) -> Self {
        match v {
            0 => RuntimeState::Created,
            1 => RuntimeState::Starting,
            2 => RuntimeState::Running,
            3 => RuntimeState::ShuttingDown,
            4 => RuntimeState::Stopped,
            5 => RuntimeState::Failed,
            _ => RuntimeState::Created,
        }
    }
}

/// Atomic holder for [`RuntimeState`].
pub(crate) struct StateCell {
    state: AtomicU8,
}

impl StateCell {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(RuntimeState::Created as u8),
        }
    }

    pub(crate) fn get(&self) -> RuntimeState {
        RuntimeState::from(self.state.load(Ordering::SeqCst))
    }

    pub(crate) fn set(&self, state: RuntimeState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    /// Move to `to` if the current state is one of `from`.
    pub(crate) fn transition(
        &self,
        from: &[RuntimeState],
        to: RuntimeState,
    ) -> Result<RuntimeState, ModuleError> {
        let mut current = self.state.load(Ordering::SeqCst);
        loop {
            let state = RuntimeState::from(current);
            if !from.contains(&state) {
                return Err(ModuleError::Custom(format!(
                    "Cannot move runtime from {:?} to {:?}",
                    state, to
                )));
            }
            match self.state.compare_exchange(
                current,
                to as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return Ok(state),
                Err(actual) => current = actual,
            }
        }
    }
}

/// Shutdown signal for graceful shutdown.
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
}

impl ShutdownSignal {
    /// Create a new shutdown signal.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    /// Trigger shutdown.
    pub fn trigger(&self) {
        let _ = self.sender.send(());
    }

    /// Subscribe to shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
