//! Bot lifecycle state machine.
//!
//! ```text
//!            activate(Polling)            session closed
//!   Stopped ───────────────────▶ Polling ────────────────▶ Stopped
//!      │     activate(Handling)            session closed
//!      └───────────────────────▶ Handling ───────────────▶ Stopped
//! ```
//!
//! Activation hands out an [`ActiveSession`] guard; dropping it is the only
//! way back to `Stopped`, so the task that owns the guard decides when the
//! session is over.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{RuntimeError, RuntimeResult};

/// Observable lifecycle state of a bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotState {
    /// No session is running.
    Stopped,
    /// Events are being handed to the caller through an `EventStream`.
    Polling,
    /// Events are being dispatched to registered handlers.
    Handling,
}

impl fmt::Display for BotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Polling => write!(f, "polling"),
            Self::Handling => write!(f, "handling"),
        }
    }
}

/// The active state a session is started in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Polling,
    Handling,
}

impl From<SessionMode> for BotState {
    fn from(mode: SessionMode) -> Self {
        match mode {
            SessionMode::Polling => Self::Polling,
            SessionMode::Handling => Self::Handling,
        }
    }
}

/// Shared lifecycle state; clones observe the same bot.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: Arc<Mutex<BotState>>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(BotState::Stopped)),
        }
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    pub fn state(&self) -> BotState {
        *self.state.lock()
    }

    /// Moves from `Stopped` into `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::AlreadyActive`] if a session is running; the
    /// running session is not affected.
    pub fn activate(&self, mode: SessionMode) -> RuntimeResult<ActiveSession> {
        let mut state = self.state.lock();
        if *state != BotState::Stopped {
            return Err(RuntimeError::AlreadyActive { state: *state });
        }

        *state = mode.into();
        debug!(state = %*state, "Session activated");

        Ok(ActiveSession {
            state: Arc::clone(&self.state),
            mode,
        })
    }
}

/// Proof of an active session. Dropping it returns the bot to `Stopped`.
#[derive(Debug)]
pub struct ActiveSession {
    state: Arc<Mutex<BotState>>,
    mode: SessionMode,
}

impl ActiveSession {
    pub fn mode(&self) -> SessionMode {
        self.mode
    }
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        *self.state.lock() = BotState::Stopped;
        debug!(mode = ?self.mode, "Session closed");
    }
}
