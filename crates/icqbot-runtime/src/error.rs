//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;
use crate::lifecycle::BotState;
use icqbot_core::BotError;

/// Errors that end, or prevent, a polling session.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A session is already running on this bot.
    #[error("Bot is already active ({state})")]
    AlreadyActive { state: BotState },

    /// A fatal poll or dispatch error.
    #[error(transparent)]
    Bot(#[from] BotError),

    /// Consecutive poll failures exceeded the retry budget.
    #[error("Giving up after {attempts} failed polls: {last}")]
    RetriesExhausted { attempts: u32, last: BotError },

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A session task panicked or was aborted.
    #[error("Session task failed: {0}")]
    Task(String),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
