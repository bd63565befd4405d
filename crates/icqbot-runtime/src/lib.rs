//! icqbot Runtime - the long-polling side of the icqbot client.
//!
//! This crate provides:
//! - The [`Bot`] and its session lifecycle ([`BotState`])
//! - The [`Poller`], which tracks the event watermark and backs off on
//!   failures
//! - Figment-based configuration ([`ConfigLoader`], [`IcqBotConfig`])
//! - Logging configuration ([`LoggingBuilder`])
//!
//! # Caller-driven polling
//!
//! ```ignore
//! use icqbot_runtime::{Bot, load_config};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let bot = Bot::from_config(&load_config()?)?;
//!     let mut events = bot.poll_events(CancellationToken::new())?;
//!
//!     while let Some(event) = events.recv().await {
//!         println!("{} {}", event.id, event.event_type);
//!     }
//!     events.finish().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Self-dispatch
//!
//! ```ignore
//! use icqbot_framework::HandlerTable;
//!
//! let handlers = HandlerTable::builder()
//!     .on_new_message(|msg| async move { println!("{:?}", msg.text) })
//!     .build();
//!
//! let summary = bot.handle_events(handlers, cancel).await?;
//! ```
//!
//! # Features
//!
//! - `http-client` (default): [`Bot::from_config`] over HTTP
//! - `toml-config` (default), `yaml-config`: config file formats
//! - `json-log`: JSON log output

pub mod bot;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod poller;
pub mod session;
pub mod stream;

#[cfg(test)]
mod testing;

// Re-exports
pub use bot::Bot;
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, IcqBotConfig, Profile, load_config,
    load_config_from_file,
};
pub use error::{RuntimeError, RuntimeResult};
pub use lifecycle::{ActiveSession, BotState, Lifecycle, SessionMode};
pub use logging::{LoggingBuilder, SpanEvents, init_from_config};
pub use poller::{EVENT_BUFFER, EVENTS_PATH, Poller};
pub use session::SessionConfig;
pub use stream::EventStream;

// Re-export for callers wiring their own shutdown
pub use tokio_util::sync::CancellationToken;

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, instrument, span, trace, warn};
}
