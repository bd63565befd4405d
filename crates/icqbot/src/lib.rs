//! # icqbot
//!
//! A long-polling client for the ICQ New and Mail.ru Agent bot APIs.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐     ┌──────────┐     ┌───────────────┐     ┌──────────────────┐
//! │ Transport │────▶│  Poller  │────▶│ Event (raw)   │────▶│ EventStream      │──▶ caller
//! │  (HTTP)   │     │ watermark│     │ id/type/json  │  or │ Dispatcher       │──▶ handlers
//! └───────────┘     └──────────┘     └───────────────┘     └──────────────────┘
//! ```
//!
//! - **Transport**: performs `/events/get` calls and returns raw bodies
//! - **Poller**: tracks the newest event id and backs off on failures
//! - **Decoder**: splits a poll response into events, then decodes each
//!   payload by its `type` tag
//! - **Dispatcher**: routes decoded payloads to one handler per event kind
//! - **Lifecycle**: at most one session per bot, polling or handling
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use icqbot::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     init_from_config(&config.logging);
//!
//!     let handlers = HandlerTable::builder()
//!         .on_new_message(|msg| async move {
//!             info!(chat = %msg.chat.chat_id, text = ?msg.text, "message");
//!         })
//!         .on_error(|err| warn!(error = %err, "bot error"))
//!         .build();
//!
//!     let bot = Bot::from_config(&config)?;
//!     bot.handle_events(handlers, CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `http-client`: HTTP transport and `Bot::from_config` (default)
//! - `toml-config`: TOML config files (default)
//! - `yaml-config`: YAML config files
//! - `json-log`: JSON log output

pub use icqbot_core as core;
pub use icqbot_framework as framework;
pub use icqbot_runtime as runtime;
pub use icqbot_transport as transport;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use icqbot::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use icqbot_runtime::{
        Bot, BotState, CancellationToken, EventStream, IcqBotConfig, RuntimeError,
        SessionConfig, init_from_config, load_config, load_config_from_file,
    };

    // Handlers
    pub use icqbot_framework::{DispatchSummary, HandlerTable, UnknownKindPolicy};

    // Event model
    pub use icqbot_core::{
        BotError, Chat, ChatKind, DecodeError, Event, Kind, MessagePart, Payload, TransportError,
        User,
    };
    pub use icqbot_core::{
        DeletedMessagePayload, EditedMessagePayload, LeftChatMembersPayload,
        NewChatMembersPayload, NewMessagePayload, PinnedMessagePayload, UnpinnedMessagePayload,
    };

    // Logging macros
    pub use icqbot_runtime::prelude::*;
}
