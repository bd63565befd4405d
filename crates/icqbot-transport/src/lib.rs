//! # icqbot Transport
//!
//! Concrete implementations of the [`Transport`](icqbot_core::Transport)
//! seam defined in `icqbot-core`.
//!
//! ## Features
//!
//! - `http-client`: [`HttpTransport`], a `reqwest`-backed client for the bot
//!   API that attaches the bot token to every call
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  icqbot-runtime     │  (poller issues ApiRequests)
//! ├─────────────────────┤
//! │  icqbot-core        │  (Transport trait)
//! ├─────────────────────┤
//! │  icqbot-transport   │  <- This crate (implementations)
//! ├─────────────────────┤
//! │  Network (HTTPS)    │
//! └─────────────────────┘
//! ```

#[cfg(feature = "http-client")]
pub mod http;

#[cfg(feature = "http-client")]
pub use http::HttpTransport;
