//! # icqbot Core
//!
//! The core building blocks of the icqbot event pipeline.
//!
//! This crate has no runtime of its own. It defines the data that flows
//! through the pipeline and the seams the other crates plug into:
//!
//! - **Event model**: the polling envelope ([`Event`], [`PollResponse`]) and
//!   the typed payload variants ([`Payload`] and one record per [`Kind`])
//! - **Decoders**: [`decode_envelope`] for a whole poll response and
//!   [`Payload::decode`] for a single event body
//! - **Transport seam**: the [`Transport`] trait that `icqbot-transport`
//!   implements over HTTP, plus the [`ApiRequest`] it consumes
//! - **Errors**: [`TransportError`], [`DecodeError`] and [`BotError`]
//!
//! ## Two-stage decoding
//!
//! ```text
//! ┌──────────────┐  decode_envelope  ┌─────────────┐  Payload::decode  ┌──────────┐
//! │ poll body    │──────────────────▶│ Vec<Event>  │──────────────────▶│ Payload  │
//! │ (raw bytes)  │                   │ id/type/raw │   (per event)     │ (typed)  │
//! └──────────────┘                   └─────────────┘                   └──────────┘
//! ```
//!
//! The discriminant must be known before the payload shape can be chosen, so
//! the envelope keeps every payload as raw JSON text and the second stage
//! picks the record type from the event's `type` tag.
//!
//! ## Example
//!
//! ```rust
//! use icqbot_core::{Payload, decode_envelope};
//!
//! let body = br#"{"events":[{"eventId":5,"type":"deletedMessage","payload":{
//!     "msgId":"6752793278973351456",
//!     "chat":{"chatId":"681869378@chat.agent","type":"group","title":"ops"},
//!     "timestamp":1546290000}}]}"#;
//!
//! let events = decode_envelope(body).unwrap();
//! assert_eq!(events[0].id, 5);
//!
//! match events[0].decode().unwrap() {
//!     Payload::DeletedMessage(deleted) => assert_eq!(deleted.msg_id, "6752793278973351456"),
//!     other => panic!("unexpected payload: {other:?}"),
//! }
//! ```

pub mod error;
pub mod event;
pub mod transport;

pub use error::{BotError, BotResult, DecodeError, DecodeResult, TransportError, TransportResult};
pub use event::{
    Chat, ChatKind, DeletedMessagePayload, EditedMessagePayload, Event, FileRef, FileType, Kind,
    LeftChatMembersPayload, MessagePart, NewChatMembersPayload, NewMessagePayload, PartFile,
    PartMessage, Payload, PinnedMessagePayload, PollResponse, Quote, UnpinnedMessagePayload,
    User, decode_envelope,
};
pub use transport::{ApiRequest, BoxedTransport, Method, RetryConfig, Transport};

/// Prelude for common imports.
pub mod prelude {
    pub use super::error::*;
    pub use super::event::*;
    pub use super::transport::{ApiRequest, BoxedTransport, Method, Transport};
}
