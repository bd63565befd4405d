//! Polling envelope and event discriminants.
//!
//! A poll response carries an ordered list of [`Event`]s. Each event keeps
//! its payload as raw JSON text until the dispatcher decodes it with
//! [`Event::decode`], which selects the record type from the `type` tag:
//!
//! ```text
//! PollResponse { events, ok?, description? }
//! └── Event { eventId, type, payload }
//!     └── type ─┬─ "newMessage"      → NewMessagePayload
//!               ├─ "editedMessage"   → EditedMessagePayload
//!               ├─ "deletedMessage"  → DeletedMessagePayload
//!               ├─ "pinnedMessage"   → PinnedMessagePayload
//!               ├─ "unpinnedMessage" → UnpinnedMessagePayload
//!               ├─ "newChatMembers"  → NewChatMembersPayload
//!               └─ "leftChatMembers" → LeftChatMembersPayload
//! ```

mod part;
mod payload;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{DecodeError, DecodeResult};

pub use part::{FileRef, FileType, MessagePart, PartFile, PartMessage, Quote};
pub use payload::{
    Chat, ChatKind, DeletedMessagePayload, EditedMessagePayload, LeftChatMembersPayload,
    NewChatMembersPayload, NewMessagePayload, Payload, PinnedMessagePayload,
    UnpinnedMessagePayload, User,
};

// ============================================================================
// Kind
// ============================================================================

/// The closed set of event discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Kind {
    /// A message was posted.
    NewMessage,
    /// A message was edited.
    EditedMessage,
    /// A message was deleted.
    DeletedMessage,
    /// A message was pinned.
    PinnedMessage,
    /// A message was unpinned.
    UnpinnedMessage,
    /// Members joined a chat.
    NewChatMembers,
    /// Members left or were removed from a chat.
    LeftChatMembers,
}

impl Kind {
    /// Every kind, in wire-documentation order.
    pub const ALL: [Kind; 7] = [
        Kind::NewMessage,
        Kind::EditedMessage,
        Kind::DeletedMessage,
        Kind::PinnedMessage,
        Kind::UnpinnedMessage,
        Kind::NewChatMembers,
        Kind::LeftChatMembers,
    ];

    /// Returns the discriminant as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewMessage => "newMessage",
            Self::EditedMessage => "editedMessage",
            Self::DeletedMessage => "deletedMessage",
            Self::PinnedMessage => "pinnedMessage",
            Self::UnpinnedMessage => "unpinnedMessage",
            Self::NewChatMembers => "newChatMembers",
            Self::LeftChatMembers => "leftChatMembers",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DecodeError::UnknownKind { kind: s.to_string() })
    }
}

// ============================================================================
// Event
// ============================================================================

/// One server-side event as delivered by the polling endpoint.
///
/// The discriminant is kept as received so that an unknown tag surfaces in
/// the payload stage rather than failing the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Server-assigned identifier, non-decreasing within a session.
    #[serde(rename = "eventId")]
    pub id: u64,
    /// Discriminant as received.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Opaque payload, decoded on demand.
    ///
    /// A missing payload reads as `null`, which fails in [`Event::decode`]
    /// for that event alone.
    #[serde(default = "missing_payload")]
    pub payload: Box<RawValue>,
}

fn missing_payload() -> Box<RawValue> {
    RawValue::NULL.to_owned()
}

impl Event {
    /// Builds an event by encoding a typed payload.
    pub fn from_payload(id: u64, payload: &Payload) -> serde_json::Result<Self> {
        Ok(Self {
            id,
            event_type: payload.kind().as_str().to_string(),
            payload: payload.to_raw()?,
        })
    }

    /// Resolves the discriminant.
    pub fn kind(&self) -> DecodeResult<Kind> {
        self.event_type.parse()
    }

    /// Returns the payload exactly as received.
    pub fn raw_payload(&self) -> &str {
        self.payload.get()
    }

    /// Decodes the payload into the variant selected by the discriminant.
    pub fn decode(&self) -> DecodeResult<Payload> {
        Payload::decode(self.kind()?, self.raw_payload())
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// Body of a `GET /events/get` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollResponse {
    /// Events in server order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Event>>,
    /// Present and `false` when the server refused the poll.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    /// Explanation accompanying a refusal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Decodes a poll response body into its events, preserving server order.
///
/// # Errors
///
/// - [`DecodeError::Rejected`] if the server answered with `ok: false`.
/// - [`DecodeError::Envelope`] if the body is not a poll response.
pub fn decode_envelope(body: &[u8]) -> DecodeResult<Vec<Event>> {
    let response: PollResponse =
        serde_json::from_slice(body).map_err(|e| DecodeError::envelope(e.to_string()))?;

    if response.ok == Some(false) {
        return Err(DecodeError::Rejected {
            description: response
                .description
                .unwrap_or_else(|| "no description".to_string()),
        });
    }

    response
        .events
        .ok_or_else(|| DecodeError::envelope("missing field `events`"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in Kind::ALL {
            assert_eq!(kind.as_str().parse::<Kind>().unwrap(), kind);
            assert_eq!(
                serde_json::to_string(&kind).unwrap(),
                format!("\"{}\"", kind.as_str())
            );
        }
    }

    #[test]
    fn test_unknown_kind() {
        let err = "callbackQuery".parse::<Kind>().unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownKind {
                kind: "callbackQuery".to_string()
            }
        );
    }

    #[test]
    fn test_decode_envelope_preserves_server_order() {
        let body = br#"{"events":[
            {"eventId":3,"type":"newMessage","payload":{}},
            {"eventId":7,"type":"editedMessage","payload":{}},
            {"eventId":2,"type":"deletedMessage","payload":{}}
        ]}"#;

        let events = decode_envelope(body).unwrap();
        let ids: Vec<u64> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 7, 2]);
        assert_eq!(events[1].event_type, "editedMessage");
    }

    #[test]
    fn test_decode_envelope_empty_batch() {
        let events = decode_envelope(br#"{"events":[],"ok":true}"#).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_decode_envelope_keeps_unknown_kinds() {
        let body = br#"{"events":[{"eventId":1,"type":"callbackQuery","payload":{"x":1}}]}"#;
        let events = decode_envelope(body).unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].decode(),
            Err(DecodeError::UnknownKind { kind }) if kind == "callbackQuery"
        ));
    }

    #[test]
    fn test_decode_envelope_malformed() {
        assert!(matches!(
            decode_envelope(b"<html>bad gateway</html>"),
            Err(DecodeError::Envelope { .. })
        ));
        assert!(matches!(
            decode_envelope(br#"{"events":[{"type":"newMessage","payload":{}}]}"#),
            Err(DecodeError::Envelope { reason }) if reason.contains("eventId")
        ));
        assert!(matches!(
            decode_envelope(br#"{}"#),
            Err(DecodeError::Envelope { reason }) if reason.contains("events")
        ));
    }

    #[test]
    fn test_decode_envelope_rejected() {
        let err = decode_envelope(br#"{"ok":false,"description":"Invalid token"}"#).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Rejected {
                description: "Invalid token".to_string()
            }
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_missing_payload_fails_only_its_event() {
        let body = br#"{"events":[
            {"eventId":1,"type":"deletedMessage","payload":{"msgId":"1","chat":{"chatId":"c","type":"private"},"timestamp":2}},
            {"eventId":2,"type":"deletedMessage"},
            {"eventId":3,"type":"unpinnedMessage","payload":{"msgId":"3","chat":{"chatId":"c","type":"group"},"timestamp":4}}
        ]}"#;

        let events = decode_envelope(body).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].raw_payload(), "null");

        assert!(events[0].decode().is_ok());
        assert!(matches!(
            events[1].decode(),
            Err(DecodeError::Payload {
                kind: Kind::DeletedMessage,
                ..
            })
        ));
        assert!(events[2].decode().is_ok());
    }

    #[test]
    fn test_raw_payload_is_untouched() {
        let body = br#"{"events":[{"eventId":9,"type":"newMessage","payload":{"msgId": "0012"}}]}"#;
        let events = decode_envelope(body).unwrap();
        assert_eq!(events[0].raw_payload(), r#"{"msgId": "0012"}"#);
    }
}
