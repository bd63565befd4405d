//! Typed payload records, one per [`Kind`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use super::Kind;
use super::part::MessagePart;
use crate::error::{DecodeError, DecodeResult};

/// Chat an event happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    /// Chat ID, kept verbatim.
    pub chat_id: String,
    /// Chat type.
    #[serde(rename = "type")]
    pub kind: ChatKind,
    /// Chat title, absent for private chats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Chat type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    /// Broadcast channel.
    Channel,
    /// Group chat.
    Group,
    /// One-to-one chat with the bot.
    Private,
}

/// A user reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID, kept verbatim.
    pub user_id: String,
    /// First name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// A message was sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessagePayload {
    /// Message ID.
    pub msg_id: String,
    /// Chat the message was sent to.
    pub chat: Chat,
    /// Sender.
    pub from: User,
    /// Send time (Unix seconds).
    pub timestamp: u64,
    /// Message text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Attachments, in message order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<MessagePart>,
}

/// A message was edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditedMessagePayload {
    /// Message ID.
    pub msg_id: String,
    /// Chat the message lives in.
    pub chat: Chat,
    /// Author of the message.
    pub from: User,
    /// Original send time (Unix seconds).
    pub timestamp: u64,
    /// Text after the edit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// When the edit happened; `timestamp` stays the original send time.
    pub edited_timestamp: u64,
}

/// A message was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedMessagePayload {
    /// ID of the deleted message.
    pub msg_id: String,
    /// Chat the message was deleted from.
    pub chat: Chat,
    /// Deletion time (Unix seconds).
    pub timestamp: u64,
}

/// A message was pinned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedMessagePayload {
    /// ID of the pinned message.
    pub msg_id: String,
    /// Chat the message was pinned in.
    pub chat: Chat,
    /// Author of the pinned message.
    pub from: User,
    /// Pin time (Unix seconds).
    pub timestamp: u64,
    /// Text of the pinned message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A message was unpinned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpinnedMessagePayload {
    /// ID of the unpinned message.
    pub msg_id: String,
    /// Chat the message was unpinned in.
    pub chat: Chat,
    /// Unpin time (Unix seconds).
    pub timestamp: u64,
}

/// Members joined a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChatMembersPayload {
    /// ID of the service message announcing the join.
    pub msg_id: String,
    /// Chat that was joined.
    pub chat: Chat,
    /// Join time (Unix seconds).
    pub timestamp: u64,
    /// Users who joined.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_members: Vec<User>,
    /// Member who added them, if they were added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_by: Option<User>,
}

/// Members left a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeftChatMembersPayload {
    /// Chat that was left.
    pub chat: Chat,
    /// Users who left.
    pub left_members: Vec<User>,
    /// Member who removed them, absent if they left on their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed_by: Option<User>,
}

// ============================================================================
// Payload
// ============================================================================

/// A decoded payload, tagged by its kind.
///
/// Serializes to the same `{type, payload}` shape the server uses for events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Payload {
    NewMessage(NewMessagePayload),
    EditedMessage(EditedMessagePayload),
    DeletedMessage(DeletedMessagePayload),
    PinnedMessage(PinnedMessagePayload),
    UnpinnedMessage(UnpinnedMessagePayload),
    NewChatMembers(NewChatMembersPayload),
    LeftChatMembers(LeftChatMembersPayload),
}

fn decode_as<T: DeserializeOwned>(kind: Kind, raw: &str) -> DecodeResult<T> {
    serde_json::from_str(raw).map_err(|e| DecodeError::Payload {
        kind,
        reason: e.to_string(),
    })
}

impl Payload {
    /// Decodes raw payload text as the record type for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Payload`] naming the offending field when the
    /// text does not match the record.
    pub fn decode(kind: Kind, raw: &str) -> DecodeResult<Self> {
        Ok(match kind {
            Kind::NewMessage => Self::NewMessage(decode_as(kind, raw)?),
            Kind::EditedMessage => Self::EditedMessage(decode_as(kind, raw)?),
            Kind::DeletedMessage => Self::DeletedMessage(decode_as(kind, raw)?),
            Kind::PinnedMessage => Self::PinnedMessage(decode_as(kind, raw)?),
            Kind::UnpinnedMessage => Self::UnpinnedMessage(decode_as(kind, raw)?),
            Kind::NewChatMembers => Self::NewChatMembers(decode_as(kind, raw)?),
            Kind::LeftChatMembers => Self::LeftChatMembers(decode_as(kind, raw)?),
        })
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::NewMessage(_) => Kind::NewMessage,
            Self::EditedMessage(_) => Kind::EditedMessage,
            Self::DeletedMessage(_) => Kind::DeletedMessage,
            Self::PinnedMessage(_) => Kind::PinnedMessage,
            Self::UnpinnedMessage(_) => Kind::UnpinnedMessage,
            Self::NewChatMembers(_) => Kind::NewChatMembers,
            Self::LeftChatMembers(_) => Kind::LeftChatMembers,
        }
    }

    /// The chat the event happened in.
    pub fn chat(&self) -> &Chat {
        match self {
            Self::NewMessage(p) => &p.chat,
            Self::EditedMessage(p) => &p.chat,
            Self::DeletedMessage(p) => &p.chat,
            Self::PinnedMessage(p) => &p.chat,
            Self::UnpinnedMessage(p) => &p.chat,
            Self::NewChatMembers(p) => &p.chat,
            Self::LeftChatMembers(p) => &p.chat,
        }
    }

    /// Encodes the inner record without the kind tag.
    pub fn to_raw(&self) -> serde_json::Result<Box<RawValue>> {
        use serde_json::value::to_raw_value;

        match self {
            Self::NewMessage(p) => to_raw_value(p),
            Self::EditedMessage(p) => to_raw_value(p),
            Self::DeletedMessage(p) => to_raw_value(p),
            Self::PinnedMessage(p) => to_raw_value(p),
            Self::UnpinnedMessage(p) => to_raw_value(p),
            Self::NewChatMembers(p) => to_raw_value(p),
            Self::LeftChatMembers(p) => to_raw_value(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, FileRef, PartMessage, Quote};

    fn chat() -> Chat {
        Chat {
            chat_id: "681869378@chat.agent".to_string(),
            kind: ChatKind::Group,
            title: Some("The Best Group".to_string()),
        }
    }

    fn user(id: &str) -> User {
        User {
            user_id: id.to_string(),
            first_name: Some("Alice".to_string()),
            last_name: None,
        }
    }

    #[test]
    fn test_decode_new_message() {
        let raw = r#"{
            "msgId": "57883346846815030",
            "chat": {"chatId": "681869378@chat.agent", "type": "group", "title": "The Best Group"},
            "from": {"userId": "1234567890", "firstName": "Alice"},
            "timestamp": 1546290000,
            "text": "Hello!",
            "parts": [
                {"type": "sticker", "payload": {"fileId": "2IWuJzaNWCJZxJWCvZhDYuJ5XDsr7hU"}},
                {"type": "reply", "payload": {"message": {
                    "msgId": "6720509406122810000",
                    "from": {"userId": "1234567890"},
                    "text": "Some text",
                    "timestamp": 1546290000
                }}}
            ]
        }"#;

        let Payload::NewMessage(msg) = Payload::decode(Kind::NewMessage, raw).unwrap() else {
            panic!("expected new message");
        };
        assert_eq!(msg.msg_id, "57883346846815030");
        assert_eq!(msg.chat, chat());
        assert_eq!(msg.from, user("1234567890"));
        assert_eq!(msg.timestamp, 1546290000);
        assert_eq!(msg.text.as_deref(), Some("Hello!"));
        assert_eq!(
            msg.parts,
            vec![
                MessagePart::Sticker(FileRef {
                    file_id: "2IWuJzaNWCJZxJWCvZhDYuJ5XDsr7hU".to_string()
                }),
                MessagePart::Reply(Quote {
                    message: PartMessage {
                        msg_id: "6720509406122810000".to_string(),
                        from: User {
                            user_id: "1234567890".to_string(),
                            first_name: None,
                            last_name: None,
                        },
                        text: Some("Some text".to_string()),
                        timestamp: 1546290000,
                    }
                }),
            ]
        );
    }

    #[test]
    fn test_decode_left_members_without_remover() {
        let raw = r#"{
            "chat": {"chatId": "c", "type": "channel"},
            "leftMembers": [{"userId": "u1"}, {"userId": "u2"}]
        }"#;

        let Payload::LeftChatMembers(left) = Payload::decode(Kind::LeftChatMembers, raw).unwrap()
        else {
            panic!("expected left members");
        };
        assert_eq!(left.left_members.len(), 2);
        assert_eq!(left.removed_by, None);
        assert_eq!(left.chat.kind, ChatKind::Channel);
        assert_eq!(left.chat.title, None);
    }

    #[test]
    fn test_payload_error_names_field() {
        let raw = r#"{"msgId": "1", "timestamp": 5}"#;
        let err = Payload::decode(Kind::DeletedMessage, raw).unwrap_err();

        let DecodeError::Payload { kind, reason } = err else {
            panic!("expected payload error");
        };
        assert_eq!(kind, Kind::DeletedMessage);
        assert!(reason.contains("chat"), "reason: {reason}");
    }

    #[test]
    fn test_payload_rejects_negative_timestamp() {
        let raw = r#"{"msgId": "1", "chat": {"chatId": "c", "type": "private"}, "timestamp": -1}"#;
        assert!(matches!(
            Payload::decode(Kind::UnpinnedMessage, raw),
            Err(DecodeError::Payload { .. })
        ));
    }

    #[test]
    fn test_identifiers_round_trip_verbatim() {
        let payload = Payload::EditedMessage(EditedMessagePayload {
            msg_id: "000123.40".to_string(),
            chat: chat(),
            from: user("0099"),
            timestamp: u64::MAX,
            text: None,
            edited_timestamp: 1,
        });

        let event = Event::from_payload(42, &payload).unwrap();
        assert_eq!(event.event_type, "editedMessage");

        let decoded = event.decode().unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(decoded.chat().chat_id, "681869378@chat.agent");
    }

    fn every_kind() -> Vec<Payload> {
        let message = NewMessagePayload {
            msg_id: "1".to_string(),
            chat: chat(),
            from: user("10"),
            timestamp: 1546290000,
            text: Some("hi".to_string()),
            parts: Vec::new(),
        };
        let joined = NewChatMembersPayload {
            msg_id: "6".to_string(),
            chat: chat(),
            timestamp: 1546290006,
            new_members: Vec::new(),
            added_by: None,
        };
        let left = LeftChatMembersPayload {
            chat: chat(),
            left_members: vec![user("13")],
            removed_by: None,
        };

        vec![
            Payload::NewMessage(message.clone()),
            Payload::NewMessage(NewMessagePayload {
                text: None,
                parts: vec![
                    MessagePart::Sticker(FileRef {
                        file_id: "s1".to_string(),
                    }),
                    MessagePart::Mention(user("11")),
                    MessagePart::Forward(Quote {
                        message: PartMessage {
                            msg_id: "0".to_string(),
                            from: user("12"),
                            text: None,
                            timestamp: 1546289999,
                        },
                    }),
                ],
                ..message
            }),
            Payload::EditedMessage(EditedMessagePayload {
                msg_id: "2".to_string(),
                chat: chat(),
                from: user("10"),
                timestamp: 1546290000,
                text: Some("edited".to_string()),
                edited_timestamp: 1546290002,
            }),
            Payload::DeletedMessage(DeletedMessagePayload {
                msg_id: "3".to_string(),
                chat: chat(),
                timestamp: 1546290003,
            }),
            Payload::PinnedMessage(PinnedMessagePayload {
                msg_id: "4".to_string(),
                chat: chat(),
                from: user("10"),
                timestamp: 1546290004,
                text: None,
            }),
            Payload::UnpinnedMessage(UnpinnedMessagePayload {
                msg_id: "5".to_string(),
                chat: chat(),
                timestamp: 1546290005,
            }),
            Payload::NewChatMembers(joined.clone()),
            Payload::NewChatMembers(NewChatMembersPayload {
                new_members: vec![user("14"), user("15")],
                added_by: Some(user("10")),
                ..joined
            }),
            Payload::LeftChatMembers(left.clone()),
            Payload::LeftChatMembers(LeftChatMembersPayload {
                removed_by: Some(user("10")),
                ..left
            }),
        ]
    }

    #[test]
    fn test_every_kind_survives_event_encoding() {
        let payloads = every_kind();
        for kind in Kind::ALL {
            assert!(
                payloads.iter().any(|p| p.kind() == kind),
                "no sample for {kind}"
            );
        }

        for (id, payload) in payloads.iter().enumerate() {
            let event = Event::from_payload(id as u64, payload).unwrap();
            assert_eq!(event.id, id as u64);
            assert_eq!(event.kind().unwrap(), payload.kind());
            assert_eq!(&event.decode().unwrap(), payload);
        }
    }

    #[test]
    fn test_payload_serializes_as_tagged_event() {
        let payload = Payload::DeletedMessage(DeletedMessagePayload {
            msg_id: "7".to_string(),
            chat: chat(),
            timestamp: 10,
        });

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["type"], "deletedMessage");
        assert_eq!(value["payload"]["msgId"], "7");
        assert_eq!(value["payload"]["chat"]["type"], "group");
    }
}
