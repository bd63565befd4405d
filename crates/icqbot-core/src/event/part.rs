//! Message parts attached to new messages.

use serde::{Deserialize, Serialize};

use super::payload::User;

/// One attachment of a message, tagged `{type, payload}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum MessagePart {
    /// Sticker.
    Sticker(FileRef),
    /// Mention of a user.
    Mention(User),
    /// Voice recording.
    Voice(FileRef),
    /// Shared file.
    File(PartFile),
    /// Forwarded message.
    Forward(Quote),
    /// Message being replied to.
    Reply(Quote),
}

/// Reference to an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    /// File ID.
    pub file_id: String,
}

/// A shared file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartFile {
    /// File ID.
    pub file_id: String,
    /// Media type of the file.
    #[serde(rename = "type")]
    pub kind: FileType,
    /// Caption sent with the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Media type of a shared file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Picture.
    Image,
    /// Audio clip.
    Audio,
    /// Video clip.
    Video,
}

/// A forwarded or replied-to message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// The quoted message.
    pub message: PartMessage,
}

/// Message carried inside a forward or reply part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartMessage {
    /// Message ID.
    pub msg_id: String,
    /// Author of the message.
    pub from: User,
    /// Message text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Send time (Unix seconds).
    pub timestamp: u64,
}
