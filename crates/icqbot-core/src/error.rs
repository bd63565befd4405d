//! Error types shared by every layer of the pipeline.
//!
//! Runtime-level errors (lifecycle violations, configuration) live in
//! `icqbot-runtime`. The types here are the ones that cross the seam to user
//! code: error callbacks receive a [`BotError`], never raw bytes.

use thiserror::Error;

use crate::event::Kind;

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors that can occur while performing one outbound call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be sent or no response arrived (network, timeout).
    #[error("request to {path} failed: {reason}")]
    Request {
        /// The API path that was called.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// The server answered with a non-success status.
    #[error("request to {path} returned HTTP {status}: {body}")]
    Status {
        /// The API path that was called.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// Invalid transport configuration.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),
}

impl TransportError {
    /// Creates a request error.
    pub fn request(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Request {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Decode Errors
// =============================================================================

/// Errors produced by the envelope and payload decoders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The top-level poll response did not have the expected shape.
    #[error("malformed poll response: {reason}")]
    Envelope {
        /// Reason for failure.
        reason: String,
    },

    /// The server answered the poll with `ok: false`.
    #[error("poll rejected by server: {description}")]
    Rejected {
        /// Description supplied by the server.
        description: String,
    },

    /// The event's discriminant is not one of the known kinds.
    #[error("unknown event type '{kind}'")]
    UnknownKind {
        /// The discriminant as received.
        kind: String,
    },

    /// The payload of a known kind did not match its record type.
    #[error("malformed {kind} payload: {reason}")]
    Payload {
        /// The discriminant the payload was decoded as.
        kind: Kind,
        /// Reason for failure, naming the offending field where possible.
        reason: String,
    },
}

impl DecodeError {
    /// Creates an envelope error.
    pub fn envelope(reason: impl Into<String>) -> Self {
        Self::Envelope {
            reason: reason.into(),
        }
    }

    /// Returns true for failures that end a polling session.
    ///
    /// A rejected poll is retried like a transport failure, and payload-level
    /// errors only drop a single event.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Envelope { .. })
    }
}

// =============================================================================
// Bot Errors
// =============================================================================

/// The error value delivered to error callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BotError {
    /// A poll request failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A poll response or an event payload could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for operations that report to error callbacks.
pub type BotResult<T> = Result<T, BotError>;
