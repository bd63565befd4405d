//! Handler registration.
//!
//! Handlers are registered on a [`HandlerTableBuilder`] and frozen into a
//! [`HandlerTable`] before a session starts. The table is never mutated
//! afterwards, so the dispatcher can share it without locking.
//!
//! ```rust,ignore
//! use icqbot_framework::HandlerTable;
//!
//! let handlers = HandlerTable::builder()
//!     .on_new_message(|msg| async move {
//!         println!("{}: {:?}", msg.chat.chat_id, msg.text);
//!     })
//!     .on_error(|err| eprintln!("bot error: {err}"))
//!     .build();
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use icqbot_core::{
    BotError, DeletedMessagePayload, EditedMessagePayload, Kind, LeftChatMembersPayload,
    NewChatMembersPayload, NewMessagePayload, Payload, PinnedMessagePayload,
    UnpinnedMessagePayload,
};

/// A type alias for a boxed, pinned future that is `Send`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type-erased async handler for one payload type.
pub type Callback<P> = Arc<dyn Fn(P) -> BoxFuture<'static, ()> + Send + Sync>;

/// Receives every error the pipeline reports.
pub type ErrorCallback = Arc<dyn Fn(&BotError) + Send + Sync>;

fn erase<P, F, Fut>(f: F) -> Callback<P>
where
    P: 'static,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |payload: P| -> BoxFuture<'static, ()> { Box::pin(f(payload)) })
}

// ============================================================================
// HandlerTable
// ============================================================================

/// At most one handler per [`Kind`], plus one error handler.
#[derive(Clone, Default)]
pub struct HandlerTable {
    new_message: Option<Callback<NewMessagePayload>>,
    edited_message: Option<Callback<EditedMessagePayload>>,
    deleted_message: Option<Callback<DeletedMessagePayload>>,
    pinned_message: Option<Callback<PinnedMessagePayload>>,
    unpinned_message: Option<Callback<UnpinnedMessagePayload>>,
    new_chat_members: Option<Callback<NewChatMembersPayload>>,
    left_chat_members: Option<Callback<LeftChatMembersPayload>>,
    error: Option<ErrorCallback>,
}

impl HandlerTable {
    /// Starts building a table.
    pub fn builder() -> HandlerTableBuilder {
        HandlerTableBuilder::default()
    }

    /// Returns true if a handler is registered for `kind`.
    pub fn handles(&self, kind: Kind) -> bool {
        match kind {
            Kind::NewMessage => self.new_message.is_some(),
            Kind::EditedMessage => self.edited_message.is_some(),
            Kind::DeletedMessage => self.deleted_message.is_some(),
            Kind::PinnedMessage => self.pinned_message.is_some(),
            Kind::UnpinnedMessage => self.unpinned_message.is_some(),
            Kind::NewChatMembers => self.new_chat_members.is_some(),
            Kind::LeftChatMembers => self.left_chat_members.is_some(),
        }
    }

    /// Runs the handler registered for the payload's kind.
    ///
    /// Returns false without doing anything when no handler is registered.
    pub async fn invoke(&self, payload: Payload) -> bool {
        fn call<P: 'static>(
            slot: &Option<Callback<P>>,
            payload: P,
        ) -> Option<BoxFuture<'static, ()>> {
            slot.as_ref().map(|f| f(payload))
        }

        let fut = match payload {
            Payload::NewMessage(p) => call(&self.new_message, p),
            Payload::EditedMessage(p) => call(&self.edited_message, p),
            Payload::DeletedMessage(p) => call(&self.deleted_message, p),
            Payload::PinnedMessage(p) => call(&self.pinned_message, p),
            Payload::UnpinnedMessage(p) => call(&self.unpinned_message, p),
            Payload::NewChatMembers(p) => call(&self.new_chat_members, p),
            Payload::LeftChatMembers(p) => call(&self.left_chat_members, p),
        };

        match fut {
            Some(fut) => {
                fut.await;
                true
            }
            None => false,
        }
    }

    /// Hands an error to the error handler, if one is registered.
    pub fn report(&self, error: &BotError) {
        if let Some(f) = &self.error {
            f(error);
        }
    }

    /// Returns the error handler, if one is registered.
    pub fn error_callback(&self) -> Option<ErrorCallback> {
        self.error.clone()
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<&str> = Kind::ALL
            .into_iter()
            .filter(|k| self.handles(*k))
            .map(|k| k.as_str())
            .collect();

        f.debug_struct("HandlerTable")
            .field("kinds", &kinds)
            .field("error", &self.error.is_some())
            .finish()
    }
}

// ============================================================================
// HandlerTableBuilder
// ============================================================================

/// Collects handlers before a session starts.
///
/// Registering a second handler for the same kind replaces the first.
#[derive(Default)]
pub struct HandlerTableBuilder {
    table: HandlerTable,
}

macro_rules! setter {
    ($(#[$doc:meta])* $name:ident, $field:ident, $payload:ty) => {
        $(#[$doc])*
        pub fn $name<F, Fut>(mut self, f: F) -> Self
        where
            F: Fn($payload) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = ()> + Send + 'static,
        {
            self.table.$field = Some(erase(f));
            self
        }
    };
}

impl HandlerTableBuilder {
    setter!(
        /// Handles posted messages.
        on_new_message, new_message, NewMessagePayload
    );
    setter!(
        /// Handles edited messages.
        on_edited_message, edited_message, EditedMessagePayload
    );
    setter!(
        /// Handles deleted messages.
        on_deleted_message, deleted_message, DeletedMessagePayload
    );
    setter!(
        /// Handles pinned messages.
        on_pinned_message, pinned_message, PinnedMessagePayload
    );
    setter!(
        /// Handles unpinned messages.
        on_unpinned_message, unpinned_message, UnpinnedMessagePayload
    );
    setter!(
        /// Handles members joining a chat.
        on_new_chat_members, new_chat_members, NewChatMembersPayload
    );
    setter!(
        /// Handles members leaving a chat.
        on_left_chat_members, left_chat_members, LeftChatMembersPayload
    );

    /// Receives transport, decode and unknown-kind errors.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&BotError) + Send + Sync + 'static,
    {
        self.table.error = Some(Arc::new(f));
        self
    }

    /// Freezes the registrations.
    pub fn build(self) -> HandlerTable {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icqbot_core::{Chat, ChatKind, DecodeError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn deleted(msg_id: &str) -> Payload {
        Payload::DeletedMessage(DeletedMessagePayload {
            msg_id: msg_id.to_string(),
            chat: Chat {
                chat_id: "c".to_string(),
                kind: ChatKind::Private,
                title: None,
            },
            timestamp: 1,
        })
    }

    #[tokio::test]
    async fn test_invoke_routes_by_kind() {
        let deleted_calls = Arc::new(AtomicUsize::new(0));
        let edited_calls = Arc::new(AtomicUsize::new(0));

        let d = deleted_calls.clone();
        let e = edited_calls.clone();
        let table = HandlerTable::builder()
            .on_deleted_message(move |p| {
                let d = d.clone();
                async move {
                    assert_eq!(p.msg_id, "42");
                    d.fetch_add(1, Ordering::SeqCst);
                }
            })
            .on_edited_message(move |_| {
                let e = e.clone();
                async move {
                    e.fetch_add(1, Ordering::SeqCst);
                }
            })
            .build();

        assert!(table.invoke(deleted("42")).await);
        assert_eq!(deleted_calls.load(Ordering::SeqCst), 1);
        assert_eq!(edited_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invoke_without_handler() {
        let table = HandlerTable::builder().build();
        assert!(!table.invoke(deleted("1")).await);
        assert!(!table.handles(Kind::DeletedMessage));
    }

    #[test]
    fn test_report() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let table = HandlerTable::builder()
            .on_error(move |err| {
                assert!(matches!(err, BotError::Decode(_)));
                c.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        table.report(&DecodeError::envelope("bad").into());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // No error handler is not an error.
        HandlerTable::default().report(&DecodeError::envelope("bad").into());
    }

    #[test]
    fn test_debug_lists_registered_kinds() {
        let table = HandlerTable::builder()
            .on_pinned_message(|_| async {})
            .on_left_chat_members(|_| async {})
            .build();

        let rendered = format!("{table:?}");
        assert!(rendered.contains("pinnedMessage"));
        assert!(rendered.contains("leftChatMembers"));
        assert!(!rendered.contains("newMessage"));
    }
}
