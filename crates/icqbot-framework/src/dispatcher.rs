//! Event dispatcher.
//!
//! The [`Dispatcher`] consumes raw [`Event`]s, decodes each payload by its
//! discriminant and runs the matching handler from an immutable
//! [`HandlerTable`]. Per event:
//!
//! 1. The payload is decoded; a malformed payload is reported and dropped
//! 2. An unknown discriminant is handled according to [`UnknownKindPolicy`]
//! 3. The registered handler runs to completion before the next event is taken
//! 4. Without a registered handler the event is silently discarded

use std::sync::Arc;

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, Level, debug, span, warn};

use crate::handler::HandlerTable;
use icqbot_core::{BotError, BotResult, DecodeError, Event};

/// What to do with an event whose discriminant is not recognised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKindPolicy {
    /// Report the event to the error handler and keep going.
    #[default]
    Skip,
    /// Stop dispatching with the error.
    Fail,
}

/// The outcome of dispatching one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A handler ran.
    Handled,
    /// The payload decoded but no handler is registered for its kind.
    Unhandled,
    /// The payload failed to decode and was reported.
    Dropped,
    /// The discriminant was unknown and the event was skipped.
    Skipped,
}

/// Per-outcome counts for a dispatch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub handled: u64,
    pub unhandled: u64,
    pub dropped: u64,
    pub skipped: u64,
}

impl DispatchSummary {
    /// Counts one outcome.
    pub fn record(&mut self, outcome: Dispatch) {
        match outcome {
            Dispatch::Handled => self.handled += 1,
            Dispatch::Unhandled => self.unhandled += 1,
            Dispatch::Dropped => self.dropped += 1,
            Dispatch::Skipped => self.skipped += 1,
        }
    }

    /// Total number of events seen.
    pub fn total(&self) -> u64 {
        self.handled + self.unhandled + self.dropped + self.skipped
    }
}

/// Routes events to the handlers of a [`HandlerTable`].
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Arc<HandlerTable>,
    policy: UnknownKindPolicy,
}

impl Dispatcher {
    /// Creates a dispatcher over a frozen handler table.
    pub fn new(handlers: Arc<HandlerTable>, policy: UnknownKindPolicy) -> Self {
        Self { handlers, policy }
    }

    /// Returns the handler table.
    pub fn handlers(&self) -> &Arc<HandlerTable> {
        &self.handlers
    }

    /// Dispatches a single event.
    ///
    /// # Errors
    ///
    /// Only an unknown discriminant under [`UnknownKindPolicy::Fail`] is an
    /// error; every other failure is reported and absorbed.
    pub async fn dispatch(&self, event: &Event) -> BotResult<Dispatch> {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            event_id = event.id,
            kind = %event.event_type
        );

        async {
            let payload = match event.decode() {
                Ok(payload) => payload,
                Err(err @ DecodeError::UnknownKind { .. }) => {
                    let err = BotError::from(err);
                    self.handlers.report(&err);
                    return match self.policy {
                        UnknownKindPolicy::Skip => {
                            warn!(error = %err, "Skipping event of unknown kind");
                            Ok(Dispatch::Skipped)
                        }
                        UnknownKindPolicy::Fail => Err(err),
                    };
                }
                Err(err) => {
                    let err = BotError::from(err);
                    warn!(error = %err, "Dropping event with malformed payload");
                    self.handlers.report(&err);
                    return Ok(Dispatch::Dropped);
                }
            };

            if self.handlers.invoke(payload).await {
                debug!("Event handled");
                Ok(Dispatch::Handled)
            } else {
                debug!("No handler registered, event discarded");
                Ok(Dispatch::Unhandled)
            }
        }
        .instrument(span)
        .await
    }

    /// Dispatches events until the stream ends.
    ///
    /// Events are handled one at a time, in stream order.
    pub async fn run<S>(&self, mut events: S) -> BotResult<DispatchSummary>
    where
        S: Stream<Item = Event> + Unpin,
    {
        let mut summary = DispatchSummary::default();

        while let Some(event) = events.next().await {
            summary.record(self.dispatch(&event).await?);
        }

        debug!(
            handled = summary.handled,
            unhandled = summary.unhandled,
            dropped = summary.dropped,
            skipped = summary.skipped,
            "Event stream closed"
        );
        Ok(summary)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.handlers)
            .field("policy", &self.policy)
            .finish()
    }
}
