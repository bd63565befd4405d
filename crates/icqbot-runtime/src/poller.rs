//! Long-polling loop.
//!
//! The [`Poller`] owns the watermark of one session. Each iteration asks the
//! server for events newer than the watermark, hands them one at a time to
//! the consumer in server order, and then moves the watermark to the highest
//! id of the batch.
//!
//! ```text
//!            ┌──────────── empty batch ────────────┐
//!            ▼                                     │
//!  ┌───▶ GET /events/get ──ok──▶ emit e1..en ──────┴──▶ watermark = max(id)
//!  │         │                                               │
//!  │    transport error / rejected                           │
//!  │         ▼                                               │
//!  └──── backoff sleep ◀─────────────────────────────────────┘ (next poll)
//! ```
//!
//! A malformed envelope ends the session, as do cancellation, a dropped
//! consumer and an exhausted retry budget.
//!
//! Cancellation does not wait for an open long poll: the request is
//! abandoned. The watermark only moves once a batch has been handed over, so
//! the next session asks for the same events again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use icqbot_core::{
    ApiRequest, BotError, BotResult, BoxedTransport, Event, RetryConfig, decode_envelope,
};
use icqbot_framework::ErrorCallback;

use crate::error::{RuntimeError, RuntimeResult};
use crate::lifecycle::ActiveSession;
use crate::session::SessionConfig;

/// Path of the polling endpoint.
pub const EVENTS_PATH: &str = "/events/get";

/// Capacity of the poller-to-consumer channel.
///
/// One slot keeps the poller at most one event ahead of the consumer.
pub const EVENT_BUFFER: usize = 1;

/// Polls the bot API for one session.
pub struct Poller {
    transport: BoxedTransport,
    session: Arc<SessionConfig>,
    cancel: CancellationToken,
    on_error: Option<ErrorCallback>,
    active: Option<ActiveSession>,
    watermark: u64,
}

impl Poller {
    /// Creates a poller starting from watermark zero.
    pub fn new(
        transport: BoxedTransport,
        session: Arc<SessionConfig>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            transport,
            session,
            cancel,
            on_error: None,
            active: None,
            watermark: 0,
        }
    }

    /// Also hands every poll failure to `callback`.
    pub fn on_error(mut self, callback: ErrorCallback) -> Self {
        self.on_error = Some(callback);
        self
    }

    /// Holds the session guard for the lifetime of [`Poller::run`].
    ///
    /// The guard is released before the sender is dropped, so a consumer that
    /// sees the stream end can start a new session straight away.
    pub fn hold(mut self, active: ActiveSession) -> Self {
        self.active = Some(active);
        self
    }

    /// The id of the newest event seen so far.
    pub fn watermark(&self) -> u64 {
        self.watermark
    }

    fn request(&self) -> ApiRequest {
        ApiRequest::get(EVENTS_PATH)
            .query("lastEventId", self.watermark)
            .query("pollTime", self.session.poll_time.as_secs())
    }

    async fn poll_once(&self) -> BotResult<Vec<Event>> {
        let body = self.transport.call(self.request()).await?;
        Ok(decode_envelope(&body)?)
    }

    fn report(&self, err: &BotError) {
        if let Some(callback) = &self.on_error {
            callback(err);
        }
    }

    /// Polls until cancelled, the receiver is dropped, or the session fails.
    ///
    /// The sender is dropped on return, which closes the consumer's stream.
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::Bot`] for a malformed envelope.
    /// - [`RuntimeError::RetriesExhausted`] once consecutive failures exceed
    ///   the retry budget.
    pub async fn run(mut self, tx: mpsc::Sender<Event>) -> RuntimeResult<()> {
        let mut backoff = Backoff::new(self.session.retry.clone());

        info!(
            poll_time_secs = self.session.poll_time.as_secs(),
            "Poller started"
        );

        let outcome = 'session: loop {
            if self.cancel.is_cancelled() {
                break Ok(());
            }
            if tx.is_closed() {
                debug!("Event receiver dropped");
                break Ok(());
            }

            trace!(watermark = self.watermark, "Polling for events");
            let polled = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break 'session Ok(()),
                polled = self.poll_once() => polled,
            };

            match polled {
                Ok(events) => {
                    backoff.reset();

                    let batch_max = events.iter().map(|e| e.id).max();
                    debug!(
                        watermark = self.watermark,
                        batch_len = events.len(),
                        "Received batch"
                    );

                    for event in events {
                        tokio::select! {
                            biased;
                            _ = self.cancel.cancelled() => break 'session Ok(()),
                            sent = tx.send(event) => {
                                if sent.is_err() {
                                    debug!("Event receiver dropped");
                                    break 'session Ok(());
                                }
                            }
                        }
                    }

                    if let Some(max) = batch_max {
                        self.watermark = max;
                    }
                }
                Err(err) if is_fatal(&err) => {
                    error!(error = %err, watermark = self.watermark, "Malformed poll response, ending session");
                    self.report(&err);
                    break Err(RuntimeError::Bot(err));
                }
                Err(err) => {
                    self.report(&err);

                    let Some(delay) = backoff.next_delay() else {
                        error!(error = %err, attempts = backoff.failures(), "Retry budget exhausted");
                        break Err(RuntimeError::RetriesExhausted {
                            attempts: backoff.failures(),
                            last: err,
                        });
                    };

                    warn!(
                        error = %err,
                        watermark = self.watermark,
                        delay = ?delay,
                        "Poll failed, backing off"
                    );

                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => break 'session Ok(()),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        };

        info!(watermark = self.watermark, "Poller stopped");
        drop(self.active.take());
        drop(tx);
        outcome
    }
}

fn is_fatal(err: &BotError) -> bool {
    matches!(err, BotError::Decode(e) if e.is_fatal())
}

// =============================================================================
// Backoff
// =============================================================================

/// Exponential backoff between consecutive failed polls.
#[derive(Debug)]
struct Backoff {
    config: RetryConfig,
    current: Duration,
    failures: u32,
}

impl Backoff {
    fn new(config: RetryConfig) -> Self {
        Self {
            current: config.initial_delay,
            config,
            failures: 0,
        }
    }

    fn failures(&self) -> u32 {
        self.failures
    }

    fn reset(&mut self) {
        self.failures = 0;
        self.current = self.config.initial_delay;
    }

    /// Records a failure and returns the delay before the next attempt, or
    /// `None` once the retry budget is spent.
    fn next_delay(&mut self) -> Option<Duration> {
        self.failures = self.failures.saturating_add(1);
        if let Some(max) = self.config.max_retries
            && self.failures > max
        {
            return None;
        }

        let delay = self.current.min(self.config.max_delay);
        self.current = Duration::try_from_secs_f64(
            self.current.as_secs_f64() * self.config.multiplier,
        )
        .unwrap_or(self.config.max_delay)
        .min(self.config.max_delay);

        Some(delay)
    }
}
