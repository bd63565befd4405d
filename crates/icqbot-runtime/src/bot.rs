//! The bot entry point.
//!
//! A [`Bot`] owns a transport and the session settings. It runs at most one
//! session at a time, in one of two modes:
//!
//! - [`Bot::poll_events`] hands events to the caller as an [`EventStream`]
//! - [`Bot::handle_events`] dispatches them to a [`HandlerTable`]
//!
//! ```text
//!                    ┌──────────┐  mpsc(1)  ┌─────────────┐
//!   transport ──────▶│  Poller  │──────────▶│ EventStream │  (poll_events)
//!                    │  (task)  │     or    ├─────────────┤
//!                    └──────────┘           │ Dispatcher  │  (handle_events)
//!                                           └─────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use icqbot_core::BoxedTransport;
use icqbot_framework::{DispatchSummary, Dispatcher, HandlerTable};

use crate::error::{RuntimeError, RuntimeResult};
use crate::lifecycle::{BotState, Lifecycle, SessionMode};
use crate::poller::{EVENT_BUFFER, Poller};
use crate::session::SessionConfig;
use crate::stream::EventStream;

#[cfg(feature = "http-client")]
use crate::config::{IcqBotConfig, validate_config};

/// A long-polling bot.
#[derive(Clone)]
pub struct Bot {
    transport: BoxedTransport,
    session: Arc<SessionConfig>,
    lifecycle: Lifecycle,
}

impl Bot {
    /// Creates a bot over an existing transport.
    pub fn new(transport: BoxedTransport, session: SessionConfig) -> Self {
        Self {
            transport,
            session: Arc::new(session),
            lifecycle: Lifecycle::new(),
        }
    }

    /// Validates `config` and creates a bot talking HTTP to the configured
    /// endpoint.
    #[cfg(feature = "http-client")]
    pub fn from_config(config: &IcqBotConfig) -> RuntimeResult<Self> {
        use icqbot_core::BotError;
        use icqbot_transport::HttpTransport;

        validate_config(config)?;

        let transport = HttpTransport::new(
            config.api.base_url(),
            config.api.token.clone(),
            config.api.timeout(),
        )
        .map_err(BotError::from)?;

        info!(
            base_url = transport.base_url(),
            poll_time_secs = config.polling.poll_time_secs,
            "Bot configured"
        );

        Ok(Self::new(
            Arc::new(transport),
            SessionConfig::from(&config.polling),
        ))
    }

    pub fn state(&self) -> BotState {
        self.lifecycle.state()
    }

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    fn poller(&self, cancel: CancellationToken) -> Poller {
        Poller::new(self.transport.clone(), Arc::clone(&self.session), cancel)
    }

    /// Starts a session that yields raw events to the caller.
    ///
    /// The session ends when `cancel` fires, the stream is dropped or
    /// finished, or polling fails for good. The bot is back in
    /// [`BotState::Stopped`] by the time the stream yields `None`.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::AlreadyActive`] if a session is already running.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn poll_events(&self, cancel: CancellationToken) -> RuntimeResult<EventStream> {
        let active = self.lifecycle.activate(SessionMode::Polling)?;

        let child = cancel.child_token();
        let poller = self.poller(child.clone());
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        let task = tokio::spawn(poller.hold(active).run(tx));

        Ok(EventStream::new(rx, task, child.drop_guard()))
    }

    /// Runs a session that dispatches every event to `handlers`.
    ///
    /// Poll failures are also reported to the table's error handler. Returns
    /// once `cancel` fires or the session fails.
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::AlreadyActive`] if a session is already running.
    /// - The error that ended the session otherwise. A dispatch failure takes
    ///   precedence over the poller's own outcome.
    pub async fn handle_events(
        &self,
        handlers: HandlerTable,
        cancel: CancellationToken,
    ) -> RuntimeResult<DispatchSummary> {
        let _active = self.lifecycle.activate(SessionMode::Handling)?;

        let child = cancel.child_token();
        let _stop_poller = child.clone().drop_guard();

        let mut poller = self.poller(child.clone());
        if let Some(callback) = handlers.error_callback() {
            poller = poller.on_error(callback);
        }

        let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
        let task = tokio::spawn(poller.run(tx));

        debug!(handlers = ?handlers, "Dispatching events");
        let dispatcher = Dispatcher::new(Arc::new(handlers), self.session.unknown_kind);
        let dispatched = dispatcher
            .run(futures::stream::poll_fn(|cx| rx.poll_recv(cx)))
            .await;

        if dispatched.is_err() {
            child.cancel();
        }
        drop(rx);

        let polled = task
            .await
            .map_err(|e| RuntimeError::Task(e.to_string()))?;

        let summary = dispatched?;
        polled?;

        info!(
            handled = summary.handled,
            unhandled = summary.unhandled,
            dropped = summary.dropped,
            skipped = summary.skipped,
            "Handling session finished"
        );
        Ok(summary)
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("session", &self.session)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
