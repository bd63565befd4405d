//! Caller-facing handle of a polling session.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::DropGuard;

use icqbot_core::Event;

use crate::error::{RuntimeError, RuntimeResult};

/// Events of one polling session, in delivery order.
///
/// The stream ends when the session ends. Dropping it cancels the session;
/// [`EventStream::finish`] does the same and also reports how the poller
/// ended.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<Event>,
    task: JoinHandle<RuntimeResult<()>>,
    cancel: DropGuard,
}

impl EventStream {
    pub(crate) fn new(
        rx: mpsc::Receiver<Event>,
        task: JoinHandle<RuntimeResult<()>>,
        cancel: DropGuard,
    ) -> Self {
        Self { rx, task, cancel }
    }

    /// Receives the next event, or `None` once the session has ended.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Stops the session and waits for the poller to exit.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the session, if it ended on its own with
    /// one.
    pub async fn finish(self) -> RuntimeResult<()> {
        let Self {
            mut rx,
            task,
            cancel,
        } = self;

        rx.close();
        drop(cancel);

        task.await
            .map_err(|e| RuntimeError::Task(e.to_string()))?
    }
}

impl Stream for EventStream {
    type Item = Event;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Event>> {
        self.rx.poll_recv(cx)
    }
}
