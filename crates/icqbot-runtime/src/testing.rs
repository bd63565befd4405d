//! Scripted in-memory transport for poller and bot tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use icqbot_core::{ApiRequest, Transport, TransportError, TransportResult};

/// Replies to calls from a fixed script, then holds every further call open
/// like an idle long poll.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<TransportResult<String>>>,
    requests: Mutex<Vec<ApiRequest>>,
    idle: Notify,
}

impl ScriptedTransport {
    pub(crate) fn new(script: impl IntoIterator<Item = TransportResult<String>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Resolves once a call has found the script empty.
    pub(crate) async fn wait_idle(&self) {
        self.idle.notified().await;
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    /// The `lastEventId` of every request so far.
    pub(crate) fn watermarks(&self) -> Vec<u64> {
        self.requests
            .lock()
            .iter()
            .filter_map(|r| r.query_value("lastEventId")?.parse().ok())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn call(&self, request: ApiRequest) -> TransportResult<Vec<u8>> {
        self.requests.lock().push(request);
        let next = self.script.lock().pop_front();
        match next {
            Some(reply) => reply.map(String::into_bytes),
            None => {
                self.idle.notify_one();
                futures::future::pending().await
            }
        }
    }
}

pub(crate) fn network_error() -> TransportResult<String> {
    Err(TransportError::request("/events/get", "connection reset"))
}

/// A poll response with one event per `(id, type)`, carrying `payload`.
pub(crate) fn batch(events: &[(u64, &str, &str)]) -> TransportResult<String> {
    let events: Vec<String> = events
        .iter()
        .map(|(id, kind, payload)| {
            format!(r#"{{"eventId":{id},"type":"{kind}","payload":{payload}}}"#)
        })
        .collect();
    Ok(format!(r#"{{"events":[{}],"ok":true}}"#, events.join(",")))
}

/// A well-formed `newMessage` payload.
pub(crate) fn new_message(text: &str) -> String {
    format!(
        r#"{{"msgId":"57883346846815030","chat":{{"chatId":"681869378@chat.agent","type":"group"}},"from":{{"userId":"1234567890","firstName":"Name"}},"timestamp":1546290000,"text":"{text}"}}"#
    )
}
