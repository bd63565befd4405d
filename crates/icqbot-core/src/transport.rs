//! The outbound-call seam.
//!
//! The pipeline never talks HTTP directly. It hands an [`ApiRequest`] to a
//! [`Transport`] and gets the raw response body back; `icqbot-transport`
//! provides the HTTP implementation and tests substitute scripted ones.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportResult;

/// HTTP method of an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

/// One call against the bot API, relative to the transport's base URL.
///
/// Credentials are not part of the request; the transport attaches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the base URL, starting with `/`.
    pub path: String,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    /// Creates a GET request for `path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Returns the first value for `key`, if any.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Performs API calls and returns the raw response body.
///
/// Implementations map any non-success outcome to a
/// [`TransportError`](crate::TransportError); a returned body is always from a
/// successful response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, request: ApiRequest) -> TransportResult<Vec<u8>>;
}

/// A shared, type-erased transport.
pub type BoxedTransport = Arc<dyn Transport>;

/// Exponential backoff settings for retrying failed polls.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Consecutive failures tolerated before giving up; `None` retries forever.
    pub max_retries: Option<u32>,
    /// Delay after the first failure.
    pub initial_delay: Duration,
    /// Upper bound on the delay.
    pub max_delay: Duration,
    /// Growth factor applied after each consecutive failure.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: None,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Transport for Echo {
        async fn call(&self, request: ApiRequest) -> TransportResult<Vec<u8>> {
            Ok(request.path.into_bytes())
        }
    }

    #[test]
    fn test_request_builder_keeps_order() {
        let req = ApiRequest::get("/events/get")
            .query("lastEventId", 17u64)
            .query("pollTime", 60);

        assert_eq!(req.method, Method::Get);
        assert_eq!(req.query_value("lastEventId"), Some("17"));
        assert_eq!(req.query_value("pollTime"), Some("60"));
        assert_eq!(req.query_value("token"), None);
        assert_eq!(req.query[0].0, "lastEventId");
    }

    #[tokio::test]
    async fn test_boxed_transport_is_object_safe() {
        let transport: BoxedTransport = Arc::new(Echo);
        let body = transport.call(ApiRequest::get("/self/get")).await.unwrap();
        assert_eq!(body, b"/self/get");
    }
}
