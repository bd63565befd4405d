//! HTTP transport over `reqwest`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Url};
use tracing::{debug, trace};

use icqbot_core::{ApiRequest, Method, Transport, TransportError, TransportResult};

/// Query parameter that carries the bot token.
const TOKEN_PARAM: &str = "token";

/// Calls the bot API over HTTPS, authenticating with a token query parameter.
///
/// The token never appears in logs or error messages.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    /// Creates a transport for `base_url` with a per-request `timeout`.
    ///
    /// The timeout must exceed the long-poll hold time, or every idle poll
    /// will fail as a timeout.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> TransportResult<Self> {
        let base_url = base_url.into();
        let token = token.into();

        Url::parse(&base_url)
            .map_err(|e| TransportError::InvalidConfig(format!("base url '{base_url}': {e}")))?;
        if token.is_empty() {
            return Err(TransportError::InvalidConfig("token is empty".to_string()));
        }

        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Returns the base URL calls are made against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Joins `base_url` and the request path, appending the query and the token.
fn build_url(base_url: &str, token: &str, request: &ApiRequest) -> TransportResult<Url> {
    let endpoint = format!("{}{}", base_url.trim_end_matches('/'), request.path);
    let params = request
        .query
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .chain(std::iter::once((TOKEN_PARAM, token)));

    Url::parse_with_params(&endpoint, params)
        .map_err(|e| TransportError::request(&request.path, e.to_string()))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, request: ApiRequest) -> TransportResult<Vec<u8>> {
        let url = build_url(&self.base_url, &self.token, &request)?;
        let path = request.path.as_str();

        trace!(method = ?request.method, path = %path, "Sending API request");

        let builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };

        let resp = builder
            .send()
            .await
            .map_err(|e| TransportError::request(path, e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!(path = %path, status = status.as_u16(), "API request failed");
            return Err(TransportError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| TransportError::request(path, e.without_url().to_string()))?;

        trace!(path = %path, bytes = body.len(), "API response received");
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP response and returns the request head it received.
    async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });

        (format!("http://{addr}/bot/v1"), handle)
    }

    #[test]
    fn test_build_url_appends_token_last() {
        let req = ApiRequest::get("/events/get")
            .query("lastEventId", 5)
            .query("pollTime", 60);

        let url = build_url("https://api.icq.net/bot/v1/", "001.abc def", &req).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.icq.net/bot/v1/events/get?lastEventId=5&pollTime=60&token=001.abc+def"
        );
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let timeout = Duration::from_secs(1);
        assert!(matches!(
            HttpTransport::new("not a url", "t", timeout),
            Err(TransportError::InvalidConfig(_))
        ));
        assert!(matches!(
            HttpTransport::new("https://agent.mail.ru/bot/v1", "", timeout),
            Err(TransportError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let transport =
            HttpTransport::new("https://api.icq.net/bot/v1", "secret-token", Duration::from_secs(1))
                .unwrap();
        let rendered = format!("{transport:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("api.icq.net"));
    }

    #[tokio::test]
    async fn test_call_returns_body() {
        let (base, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 13\r\nConnection: close\r\n\r\n{\"events\":[]}",
        )
        .await;

        let transport = HttpTransport::new(base, "tok", Duration::from_secs(5)).unwrap();
        let body = transport
            .call(ApiRequest::get("/events/get").query("lastEventId", 0))
            .await
            .unwrap();
        assert_eq!(body, br#"{"events":[]}"#);

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /bot/v1/events/get?lastEventId=0&token=tok HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_call_maps_status_error() {
        let (base, server) = serve_once(
            "HTTP/1.1 401 Unauthorized\r\nContent-Length: 5\r\nConnection: close\r\n\r\nnope!",
        )
        .await;

        let transport = HttpTransport::new(base, "secret", Duration::from_secs(5)).unwrap();
        let err = transport
            .call(ApiRequest::get("/events/get"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TransportError::Status {
                path: "/events/get".to_string(),
                status: 401,
                body: "nope!".to_string(),
            }
        );
        assert!(!err.to_string().contains("secret"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_error_hides_token() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport =
            HttpTransport::new(format!("http://{addr}"), "secret", Duration::from_secs(5)).unwrap();
        let err = transport
            .call(ApiRequest::get("/events/get"))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Request { .. }));
        assert!(!err.to_string().contains("secret"));
    }
}
