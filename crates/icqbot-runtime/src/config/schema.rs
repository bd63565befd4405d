//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use icqbot_framework::UnknownKindPolicy;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IcqBotConfig {
    /// Bot API endpoint and credentials.
    #[serde(default)]
    pub api: ApiConfig,

    /// Long-polling behaviour.
    #[serde(default)]
    pub polling: PollingConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

// =============================================================================
// API
// =============================================================================

/// Which public bot API deployment to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFlavor {
    /// ICQ New.
    #[default]
    Icq,
    /// Mail.ru Agent.
    Agent,
}

impl ApiFlavor {
    /// Returns the base URL of this deployment.
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Icq => "https://api.icq.net/bot/v1",
            Self::Agent => "https://agent.mail.ru/bot/v1",
        }
    }
}

/// API endpoint configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Deployment used when `base_url` is not set.
    #[serde(default)]
    pub flavor: ApiFlavor,

    /// Explicit base URL, overriding `flavor`.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bot token issued by the platform.
    #[serde(default)]
    pub token: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Must be longer than the long-poll hold time.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            flavor: ApiFlavor::default(),
            base_url: None,
            token: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ApiConfig {
    /// Returns the effective base URL.
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.flavor.base_url())
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("flavor", &self.flavor)
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

fn default_timeout_ms() -> u64 {
    90_000
}

// =============================================================================
// Polling
// =============================================================================

/// Long-polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// How long the server may hold a poll open, in seconds.
    #[serde(default = "default_poll_time_secs")]
    pub poll_time_secs: u64,

    /// What to do with events of an unrecognised type.
    #[serde(default)]
    pub unknown_kind: UnknownKindPolicy,

    /// Backoff applied to failed polls.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            poll_time_secs: default_poll_time_secs(),
            unknown_kind: UnknownKindPolicy::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl PollingConfig {
    /// Returns the long-poll hold time.
    pub fn poll_time(&self) -> Duration {
        Duration::from_secs(self.poll_time_secs)
    }
}

fn default_poll_time_secs() -> u64 {
    60
}

/// Retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of consecutive retries; absent means retry forever.
    #[serde(default)]
    pub max_retries: Option<u32>,

    /// Initial delay between retries in milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Exponential backoff multiplier.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: None,
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryConfig {
    /// Converts to core retry config.
    pub fn to_core_retry(&self) -> icqbot_core::RetryConfig {
        icqbot_core::RetryConfig {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            multiplier: self.backoff_multiplier,
        }
    }
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to `full` without it.
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Rotation schedule for file output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level; `RUST_LOG` takes precedence when set.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file, required when `output` is `file`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default)]
    pub rotation: LogRotation,

    /// Per-module levels, e.g. `icqbot_runtime = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread IDs in log lines.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line in log lines.
    #[serde(default)]
    pub file_location: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IcqBotConfig::default();
        assert_eq!(config.api.base_url(), "https://api.icq.net/bot/v1");
        assert_eq!(config.api.timeout(), Duration::from_secs(90));
        assert_eq!(config.polling.poll_time(), Duration::from_secs(60));
        assert_eq!(config.polling.unknown_kind, UnknownKindPolicy::Skip);
        assert_eq!(config.logging.level, LogLevel::Info);

        let retry = config.polling.retry.to_core_retry();
        assert_eq!(retry.max_retries, None);
        assert_eq!(retry.initial_delay, Duration::from_millis(500));
        assert_eq!(retry.max_delay, Duration::from_secs(30));
    }

    #[test]
    fn test_base_url_override() {
        let api = ApiConfig {
            flavor: ApiFlavor::Agent,
            ..Default::default()
        };
        assert_eq!(api.base_url(), "https://agent.mail.ru/bot/v1");

        let api = ApiConfig {
            base_url: Some("http://localhost:8080/bot/v1".to_string()),
            ..api
        };
        assert_eq!(api.base_url(), "http://localhost:8080/bot/v1");
    }

    #[test]
    fn test_debug_redacts_token() {
        let api = ApiConfig {
            token: "001.0123456789.0123456789:123456789".to_string(),
            ..Default::default()
        };
        assert!(!format!("{api:?}").contains("0123456789"));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
api:
  flavor: agent
  token: "001.abc"
polling:
  poll_time_secs: 30
  unknown_kind: fail
  retry:
    max_retries: 5
    initial_delay_ms: 100
logging:
  level: debug
  format: pretty
  filters:
    icqbot_runtime: trace
"#;

        let config: IcqBotConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.flavor, ApiFlavor::Agent);
        assert_eq!(config.api.timeout_ms, 90_000);
        assert_eq!(config.polling.poll_time_secs, 30);
        assert_eq!(config.polling.unknown_kind, UnknownKindPolicy::Fail);
        assert_eq!(config.polling.retry.max_retries, Some(5));
        assert_eq!(config.polling.retry.max_delay_ms, 30_000);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(
            config.logging.filters.get("icqbot_runtime"),
            Some(&LogLevel::Trace)
        );
    }
}
