//! Immutable per-bot session settings.

use std::time::Duration;

use icqbot_core::RetryConfig;
use icqbot_framework::UnknownKindPolicy;

use crate::config::PollingConfig;

/// Settings shared by the poller and dispatcher of every session.
///
/// Built once when the bot is created and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// How long the server may hold a poll open.
    pub poll_time: Duration,
    /// Backoff for failed polls.
    pub retry: RetryConfig,
    /// Handling of unrecognised event types in self-dispatch mode.
    pub unknown_kind: UnknownKindPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_time: Duration::from_secs(60),
            retry: RetryConfig::default(),
            unknown_kind: UnknownKindPolicy::default(),
        }
    }
}

impl From<&PollingConfig> for SessionConfig {
    fn from(config: &PollingConfig) -> Self {
        Self {
            poll_time: config.poll_time(),
            retry: config.retry.to_core_retry(),
            unknown_kind: config.unknown_kind,
        }
    }
}
