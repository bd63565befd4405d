//! Configuration module for the icqbot runtime.
//!
//! This module provides figment-based configuration loading and validation
//! for the API endpoint, polling behaviour and logging.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    ApiConfig, ApiFlavor, IcqBotConfig, LogFormat, LogLevel, LogOutput, LogRotation,
    LoggingConfig, PollingConfig, RetryConfig, SpanEventConfig,
};
pub use validation::validate_config;
