//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{ApiConfig, IcqBotConfig, LogOutput, LoggingConfig, PollingConfig, RetryConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &IcqBotConfig) -> ConfigResult<()> {
    validate_api_config(&config.api)?;
    validate_polling_config(&config.polling)?;
    validate_timeouts(&config.api, &config.polling)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates endpoint and credentials.
fn validate_api_config(api: &ApiConfig) -> ConfigResult<()> {
    if api.token.is_empty() {
        return Err(ConfigError::missing_field("api.token"));
    }

    if api.token.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation("API token cannot contain whitespace"));
    }

    validate_url(api.base_url())?;

    if api.timeout_ms == 0 {
        return Err(ConfigError::validation("Timeout must be greater than 0"));
    }

    Ok(())
}

/// Validates polling settings.
fn validate_polling_config(polling: &PollingConfig) -> ConfigResult<()> {
    if polling.poll_time_secs == 0 {
        return Err(ConfigError::validation(
            "Poll time must be greater than 0",
        ));
    }

    validate_retry_config(&polling.retry)
}

/// A request must outlive the server's hold time or every idle poll times out.
fn validate_timeouts(api: &ApiConfig, polling: &PollingConfig) -> ConfigResult<()> {
    if api.timeout() <= polling.poll_time() {
        return Err(ConfigError::validation(format!(
            "Request timeout ({} ms) must be longer than the poll time ({} s)",
            api.timeout_ms, polling.poll_time_secs
        )));
    }
    Ok(())
}

/// Validates retry configuration.
fn validate_retry_config(retry: &RetryConfig) -> ConfigResult<()> {
    if retry.initial_delay_ms == 0 {
        return Err(ConfigError::validation(
            "Initial retry delay must be greater than 0",
        ));
    }

    if retry.max_delay_ms < retry.initial_delay_ms {
        return Err(ConfigError::validation(
            "Max retry delay must be greater than or equal to initial delay",
        ));
    }

    if !retry.backoff_multiplier.is_finite() || retry.backoff_multiplier < 1.0 {
        return Err(ConfigError::validation(
            "Backoff multiplier must be at least 1.0",
        ));
    }

    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }
    Ok(())
}

/// Validates a base URL.
fn validate_url(url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::missing_field("api.base_url"));
    }

    let valid_schemes = ["http://", "https://"];
    if !valid_schemes.iter().any(|s| url.starts_with(s)) {
        return Err(ConfigError::invalid_url(
            url,
            format!("URL must start with one of: {:?}", valid_schemes),
        ));
    }

    Ok(())
}
