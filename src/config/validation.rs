//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (TTLs > 0, capacity > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }
    if config.resilience.base_delay_ms == 0 {
        errors.push(ValidationError::new("resilience.base_delay_ms", "must be > 0"));
    }
    if config.resilience.lockout_ms == 0 {
        errors.push(ValidationError::new("resilience.lockout_ms", "must be > 0"));
    }
    if config.resilience.default_max_retries > 10 || config.resilience.chat_max_retries > 10 {
        errors.push(ValidationError::new(
            "resilience",
            "retry budgets above 10 would back off for hours",
        ));
    }
    if config.cache.summary_ttl_ms == 0 {
        errors.push(ValidationError::new("cache.summary_ttl_ms", "must be > 0"));
    }
    if config.cache.echoes_ttl_ms == 0 {
        errors.push(ValidationError::new("cache.echoes_ttl_ms", "must be > 0"));
    }
    if config.stories.ttl_ms == 0 {
        errors.push(ValidationError::new("stories.ttl_ms", "must be > 0"));
    }
    if config.stories.max_total == 0 {
        errors.push(ValidationError::new("stories.max_total", "must be > 0"));
    }
    if config.stories.tick_ms == 0 || config.stories.tick_ms > config.stories.display_duration_ms {
        errors.push(ValidationError::new(
            "stories.tick_ms",
            "must be > 0 and no longer than display_duration_ms",
        ));
    }
    if config.provider.base_url.is_empty() {
        errors.push(ValidationError::new("provider.base_url", "must not be empty"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }
    if config.admin.enabled && config.admin.api_key.len() < 16 {
        errors.push(ValidationError::new(
            "admin.api_key",
            "must be at least 16 characters when admin is enabled",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
