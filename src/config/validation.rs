//! Configuration validation.
//!
//! # Responsibilities
//! - Substitute defaults for zero/empty values serde cannot catch
//! - Validate value ranges (refresh interval, timeouts)
//! - Validate the outbound proxy URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Runs before a config is compiled into a snapshot

use crate::config::schema::{ProxyConfig, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SIZE_LIMIT};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("refresh.interval_secs must be greater than zero")]
    ZeroRefreshInterval,

    #[error("upstream.connect_timeout_secs must be greater than zero")]
    ZeroConnectTimeout,

    #[error("upstream.proxy is not a valid URL: {0}")]
    InvalidUpstreamProxy(String),

    #[error("observability.metrics_address is not a socket address: {0}")]
    InvalidMetricsAddress(String),
}

/// Replace zero or empty fields with their defaults.
pub fn apply_defaults(config: &mut ProxyConfig) {
    if config.host.trim().is_empty() {
        config.host = DEFAULT_HOST.to_string();
    }
    if config.port == 0 {
        config.port = DEFAULT_PORT;
    }
    if config.size_limit <= 0 {
        config.size_limit = DEFAULT_SIZE_LIMIT;
    }
}

/// Semantic checks over an already-defaulted config.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.refresh.interval_secs == 0 {
        errors.push(ValidationError::ZeroRefreshInterval);
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }
    if let Some(proxy) = &config.upstream.proxy {
        if url::Url::parse(proxy).is_err() {
            errors.push(ValidationError::InvalidUpstreamProxy(proxy.clone()));
        }
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
