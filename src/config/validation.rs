//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and the upstream URL
//! - Validate value ranges (0 < timeout <= one day, upstream bound within request bound)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// Upper bound for every configured timeout (one day).
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("upstream.base_url: {0}")]
    InvalidUpstreamUrl(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("{field} ({value}) exceeds the maximum of {max} seconds")]
    TimeoutTooLarge { field: &'static str, value: u64, max: u64 },

    #[error("upstream.timeout_secs ({upstream}) exceeds timeouts.request_secs ({request})")]
    UpstreamOutlivesRequest { upstream: u64, request: u64 },
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if let Err(reason) = check_upstream_url(&config.upstream.base_url) {
        errors.push(ValidationError::InvalidUpstreamUrl(reason));
    }

    let timeouts = [
        ("upstream.timeout_secs", config.upstream.timeout_secs),
        ("upstream.connect_timeout_secs", config.upstream.connect_timeout_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ];
    for (field, value) in timeouts {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(field));
        } else if value > MAX_TIMEOUT_SECS {
            errors.push(ValidationError::TimeoutTooLarge {
                field,
                value,
                max: MAX_TIMEOUT_SECS,
            });
        }
    }

    if config.upstream.timeout_secs > config.timeouts.request_secs {
        errors.push(ValidationError::UpstreamOutlivesRequest {
            upstream: config.upstream.timeout_secs,
            request: config.timeouts.request_secs,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_upstream_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("'{}' is not a valid URL: {}", raw, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() || url.cannot_be_a_base() {
        return Err(format!("'{}' has no host", raw));
    }
    Ok(())
}
