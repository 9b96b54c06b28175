//! HTTP client for the upstream user API.
//!
//! # Responsibilities
//! - Build `<base_url>/users/{id}` for an opaque identifier
//! - Issue exactly one GET per lookup, bounded by the caller's deadline
//! - Read the full body and decode it into a `UserRecord`
//! - Classify failures as unreachable / read / decode

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;
use crate::http::X_REQUEST_ID;
use crate::upstream::source::{LookupContext, UserSource};
use crate::upstream::types::{decode_user, UpstreamError, UserRecord};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Errors raised while constructing the client.
#[derive(Debug, Error)]
pub enum ClientSetupError {
    #[error("invalid upstream base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// `UserSource` backed by a real HTTP API.
#[derive(Clone)]
pub struct HttpUserSource {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpUserSource {
    /// Create a client from the upstream configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ClientSetupError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ClientSetupError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientSetupError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(timeout)
            .user_agent(USER_AGENT);
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        tracing::debug!(
            base_url = %base_url,
            timeout_secs = config.timeout_secs,
            connect_timeout_secs = config.connect_timeout_secs,
            "Upstream client initialized"
        );

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// URL for looking up `id`. The identifier becomes a single, percent-encoded path segment.
    pub fn user_url(&self, id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("users").push(id);
        }
        url
    }
}

#[async_trait]
impl UserSource for HttpUserSource {
    async fn fetch_user(&self, id: &str, ctx: &LookupContext) -> Result<UserRecord, UpstreamError> {
        let url = self.user_url(id);

        let timeout = ctx.deadline.cap(self.timeout);
        if timeout.is_zero() {
            return Err(UpstreamError::Unreachable {
                url: url.to_string(),
                reason: "deadline expired before the request was sent".to_string(),
                timed_out: true,
            });
        }

        let mut request = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .timeout(timeout);
        if let Some(request_id) = &ctx.request_id {
            request = request.header(X_REQUEST_ID, request_id.as_str());
        }

        tracing::debug!(url = %url, timeout_ms = timeout.as_millis() as u64, "Fetching user");

        let response = request.send().await.map_err(|e| UpstreamError::Unreachable {
            url: url.to_string(),
            reason: describe(&e),
            timed_out: e.is_timeout(),
        })?;

        let status = response.status();
        if !status.is_success() {
            // The body is still decoded; an empty 404 fails below, `{}` yields defaults.
            tracing::debug!(url = %url, status = %status, "Upstream returned non-success status");
        }

        let body = response.bytes().await.map_err(|e| UpstreamError::ReadFailed {
            reason: describe(&e),
            timed_out: e.is_timeout(),
        })?;

        decode_user(&body)
    }
}

/// Flatten an error and its sources into one line.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
