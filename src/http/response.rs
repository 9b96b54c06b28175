//! Response construction.
//!
//! # Responsibilities
//! - Serialize a user record as `application/json`
//! - Map upstream errors to HTTP status codes per the configured policy
//! - Render errors as plain text
//!
//! # Design Decisions
//! - `flat` keeps every upstream failure at 500
//! - `gateway` reports upstream timeouts as 504 and other upstream faults as 502

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::ErrorMapping;
use crate::upstream::{UpstreamError, UserRecord};

/// Status to report for an upstream failure.
pub fn status_for(err: &UpstreamError, mapping: ErrorMapping) -> StatusCode {
    match mapping {
        ErrorMapping::Flat => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorMapping::Gateway if err.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
        ErrorMapping::Gateway => StatusCode::BAD_GATEWAY,
    }
}

/// 200 with the record as JSON.
pub fn user_response(user: UserRecord) -> Response {
    Json(user).into_response()
}

/// Plain-text error body carrying the error's message.
pub fn error_response(status: StatusCode, err: &UpstreamError) -> Response {
    (status, err.to_string()).into_response()
}

/// Liveness payload served on `/health`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
