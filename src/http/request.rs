//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) when the caller sent none
//! - Read the request ID back for logging and upstream propagation
//! - Derive the request's deadline from the server timeout and the caller's hint
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A caller can only shorten the deadline, never extend it

use std::time::Duration;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::resilience::Deadline;

/// Correlation header, set on inbound requests, responses and upstream calls.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Optional caller-supplied time budget in milliseconds.
pub const X_REQUEST_TIMEOUT_MS: HeaderName = HeaderName::from_static("x-request-timeout-ms");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// The request ID carried in `headers`, if any.
pub fn request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Time budget requested by the caller. Missing, malformed or zero values yield `None`.
pub fn requested_timeout(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(X_REQUEST_TIMEOUT_MS)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

/// Deadline for a request arriving now.
pub fn request_deadline(headers: &HeaderMap, request_timeout: Duration) -> Deadline {
    let deadline = Deadline::after(request_timeout);
    match requested_timeout(headers) {
        Some(budget) => deadline.min(Deadline::after(budget)),
        None => deadline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(name: HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_generated_ids_are_uuids() {
        let request = Request::builder().body(()).unwrap();
        let mut maker = UuidRequestId;

        let first = maker.make_request_id(&request).unwrap();
        let second = maker.make_request_id(&request).unwrap();

        let first = first.header_value().to_str().unwrap().to_string();
        assert!(Uuid::parse_str(&first).is_ok());
        assert_ne!(first, second.header_value().to_str().unwrap());
    }

    #[test]
    fn test_request_id_lookup() {
        assert_eq!(request_id(&HeaderMap::new()), None);
        assert_eq!(
            request_id(&headers_with(X_REQUEST_ID, "abc-123")),
            Some("abc-123".to_string())
        );
    }

    #[test]
    fn test_requested_timeout_parsing() {
        assert_eq!(
            requested_timeout(&headers_with(X_REQUEST_TIMEOUT_MS, "250")),
            Some(Duration::from_millis(250))
        );
        assert_eq!(
            requested_timeout(&headers_with(X_REQUEST_TIMEOUT_MS, " 40 ")),
            Some(Duration::from_millis(40))
        );
        assert_eq!(requested_timeout(&headers_with(X_REQUEST_TIMEOUT_MS, "0")), None);
        assert_eq!(requested_timeout(&headers_with(X_REQUEST_TIMEOUT_MS, "-5")), None);
        assert_eq!(requested_timeout(&headers_with(X_REQUEST_TIMEOUT_MS, "soon")), None);
        assert_eq!(requested_timeout(&HeaderMap::new()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_caller_can_only_shorten_deadline() {
        let server_timeout = Duration::from_secs(10);

        let deadline = request_deadline(&HeaderMap::new(), server_timeout);
        assert_eq!(deadline.remaining(), server_timeout);

        let deadline = request_deadline(&headers_with(X_REQUEST_TIMEOUT_MS, "1500"), server_timeout);
        assert_eq!(deadline.remaining(), Duration::from_millis(1500));

        let deadline = request_deadline(&headers_with(X_REQUEST_TIMEOUT_MS, "60000"), server_timeout);
        assert_eq!(deadline.remaining(), server_timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_budget_keeps_server_deadline() {
        let server_timeout = Duration::from_secs(10);
        let deadline = request_deadline(
            &headers_with(X_REQUEST_TIMEOUT_MS, "18446744073709551615"),
            server_timeout,
        );
        assert_eq!(deadline.remaining(), server_timeout);
    }
}
