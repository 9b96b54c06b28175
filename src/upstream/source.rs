//! The lookup capability the HTTP layer depends on.

use async_trait::async_trait;

use crate::resilience::Deadline;
use crate::upstream::types::{UpstreamError, UserRecord};

/// Per-call information carried from the inbound request to the upstream call.
#[derive(Debug, Clone)]
pub struct LookupContext {
    /// The lookup must finish by this instant.
    pub deadline: Deadline,
    /// Correlation ID forwarded upstream as `x-request-id`.
    pub request_id: Option<String>,
}

impl LookupContext {
    pub fn new(deadline: Deadline) -> Self {
        Self {
            deadline,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Something that can resolve a user identifier to a record.
///
/// The identifier is opaque: implementations pass it through unvalidated.
#[async_trait]
pub trait UserSource: Send + Sync {
    async fn fetch_user(&self, id: &str, ctx: &LookupContext) -> Result<UserRecord, UpstreamError>;
}
