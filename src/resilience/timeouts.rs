//! Timeout enforcement.
//!
//! # Responsibilities
//! - Represent the inbound request's deadline as an absolute instant
//! - Turn that deadline into a bound for each outbound call
//!
//! # Design Decisions
//! - Uses Tokio's clock so paused-time tests control it
//! - A deadline only ever narrows; combining two keeps the earlier

use std::time::Duration;
use tokio::time::Instant;

/// Stand-in for "never" when a timeout does not fit the clock (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Absolute point in time by which an operation must finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Instant);

impl Deadline {
    /// Deadline `timeout` from now, saturating far in the future for huge values.
    pub fn after(timeout: Duration) -> Self {
        let now = Instant::now();
        Self(now.checked_add(timeout).unwrap_or_else(|| now + FAR_FUTURE))
    }

    pub fn at(instant: Instant) -> Self {
        Self(instant)
    }

    pub fn instant(&self) -> Instant {
        self.0
    }

    /// Time left, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// The earlier of two deadlines.
    pub fn min(self, other: Deadline) -> Deadline {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }

    /// Timeout to apply to an operation bounded by both `limit` and this deadline.
    pub fn cap(&self, limit: Duration) -> Duration {
        self.remaining().min(limit)
    }
}
