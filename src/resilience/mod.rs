//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request:
//!     → request deadline (server request timeout, narrowed by x-request-timeout-ms)
//!     → timeouts.rs (Deadline)
//!     → upstream client caps its own timeout by the time remaining
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries and no circuit breaking: a failed lookup fails the request

pub mod timeouts;

pub use timeouts::Deadline;
