//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request path produces:
//!     → logging.rs (structured log events, request spans)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log event of a lookup
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
