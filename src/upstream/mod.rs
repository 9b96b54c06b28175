//! Upstream user API subsystem.
//!
//! # Data Flow
//! ```text
//! Handler (id, LookupContext)
//!     → source.rs (UserSource capability)
//!     → client.rs (GET <base_url>/users/{id}, deadline-bounded)
//!     → types.rs (decode into UserRecord, classify UpstreamError)
//! ```
//!
//! # Design Decisions
//! - The HTTP layer only sees the `UserSource` trait; tests swap in doubles
//! - One request per lookup: no cache, no retry
//! - The upstream status code is not interpreted, only the body

pub mod client;
pub mod source;
pub mod types;

pub use client::{ClientSetupError, HttpUserSource};
pub use source::{LookupContext, UserSource};
pub use types::{decode_user, UpstreamError, UserRecord};
