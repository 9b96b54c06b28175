//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, route table)
//!     → request.rs (request ID, deadline)
//!     → upstream lookup
//!     → response.rs (JSON or plain-text error, status mapping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID, X_REQUEST_TIMEOUT_MS};
pub use server::{AppState, HttpServer};
