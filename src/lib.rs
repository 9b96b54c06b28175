//! User gateway library: serves `GET /getUser/{id}` by looking the user up
//! in an upstream HTTP API and re-serving the record as JSON.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use upstream::{UserRecord, UserSource};
