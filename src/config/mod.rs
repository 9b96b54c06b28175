//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → values copied into the server's app state
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults; the defaults reproduce the original service
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ErrorConfig, ErrorMapping, GatewayConfig, ListenerConfig, ObservabilityConfig, TimeoutConfig,
    UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
