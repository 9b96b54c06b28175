//! User gateway (v1)
//!
//! A small HTTP service built with Tokio and Axum that answers
//! `GET /getUser/{id}` by fetching `/users/{id}` from an upstream API.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │                 USER GATEWAY                   │
//!   Client Request   │  ┌─────────┐    ┌──────────┐    ┌──────────┐  │
//!   ─────────────────┼─▶│  http   │───▶│ handler  │───▶│ upstream │──┼──▶ Upstream API
//!                    │  │ server  │    │ deadline │    │  client  │  │    /users/{id}
//!   Client Response  │  └─────────┘    └──────────┘    └──────────┘  │
//!   ◀────────────────┼── JSON record  /  plain-text error           │
//!                    │                                               │
//!                    │  config · observability · lifecycle           │
//!                    └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use user_gateway::config::{load_config, validate_config, ConfigError, GatewayConfig};
use user_gateway::lifecycle::{wait_for_signal, Shutdown};
use user_gateway::observability::{logging, metrics};
use user_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "user-gateway")]
#[command(about = "Re-serves user records from an upstream HTTP API", long_about = None)]
struct Cli {
    /// TOML configuration file; every setting has a default.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the upstream base URL.
    #[arg(short, long)]
    upstream: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<GatewayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => GatewayConfig::default(),
        };
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(upstream) = self.upstream {
            config.upstream.base_url = upstream;
        }
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("user-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        upstream_timeout_secs = config.upstream.timeout_secs,
        request_timeout_secs = config.timeouts.request_secs,
        error_mapping = ?config.errors.mapping,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config)?;

    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
