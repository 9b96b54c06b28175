//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): lookups by response status
//! - `gateway_request_duration_seconds` (histogram): lookup latency
//! - `upstream_errors_total` (counter): upstream failures by kind
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a finished lookup.
pub fn record_request(status: u16, start: Instant) {
    counter!("gateway_requests_total", "status" => status.to_string()).increment(1);
    histogram!("gateway_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record an upstream failure.
pub fn record_upstream_error(kind: &'static str) {
    counter!("upstream_errors_total", "kind" => kind).increment(1);
}
