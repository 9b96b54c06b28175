//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener
//! - Translate `GET /getUser/{id}` into one upstream lookup
//! - Observability (metrics, correlation IDs)

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Request},
    response::Response,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ErrorMapping, GatewayConfig};
use crate::http::request::{request_deadline, request_id, UuidRequestId, X_REQUEST_ID};
use crate::http::response::{error_response, status_for, user_response, HealthStatus};
use crate::observability::metrics;
use crate::upstream::{ClientSetupError, HttpUserSource, LookupContext, UserSource};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserSource>,
    pub request_timeout: Duration,
    pub error_mapping: ErrorMapping,
}

impl AppState {
    pub fn new(config: &GatewayConfig, users: Arc<dyn UserSource>) -> Self {
        Self {
            users,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
            error_mapping: config.errors.mapping,
        }
    }
}

/// HTTP server for the user gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server that looks users up over HTTP per `config.upstream`.
    pub fn new(config: GatewayConfig) -> Result<Self, ClientSetupError> {
        let users = Arc::new(HttpUserSource::new(&config.upstream)?);
        Ok(Self::with_source(config, users))
    }

    /// Create a server backed by an arbitrary user source.
    pub fn with_source(config: GatewayConfig, users: Arc<dyn UserSource>) -> Self {
        let state = AppState::new(&config, users);
        let router = build_router(&config, state);
        Self { router, config }
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &GatewayConfig, state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        }))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

    Router::new()
        .route("/getUser/{id}", get(get_user_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(middleware)
}

/// Looks the user up upstream and re-serves it as JSON.
async fn get_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers);

    let mut ctx = LookupContext::new(request_deadline(&headers, state.request_timeout));
    if let Some(request_id) = &request_id {
        ctx = ctx.with_request_id(request_id.clone());
    }

    let response = match state.users.fetch_user(&id, &ctx).await {
        Ok(user) => {
            tracing::debug!(user_id = %id, "User lookup succeeded");
            user_response(user)
        }
        Err(err) => {
            let status = status_for(&err, state.error_mapping);
            tracing::warn!(
                request_id = request_id.as_deref().unwrap_or("unknown"),
                user_id = %id,
                kind = err.kind(),
                status = status.as_u16(),
                error = %err,
                "Upstream lookup failed"
            );
            metrics::record_upstream_error(err.kind());
            error_response(status, &err)
        }
    };

    metrics::record_request(response.status().as_u16(), start_time);
    response
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus::ok())
}
