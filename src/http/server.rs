//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the webhook and health routes
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Bind server to listener and drain once shutdown is triggered

use axum::{
    http::HeaderName,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::breaker::Breaker;
use crate::config::BreakerConfig;
use crate::http::handler::alert_handler;
use crate::lifecycle::Shutdown;

/// Route the alerting system posts to.
pub const ALERT_PATH: &str = "/api/breaker";

/// Liveness probe.
pub const HEALTH_PATH: &str = "/healthz";

const X_REQUEST_ID: &str = "x-request-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub breaker: Arc<dyn Breaker>,
}

/// HTTP server for the webhook.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &BreakerConfig, breaker: Arc<dyn Breaker>) -> Self {
        let router = build_router(config, AppState { breaker });
        Self { router }
    }

    /// Run the server until `shutdown` is triggered, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, path = ALERT_PATH, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let reason = shutdown.wait().await;
                tracing::info!(reason = %reason, "HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &BreakerConfig, state: AppState) -> Router {
    let request_id = HeaderName::from_static(X_REQUEST_ID);

    Router::new()
        .route(ALERT_PATH, post(alert_handler))
        .route(HEALTH_PATH, get(health_handler))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

async fn health_handler() -> &'static str {
    "ok"
}
