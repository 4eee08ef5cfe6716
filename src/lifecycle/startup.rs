//! Startup orchestration.
//!
//! # Responsibilities
//! - Install the metrics exporter when enabled
//! - Build the credential and prove it can mint a token
//! - Build the control plane client and decision engine
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::breaker::DecisionEngine;
use crate::config::BreakerConfig;
use crate::control_plane::{credential, ArmControlPlane, ControlPlaneError, CredentialError};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("credential unavailable: {0}")]
    Credential(#[from] CredentialError),

    #[error("control plane client: {0}")]
    ControlPlane(#[from] ControlPlaneError),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Start every subsystem and serve until a termination signal.
pub async fn run(config: BreakerConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let resource = config.control_plane.token_resource();
    let credential = credential::from_config(
        &config.control_plane.credential,
        &resource,
        Duration::from_secs(config.control_plane.request_timeout_secs),
    )?;
    let token = credential.token().await?;
    tracing::info!(resource = %resource, token = ?token, "Acquired management API credential");

    let control_plane = ArmControlPlane::new(&config.control_plane, credential)?;
    tracing::info!(
        base_url = %config.control_plane.base_url,
        api_version = %config.control_plane.api_version,
        "Control plane client ready"
    );

    let engine = DecisionEngine::new(
        Arc::new(control_plane),
        Duration::from_secs(config.timeouts.cycle_secs),
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for alerts");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(&config, Arc::new(engine));
    server.run(listener, shutdown).await?;
    Ok(())
}
