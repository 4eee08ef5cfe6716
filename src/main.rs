//! Failover breaker service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Alert webhook              ┌──────────────────────────────────────────────┐
//!     ───────────────────────────┼─▶ http ──▶ alert ──▶ 202 / 204 / 400        │
//!                                │              │                               │
//!                                │              ▼ (detached task)               │
//!                                │           breaker ──▶ control_plane ─────────┼──▶ Management API
//!                                │      rank, plan, disable     GET / PATCH     │
//!                                │                                              │
//!                                │  config · observability · lifecycle          │
//!                                └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use failover_breaker::config::{self, loader, BreakerConfig};
use failover_breaker::lifecycle;
use failover_breaker::observability::logging;

#[derive(Parser)]
#[command(name = "failover-breaker")]
#[command(about = "Disables unhealthy Traffic Manager endpoints when an alert fires", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "BREAKER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => BreakerConfig::default(),
    };
    let config = loader::finalize(config)?;

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        cycle_secs = config.timeouts.cycle_secs,
        "failover-breaker starting"
    );

    if let Err(e) = lifecycle::run(config).await {
        tracing::error!(error = %e, "Fatal error");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
