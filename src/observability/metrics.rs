//! Metrics collection and exposition.
//!
//! # Metrics
//! - `breaker_alerts_total` (counter): webhook deliveries by outcome
//! - `breaker_cycles_total` (counter): finished cycles by result
//! - `breaker_cycle_duration_seconds` (histogram): cycle wall time
//! - `breaker_endpoints_disabled_total` (counter): successful disable commands
//! - `breaker_cycle_panics_total` (counter): cycles that panicked

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

/// Count a webhook delivery (`accepted`, or a rejection kind).
pub fn record_alert(outcome: &'static str) {
    counter!("breaker_alerts_total", "outcome" => outcome).increment(1);
}

/// Count a finished cycle and record how long it took.
pub fn record_cycle(result: &'static str, started: Instant) {
    counter!("breaker_cycles_total", "result" => result).increment(1);
    histogram!("breaker_cycle_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_endpoint_disabled() {
    counter!("breaker_endpoints_disabled_total").increment(1);
}

pub fn record_cycle_panic() {
    counter!("breaker_cycle_panics_total").increment(1);
}
