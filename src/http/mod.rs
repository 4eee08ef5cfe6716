//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, trace, timeout, body limit)
//!     → handler.rs (alert parse, status mapping)
//!         → breaker::spawn_cycle (detached)
//!     → 202 / 204 / 400 sent to the alerting system
//! ```
//!
//! # Design Decisions
//! - The response never waits on the control plane
//! - The response never reports the cycle's outcome

pub mod handler;
pub mod server;

pub use server::{AppState, HttpServer, ALERT_PATH, HEALTH_PATH};
