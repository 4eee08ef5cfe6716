//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handler, engine and control plane produce:
//!     → logging.rs (structured tracing events, cycle id spans)
//!     → metrics.rs (alert, cycle and disable counters)
//!
//! Consumers:
//!     → stdout / stderr (ERROR events go to stderr)
//!     → Prometheus scrape (optional)
//! ```
//!
//! # Design Decisions
//! - Policy no-ops and cycle failures are only visible here; the webhook
//!   response has already been sent
//! - Metrics calls are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
