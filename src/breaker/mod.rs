//! Failover decision subsystem.
//!
//! # Data Flow
//! ```text
//! ResourceIdentity (from the alert)
//!     → task.rs (detached tokio task, cycle id span)
//!     → engine.rs (deadline, in-flight registration)
//!         → ControlPlane::get_profile
//!         → policy.rs (eligibility gate + scan)
//!             → ranker.rs (stable ascending priority)
//!         → ControlPlane::disable_endpoint, one at a time
//!     → outcome logged and counted; never reported to the caller
//! ```
//!
//! # Design Decisions
//! - Each cycle is stateless; nothing is persisted between alerts
//! - First failed disable ends the cycle, earlier disables stay in place
//! - No per-profile locking; overlapping cycles are only logged

pub mod engine;
pub mod inflight;
pub mod policy;
pub mod ranker;
pub mod task;

use async_trait::async_trait;

use crate::alert::ResourceIdentity;

pub use engine::{BreakerError, CycleOutcome, DecisionEngine};
pub use inflight::InFlightCycles;
pub use policy::{plan, SkipReason, TripPlan};
pub use ranker::rank;
pub use task::spawn_cycle;

/// Something that can run one decision cycle for a profile.
///
/// The request handler only holds this capability, so tests can swap the
/// engine for a double.
#[async_trait]
pub trait Breaker: Send + Sync {
    async fn run_cycle(&self, target: ResourceIdentity) -> Result<CycleOutcome, BreakerError>;
}
