//! Decision engine: fetch, plan, disable.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

use crate::alert::ResourceIdentity;
use crate::breaker::inflight::InFlightCycles;
use crate::breaker::policy::{plan, SkipReason};
use crate::breaker::Breaker;
use crate::control_plane::{ControlPlane, ControlPlaneError};
use crate::observability::metrics;

/// Successful end of a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The profile was not eligible; nothing was touched.
    Skipped(SkipReason),
    /// The scan ran to completion.
    Completed {
        /// Endpoints disabled by this cycle, in command order.
        disabled: Vec<String>,
        /// The Online endpoint the scan stopped at.
        primary: Option<String>,
    },
}

/// Terminal failure of a cycle.
#[derive(Debug, Error)]
pub enum BreakerError {
    #[error("failed to get Traffic Manager profile: {0}")]
    Fetch(#[source] ControlPlaneError),

    /// Endpoints in `disabled` were disabled earlier in the cycle and stay so.
    #[error("failed to disable endpoint {endpoint}: {source}")]
    Disable {
        endpoint: String,
        disabled: Vec<String>,
        #[source]
        source: ControlPlaneError,
    },

    #[error("decision cycle exceeded its deadline of {0:?}")]
    Timeout(Duration),
}

impl BreakerError {
    /// Control plane error code behind the failure, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            BreakerError::Fetch(source) | BreakerError::Disable { source, .. } => source.code(),
            BreakerError::Timeout(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BreakerError::Fetch(_) => "fetch_failed",
            BreakerError::Disable { .. } => "disable_failed",
            BreakerError::Timeout(_) => "timeout",
        }
    }
}

/// Production [`Breaker`]: reads the profile and disables endpoints through
/// the control plane.
pub struct DecisionEngine {
    control_plane: Arc<dyn ControlPlane>,
    deadline: Duration,
    in_flight: InFlightCycles,
}

impl DecisionEngine {
    pub fn new(control_plane: Arc<dyn ControlPlane>, deadline: Duration) -> Self {
        Self {
            control_plane,
            deadline,
            in_flight: InFlightCycles::new(),
        }
    }

    async fn evaluate(&self, target: &ResourceIdentity) -> Result<CycleOutcome, BreakerError> {
        let profile = self
            .control_plane
            .get_profile(target)
            .await
            .map_err(BreakerError::Fetch)?;

        for endpoint in &profile.endpoints {
            tracing::info!(
                name = %endpoint.name,
                priority = endpoint.priority,
                status = ?endpoint.status,
                monitor_status = ?endpoint.monitor_status,
                "Found endpoint"
            );
        }

        let trip = match plan(&profile) {
            Ok(trip) => trip,
            Err(reason) => return Ok(CycleOutcome::Skipped(reason)),
        };

        if trip.is_noop() {
            tracing::info!(
                "Highest priority online endpoint is already serving; nothing to disable"
            );
        }

        let mut disabled = Vec::with_capacity(trip.to_disable.len());
        for endpoint in &trip.to_disable {
            tracing::info!(
                endpoint = %endpoint.name,
                priority = endpoint.priority,
                "Found an endpoint to disable"
            );

            if let Err(source) = self.control_plane.disable_endpoint(target, endpoint).await {
                return Err(BreakerError::Disable {
                    endpoint: endpoint.name.clone(),
                    disabled,
                    source,
                });
            }

            tracing::info!(endpoint = %endpoint.name, "Disabled endpoint successfully");
            metrics::record_endpoint_disabled();
            disabled.push(endpoint.name.clone());
        }

        Ok(CycleOutcome::Completed {
            disabled,
            primary: trip.primary.map(|ep| ep.name),
        })
    }
}

#[async_trait]
impl Breaker for DecisionEngine {
    async fn run_cycle(&self, target: ResourceIdentity) -> Result<CycleOutcome, BreakerError> {
        let guard = self.in_flight.enter(target.profile_key());
        if guard.overlapping() > 0 {
            tracing::warn!(
                profile = %target.profile_name,
                overlapping = guard.overlapping(),
                "Another decision cycle is already running for this profile"
            );
        }

        match timeout(self.deadline, self.evaluate(&target)).await {
            Ok(result) => result,
            Err(_) => Err(BreakerError::Timeout(self.deadline)),
        }
    }
}
