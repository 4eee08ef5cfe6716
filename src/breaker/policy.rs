//! Trip policy.
//!
//! # Rules
//! ```text
//! routing method != Priority  → skip
//! endpoints < 2               → skip (nothing to fail over to)
//! no endpoint Online          → skip (disabling would black-hole traffic)
//! otherwise, in ranked order:
//!     Online              → new primary, stop
//!     not Online, Enabled → disable, continue
//!     not Online, Disabled→ leave, continue
//! ```
//!
//! # Design Decisions
//! - Pure function of the fetched topology; the engine executes the plan
//! - Never re-enables anything

use std::fmt;

use crate::breaker::ranker::rank;
use crate::control_plane::{Endpoint, RoutingMethod, RoutingProfile};

/// A profile needs at least this many endpoints to fail over.
pub const MIN_ENDPOINTS: usize = 2;

/// Why a cycle ended without touching the profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotPriorityRouting(RoutingMethod),
    TooFewEndpoints(usize),
    NoOnlineEndpoint,
}

impl SkipReason {
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::NotPriorityRouting(_) => "not_priority_routing",
            SkipReason::TooFewEndpoints(_) => "too_few_endpoints",
            SkipReason::NoOnlineEndpoint => "no_online_endpoint",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotPriorityRouting(method) => {
                write!(f, "the routing method is not 'Priority': {:?}", method)
            }
            SkipReason::TooFewEndpoints(count) => {
                write!(f, "low total endpoint count: {}", count)
            }
            SkipReason::NoOnlineEndpoint => write!(f, "no online endpoint"),
        }
    }
}

/// Endpoints to disable, in the order the commands must be issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripPlan {
    pub to_disable: Vec<Endpoint>,
    /// First Online endpoint in ranked order.
    pub primary: Option<Endpoint>,
}

impl TripPlan {
    pub fn is_noop(&self) -> bool {
        self.to_disable.is_empty()
    }
}

/// Decide which endpoints to disable for the given topology.
pub fn plan(profile: &RoutingProfile) -> Result<TripPlan, SkipReason> {
    if profile.routing_method != RoutingMethod::Priority {
        return Err(SkipReason::NotPriorityRouting(profile.routing_method));
    }
    if profile.endpoints.len() < MIN_ENDPOINTS {
        return Err(SkipReason::TooFewEndpoints(profile.endpoints.len()));
    }
    if profile.online_count() == 0 {
        return Err(SkipReason::NoOnlineEndpoint);
    }

    let mut to_disable = Vec::new();
    for endpoint in rank(profile.endpoints.clone()) {
        if endpoint.is_online() {
            return Ok(TripPlan {
                to_disable,
                primary: Some(endpoint),
            });
        }
        if !endpoint.is_disabled() {
            to_disable.push(endpoint);
        }
    }

    Ok(TripPlan {
        to_disable,
        primary: None,
    })
}
