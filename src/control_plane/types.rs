//! Routing profile topology as seen by the breaker.

use serde::{Deserialize, Serialize};

/// How the profile distributes traffic. Only `Priority` is eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum RoutingMethod {
    Performance,
    Priority,
    Weighted,
    Geographic,
    MultiValue,
    Subnet,
    #[serde(other)]
    Unknown,
}

/// Operator intent for an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum EndpointStatus {
    Enabled,
    Disabled,
}

/// Health observed by the profile's probes. Read-only for the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum MonitorStatus {
    CheckingEndpoint,
    Online,
    Degraded,
    Disabled,
    Inactive,
    Stopped,
    Unmonitored,
    #[serde(other)]
    Unknown,
}

/// One routable target within a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    /// Fully qualified type, e.g. `Microsoft.Network/trafficManagerProfiles/externalEndpoints`.
    pub endpoint_type: String,
    pub id: String,
    /// Lower value = preferred.
    pub priority: i64,
    pub status: EndpointStatus,
    pub monitor_status: MonitorStatus,
}

impl Endpoint {
    pub fn is_online(&self) -> bool {
        self.monitor_status == MonitorStatus::Online
    }

    pub fn is_disabled(&self) -> bool {
        self.status == EndpointStatus::Disabled
    }
}

/// A profile's current state, fetched fresh for every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingProfile {
    pub name: String,
    pub routing_method: RoutingMethod,
    pub endpoints: Vec<Endpoint>,
}

impl RoutingProfile {
    pub fn online_count(&self) -> usize {
        self.endpoints.iter().filter(|ep| ep.is_online()).count()
    }
}
