//! Control plane access subsystem.
//!
//! # Data Flow
//! ```text
//! ResourceIdentity
//!     → credential.rs (bearer token, cached where the source allows)
//!     → arm.rs (GET profile / PATCH endpoint over HTTPS)
//!     → types.rs (RoutingProfile, Endpoint)
//!     → error.rs (normalised error codes)
//! ```
//!
//! # Design Decisions
//! - Profiles are never cached; every cycle reads fresh topology
//! - No retries at this layer; a failed call ends the cycle
//! - The client is shared by all concurrently running cycles

pub mod arm;
pub mod credential;
pub mod error;
pub mod types;

use async_trait::async_trait;

use crate::alert::ResourceIdentity;

pub use arm::ArmControlPlane;
pub use credential::{
    AccessToken, ManagedIdentityCredential, StaticTokenCredential, TokenCredential,
};
pub use error::{ControlPlaneError, ControlPlaneResult, CredentialError};
pub use types::{Endpoint, EndpointStatus, MonitorStatus, RoutingMethod, RoutingProfile};

/// Read and write operations the breaker needs from the control plane.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Fetch the profile's routing method and full endpoint set.
    async fn get_profile(&self, target: &ResourceIdentity) -> ControlPlaneResult<RoutingProfile>;

    /// Set one endpoint's status to Disabled, leaving its other fields alone.
    async fn disable_endpoint(
        &self,
        target: &ResourceIdentity,
        endpoint: &Endpoint,
    ) -> ControlPlaneResult<()>;
}
