//! Endpoint ranking by priority.

use crate::control_plane::Endpoint;

/// Order endpoints by ascending priority value (most preferred first).
///
/// The sort is stable: endpoints sharing a priority keep the order in which
/// the control plane listed them.
pub fn rank(mut endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
    endpoints.sort_by_key(|ep| ep.priority);
    endpoints
}
