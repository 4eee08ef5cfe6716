//! Tracking of decision cycles currently running per profile.
//!
//! Concurrent cycles on one profile are allowed and race on the control
//! plane (last write wins). This registry only makes the overlap visible.

use dashmap::DashMap;
use std::sync::Arc;

/// Shared count of running cycles, keyed by profile.
#[derive(Debug, Clone, Default)]
pub struct InFlightCycles {
    inner: Arc<DashMap<String, usize>>,
}

impl InFlightCycles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cycle for `profile_key`. The returned guard unregisters it
    /// on drop. `overlapping` is the number of other cycles already running.
    pub fn enter(&self, profile_key: String) -> InFlightGuard {
        let overlapping = {
            let mut count = self.inner.entry(profile_key.clone()).or_insert(0);
            *count += 1;
            *count - 1
        };
        InFlightGuard {
            registry: self.inner.clone(),
            profile_key,
            overlapping,
        }
    }

    /// Number of cycles currently running for `profile_key`.
    pub fn running(&self, profile_key: &str) -> usize {
        self.inner.get(profile_key).map(|c| *c).unwrap_or(0)
    }
}

/// RAII registration of one running cycle.
#[derive(Debug)]
pub struct InFlightGuard {
    registry: Arc<DashMap<String, usize>>,
    profile_key: String,
    overlapping: usize,
}

impl InFlightGuard {
    pub fn overlapping(&self) -> usize {
        self.overlapping
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry
            .remove_if_mut(&self.profile_key, |_, count| {
                *count -= 1;
                *count == 0
            });
    }
}
