//! Routing-profile resource identity.
//!
//! Expected shape (one optional leading slash):
//! ```text
//! /subscriptions/<sub>/resourcegroups/<rg>/providers/microsoft.network/trafficmanagerprofiles/<name>
//!  0             1     2              3    4         5                 6                      7
//! ```

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Resource-type segment that marks a routing profile.
pub const PROFILE_TYPE_SEGMENT: &str = "trafficmanagerprofiles";

const SEGMENT_COUNT: usize = 8;

/// The target ID does not name a routing profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityFormatError {
    #[error("alert carries no target IDs")]
    MissingTarget,

    #[error("ID format is not for a Traffic Manager profile: {0}")]
    NotAProfile(String),
}

/// A routing profile, located by subscription and resource group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentity {
    pub subscription_id: String,
    pub resource_group: String,
    pub resource_type: String,
    pub profile_name: String,
}

impl ResourceIdentity {
    /// Key used to correlate cycles that target the same profile.
    pub fn profile_key(&self) -> String {
        format!(
            "{}/{}/{}",
            self.subscription_id.to_ascii_lowercase(),
            self.resource_group.to_ascii_lowercase(),
            self.profile_name.to_ascii_lowercase()
        )
    }
}

impl FromStr for ResourceIdentity {
    type Err = IdentityFormatError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let trimmed = id.strip_prefix('/').unwrap_or(id);
        let segments: Vec<&str> = trimmed.split('/').collect();

        let well_formed = segments.len() == SEGMENT_COUNT
            && segments[6] == PROFILE_TYPE_SEGMENT
            && [1, 3, 7].iter().all(|&i| !segments[i].is_empty());
        if !well_formed {
            return Err(IdentityFormatError::NotAProfile(id.to_string()));
        }

        Ok(Self {
            subscription_id: segments[1].to_string(),
            resource_group: segments[3].to_string(),
            resource_type: segments[6].to_string(),
            profile_name: segments[7].to_string(),
        })
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourcegroups/{}/providers/microsoft.network/{}/{}",
            self.subscription_id, self.resource_group, self.resource_type, self.profile_name
        )
    }
}
