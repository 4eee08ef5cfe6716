//! Alert validation and target extraction.

use axum::http::StatusCode;
use thiserror::Error;

use crate::alert::identity::{IdentityFormatError, ResourceIdentity};
use crate::alert::model::{AlertPayload, CONDITION_FIRED};

/// Why an alert did not lead to a decision cycle.
#[derive(Debug, Error)]
pub enum AlertRejection {
    #[error("failed to decode request: {0}")]
    Decode(#[from] serde_json::Error),

    /// Not an error: resolved (or otherwise non-fired) alerts are ignored.
    #[error("breaker will not trip because the condition of the alert is not 'Fired': {0}")]
    ConditionMismatch(String),

    #[error("breaker will not trip because {0}")]
    IdentityFormat(#[from] IdentityFormatError),
}

impl AlertRejection {
    /// Status code reported to the alert sender.
    pub fn status(&self) -> StatusCode {
        match self {
            AlertRejection::ConditionMismatch(_) => StatusCode::NO_CONTENT,
            AlertRejection::Decode(_) | AlertRejection::IdentityFormat(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AlertRejection::Decode(_) => "decode_error",
            AlertRejection::ConditionMismatch(_) => "condition_mismatch",
            AlertRejection::IdentityFormat(_) => "identity_format_error",
        }
    }
}

/// Decode a raw webhook body and extract the profile it targets.
pub fn parse_alert(body: &[u8]) -> Result<ResourceIdentity, AlertRejection> {
    let payload: AlertPayload = serde_json::from_slice(body)?;
    let essentials = payload.essentials();

    tracing::debug!(
        alert_id = %essentials.alert_id,
        alert_rule = %essentials.alert_rule,
        severity = %essentials.severity,
        monitor_condition = %essentials.monitor_condition,
        "Alert decoded"
    );

    if essentials.monitor_condition != CONDITION_FIRED {
        return Err(AlertRejection::ConditionMismatch(
            essentials.monitor_condition.clone(),
        ));
    }

    let target = essentials
        .alert_target_ids
        .first()
        .ok_or(IdentityFormatError::MissingTarget)?;
    let identity: ResourceIdentity = target.parse()?;

    tracing::info!(
        subscription_id = %identity.subscription_id,
        resource_group = %identity.resource_group,
        profile = %identity.profile_name,
        "Alert targets Traffic Manager profile"
    );

    Ok(identity)
}
