//! Common alert schema payload.
//!
//! Every field is optional on the wire; absent fields decode to empty
//! defaults so that only malformed JSON is a decode error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Condition value announcing a newly fired alert.
pub const CONDITION_FIRED: &str = "Fired";

/// Condition value announcing a resolved alert.
pub const CONDITION_RESOLVED: &str = "Resolved";

/// Root of the webhook body.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlertPayload {
    pub schema_id: String,
    pub data: AlertData,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlertData {
    pub essentials: Essentials,
    pub alert_context: AlertContext,
}

/// The `essentials` block. Only `monitor_condition` and `alert_target_ids`
/// drive the breaker; the rest is carried for logging.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Essentials {
    pub alert_id: String,
    pub alert_rule: String,
    pub severity: String,
    pub signal_type: String,
    pub monitor_condition: String,
    pub monitoring_service: String,
    #[serde(rename = "alertTargetIDs", alias = "alertTargetIds")]
    pub alert_target_ids: Vec<String>,
    pub configuration_items: Vec<String>,
    pub origin_alert_id: String,
    pub fired_date_time: Option<String>,
    pub resolved_date_time: Option<String>,
    pub description: String,
    pub essentials_version: String,
    pub alert_context_version: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlertContext {
    /// Passed through untouched.
    pub properties: Value,
    pub condition_type: String,
    pub condition: Condition,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Condition {
    pub window_size: String,
    pub all_of: Vec<MetricCriterion>,
}

/// One entry of `condition.allOf`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricCriterion {
    pub metric_name: String,
    pub metric_namespace: String,
    pub operator: String,
    pub threshold: String,
    pub time_aggregation: String,
    pub dimensions: Vec<Dimension>,
    pub metric_value: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl AlertPayload {
    /// Build a minimal payload, as the monitoring system would send it.
    pub fn new(monitor_condition: &str, target_id: &str) -> Self {
        let mut payload = Self {
            schema_id: "azureMonitorCommonAlertSchema".to_string(),
            ..Self::default()
        };
        payload.data.essentials.monitor_condition = monitor_condition.to_string();
        payload.data.essentials.alert_target_ids = vec![target_id.to_string()];
        payload
    }

    pub fn essentials(&self) -> &Essentials {
        &self.data.essentials
    }
}
