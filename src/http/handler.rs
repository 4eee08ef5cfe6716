//! Alert webhook handler.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::alert::parse_alert;
use crate::breaker::spawn_cycle;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Accept an alert and start a decision cycle for its profile.
///
/// `202 Accepted` only means a cycle was started. Rejections answer `400`
/// for malformed input and `204` for alerts that are not firing.
pub async fn alert_handler(State(state): State<AppState>, body: Bytes) -> Response {
    match parse_alert(&body) {
        Ok(target) => {
            let cycle_id = Uuid::new_v4();
            tracing::info!(
                cycle_id = %cycle_id,
                subscription_id = %target.subscription_id,
                resource_group = %target.resource_group,
                profile = %target.profile_name,
                "Alert accepted, starting decision cycle"
            );
            metrics::record_alert("accepted");
            spawn_cycle(state.breaker.clone(), target, cycle_id);
            (StatusCode::ACCEPTED, "Accepted").into_response()
        }
        Err(rejection) => {
            let status = rejection.status();
            if status == StatusCode::NO_CONTENT {
                tracing::info!(reason = %rejection, "Alert ignored");
            } else {
                tracing::error!(error = %rejection, "Alert rejected");
            }
            metrics::record_alert(rejection.kind());
            (status, rejection.to_string()).into_response()
        }
    }
}
