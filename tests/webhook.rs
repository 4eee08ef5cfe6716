//! Webhook contract tests: status codes and cycle dispatch.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tokio::sync::mpsc::UnboundedReceiver;
use tower::ServiceExt;

use failover_breaker::alert::ResourceIdentity;
use failover_breaker::alert::model::{AlertPayload, CONDITION_FIRED, CONDITION_RESOLVED};
use failover_breaker::config::BreakerConfig;
use failover_breaker::http::server::{build_router, AppState};
use failover_breaker::http::{ALERT_PATH, HEALTH_PATH};

mod common;

fn router(config: &BreakerConfig) -> (axum::Router, UnboundedReceiver<ResourceIdentity>) {
    let (breaker, rx) = common::RecordingBreaker::new();
    (build_router(config, AppState { breaker }), rx)
}

fn post(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(ALERT_PATH)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn alert_body(condition: &str, target_id: &str) -> Vec<u8> {
    serde_json::to_vec(&AlertPayload::new(condition, target_id)).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_fired_alert_is_accepted_and_dispatched() {
    let (app, mut rx) = router(&BreakerConfig::default());
    let payload = alert_body(CONDITION_FIRED, common::PROFILE_ID);

    let response = app.oneshot(post(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_text(response).await, "Accepted");

    let target = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("cycle was not started")
        .unwrap();
    assert_eq!(target.subscription_id, "sub-1");
    assert_eq!(target.resource_group, "rg-web");
    assert_eq!(target.profile_name, "tmprof-web");
}

#[tokio::test]
async fn test_resolved_alert_is_ignored() {
    let (app, mut rx) = router(&BreakerConfig::default());
    let payload = alert_body(CONDITION_RESOLVED, common::PROFILE_ID);

    let response = app.oneshot(post(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_empty_object_is_ignored() {
    let (app, mut rx) = router(&BreakerConfig::default());

    let response = app.oneshot(post("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let (app, mut rx) = router(&BreakerConfig::default());

    let response = app.oneshot(post("{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_non_profile_target_is_rejected() {
    let (app, mut rx) = router(&BreakerConfig::default());
    let vm = "/subscriptions/sub-1/resourceGroups/rg-web/providers/Microsoft.Compute/virtualMachines/vm-1";
    let payload = alert_body(CONDITION_FIRED, vm);

    let response = app.oneshot(post(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let text = body_text(response).await;
    assert!(text.contains("ID format is not for a Traffic Manager profile"), "{}", text);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_mixed_case_type_marker_is_rejected() {
    let (app, mut rx) = router(&BreakerConfig::default());
    let id = common::PROFILE_ID.replace("trafficmanagerprofiles", "trafficManagerProfiles");
    let payload = alert_body(CONDITION_FIRED, &id);

    let response = app.oneshot(post(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut config = BreakerConfig::default();
    config.security.max_body_size = 16;
    let (app, _rx) = router(&config);
    let payload = alert_body(CONDITION_FIRED, common::PROFILE_ID);

    let request = Request::builder()
        .method("POST")
        .uri(ALERT_PATH)
        .header("content-type", "application/json")
        .header("content-length", payload.len())
        .body(Body::from(payload))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _rx) = router(&BreakerConfig::default());

    let response = app
        .oneshot(Request::builder().uri(HEALTH_PATH).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_on_alert_path_is_not_allowed() {
    let (app, _rx) = router(&BreakerConfig::default());

    let response = app
        .oneshot(Request::builder().uri(ALERT_PATH).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
