//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use failover_breaker::alert::ResourceIdentity;
use failover_breaker::breaker::{Breaker, BreakerError, CycleOutcome, SkipReason};

pub const PROFILE_ID: &str =
    "/subscriptions/sub-1/resourceGroups/rg-web/providers/Microsoft.Network/trafficmanagerprofiles/tmprof-web";

const PROFILE_PATH: &str =
    "/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Network/trafficmanagerprofiles/{name}";

/// One PATCH received by the mock management API.
#[derive(Debug, Clone)]
pub struct PatchCall {
    pub endpoint_type: String,
    pub endpoint_name: String,
    pub body: Value,
    pub api_version: Option<String>,
}

/// In-memory stand-in for the management API.
#[derive(Default)]
pub struct MockArm {
    profile: Mutex<Value>,
    patches: Mutex<Vec<PatchCall>>,
    authorizations: Mutex<Vec<String>>,
    gets: Mutex<u32>,
    fail_patch_of: Mutex<Option<String>>,
    fail_get_with: Mutex<Option<(u16, Value)>>,
}

impl MockArm {
    pub fn patches(&self) -> Vec<PatchCall> {
        self.patches.lock().unwrap().clone()
    }

    pub fn patched_names(&self) -> Vec<String> {
        self.patches().into_iter().map(|p| p.endpoint_name).collect()
    }

    pub fn authorizations(&self) -> Vec<String> {
        self.authorizations.lock().unwrap().clone()
    }

    pub fn get_count(&self) -> u32 {
        *self.gets.lock().unwrap()
    }

    /// Reject PATCHes of `name` with a 409 Conflict.
    pub fn fail_patch_of(&self, name: &str) {
        *self.fail_patch_of.lock().unwrap() = Some(name.to_string());
    }

    /// Answer every GET with `status` and `body`.
    pub fn fail_get_with(&self, status: u16, body: Value) {
        *self.fail_get_with.lock().unwrap() = Some((status, body));
    }

    /// Current admin status of an endpoint in the stored profile.
    pub fn endpoint_status(&self, name: &str) -> Option<String> {
        let profile = self.profile.lock().unwrap();
        profile["properties"]["endpoints"]
            .as_array()?
            .iter()
            .find(|ep| ep["name"] == name)
            .and_then(|ep| ep["properties"]["endpointStatus"].as_str())
            .map(str::to_string)
    }

    fn record_auth(&self, headers: &HeaderMap) {
        if let Some(value) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
            self.authorizations.lock().unwrap().push(value.to_string());
        }
    }
}

/// Profile document in the management API's shape.
pub fn profile_json(routing_method: &str, endpoints: Vec<Value>) -> Value {
    json!({
        "id": PROFILE_ID,
        "name": "tmprof-web",
        "type": "Microsoft.Network/trafficManagerProfiles",
        "properties": {
            "profileStatus": "Enabled",
            "trafficRoutingMethod": routing_method,
            "endpoints": endpoints,
        }
    })
}

/// Endpoint document in the management API's shape.
pub fn endpoint_json(name: &str, priority: i64, status: &str, monitor: &str) -> Value {
    json!({
        "id": format!("{}/externalEndpoints/{}", PROFILE_ID, name),
        "name": name,
        "type": "Microsoft.Network/trafficManagerProfiles/externalEndpoints",
        "properties": {
            "target": format!("{}.example.com", name.to_lowercase()),
            "endpointStatus": status,
            "endpointMonitorStatus": monitor,
            "priority": priority,
            "weight": 1,
        }
    })
}

/// Start the mock management API on an ephemeral port. Returns its base URL.
pub async fn start_mock_arm(profile: Value) -> (String, Arc<MockArm>) {
    let mock = Arc::new(MockArm::default());
    *mock.profile.lock().unwrap() = profile;

    let app = Router::new()
        .route(PROFILE_PATH, get(get_profile))
        .route(&format!("{}/{{ep_type}}/{{ep_name}}", PROFILE_PATH), patch(patch_endpoint))
        .with_state(mock.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), mock)
}

async fn get_profile(
    State(mock): State<Arc<MockArm>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    mock.record_auth(&headers);
    *mock.gets.lock().unwrap() += 1;

    if let Some((status, body)) = mock.fail_get_with.lock().unwrap().clone() {
        return (StatusCode::from_u16(status).unwrap(), Json(body));
    }
    (StatusCode::OK, Json(mock.profile.lock().unwrap().clone()))
}

async fn patch_endpoint(
    State(mock): State<Arc<MockArm>>,
    Path(params): Path<HashMap<String, String>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    mock.record_auth(&headers);
    let name = params.get("ep_name").cloned().unwrap_or_default();
    mock.patches.lock().unwrap().push(PatchCall {
        endpoint_type: params.get("ep_type").cloned().unwrap_or_default(),
        endpoint_name: name.clone(),
        body: body.clone(),
        api_version: query.get("api-version").cloned(),
    });

    if mock.fail_patch_of.lock().unwrap().as_deref() == Some(name.as_str()) {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "error": { "code": "Conflict", "message": "Another operation is in progress." }
            })),
        );
    }

    let mut profile = mock.profile.lock().unwrap();
    let endpoint = profile["properties"]["endpoints"]
        .as_array_mut()
        .and_then(|eps| eps.iter_mut().find(|ep| ep["name"] == name.as_str()));
    match endpoint {
        Some(endpoint) => {
            endpoint["properties"]["endpointStatus"] = body["properties"]["endpointStatus"].clone();
            (StatusCode::OK, Json(endpoint.clone()))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "code": "NotFound", "message": "Endpoint not found." } })),
        ),
    }
}

/// Breaker double that reports every target it is asked to run.
pub struct RecordingBreaker {
    tx: mpsc::UnboundedSender<ResourceIdentity>,
}

impl RecordingBreaker {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ResourceIdentity>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl Breaker for RecordingBreaker {
    async fn run_cycle(&self, target: ResourceIdentity) -> Result<CycleOutcome, BreakerError> {
        let _ = self.tx.send(target);
        Ok(CycleOutcome::Skipped(SkipReason::NoOnlineEndpoint))
    }
}

/// Poll `check` until it returns true or two seconds pass.
pub async fn eventually<F>(check: F) -> bool
where
    F: Fn() -> bool,
{
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
