//! Azure Resource Manager client for Traffic Manager profiles.
//!
//! # Responsibilities
//! - Read a profile (routing method + endpoints)
//! - Disable a single endpoint via PATCH
//! - Normalise management API errors to their error code

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::alert::ResourceIdentity;
use crate::config::ControlPlaneConfig;
use crate::control_plane::credential::TokenCredential;
use crate::control_plane::error::{ControlPlaneError, ControlPlaneResult};
use crate::control_plane::types::{
    Endpoint, EndpointStatus, MonitorStatus, RoutingMethod, RoutingProfile,
};
use crate::control_plane::ControlPlane;

/// Prefix of fully qualified endpoint types.
const ENDPOINT_TYPE_PREFIX: &str = "Microsoft.Network/trafficManagerProfiles/";

#[derive(Debug, Deserialize)]
struct ProfileResource {
    #[serde(default)]
    name: String,
    properties: Option<ProfileProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileProperties {
    traffic_routing_method: Option<RoutingMethod>,
    #[serde(default)]
    endpoints: Vec<EndpointResource>,
}

#[derive(Debug, Deserialize)]
struct EndpointResource {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    endpoint_type: String,
    properties: Option<EndpointProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndpointProperties {
    endpoint_status: Option<EndpointStatus>,
    endpoint_monitor_status: Option<MonitorStatus>,
    priority: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: String,
    #[serde(default)]
    message: String,
}

/// REST client shared by every decision cycle.
#[derive(Clone)]
pub struct ArmControlPlane {
    http: reqwest::Client,
    base_url: Url,
    api_version: String,
    credential: Arc<dyn TokenCredential>,
}

impl ArmControlPlane {
    pub fn new(
        config: &ControlPlaneConfig,
        credential: Arc<dyn TokenCredential>,
    ) -> ControlPlaneResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ControlPlaneError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("failover-breaker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_version: config.api_version.clone(),
            credential,
        })
    }

    fn profile_url(&self, target: &ResourceIdentity, extra: &[&str]) -> ControlPlaneResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ControlPlaneError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend([
                "subscriptions",
                target.subscription_id.as_str(),
                "resourceGroups",
                target.resource_group.as_str(),
                "providers",
                "Microsoft.Network",
                "trafficmanagerprofiles",
                target.profile_name.as_str(),
            ])
            .extend(extra);
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    async fn bearer(&self) -> ControlPlaneResult<String> {
        let token = self.credential.token().await?;
        Ok(format!("Bearer {}", token.token))
    }
}

#[async_trait]
impl ControlPlane for ArmControlPlane {
    async fn get_profile(&self, target: &ResourceIdentity) -> ControlPlaneResult<RoutingProfile> {
        let url = self.profile_url(target, &[])?;
        tracing::debug!(url = %url, "Fetching Traffic Manager profile");

        let response = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.bearer().await?)
            .send()
            .await?;
        let body = ensure_success(response).await?;

        let resource: ProfileResource = serde_json::from_slice(&body)
            .map_err(|e| ControlPlaneError::InvalidResponse(e.to_string()))?;
        into_profile(resource)
    }

    async fn disable_endpoint(
        &self,
        target: &ResourceIdentity,
        endpoint: &Endpoint,
    ) -> ControlPlaneResult<()> {
        let url = self.profile_url(
            target,
            &[endpoint_type_segment(&endpoint.endpoint_type), endpoint.name.as_str()],
        )?;
        tracing::debug!(url = %url, endpoint = %endpoint.name, "Disabling endpoint");

        let body = serde_json::json!({
            "name": endpoint.name,
            "type": endpoint.endpoint_type,
            "id": endpoint.id,
            "properties": { "endpointStatus": EndpointStatus::Disabled },
        });

        let response = self
            .http
            .patch(url)
            .header(reqwest::header::AUTHORIZATION, self.bearer().await?)
            .json(&body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

impl std::fmt::Debug for ArmControlPlane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmControlPlane")
            .field("base_url", &self.base_url.as_str())
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Return the body of a successful response, or the normalised error.
async fn ensure_success(response: reqwest::Response) -> ControlPlaneResult<Vec<u8>> {
    let status = response.status();
    let body = response.bytes().await?;
    if status.is_success() {
        Ok(body.to_vec())
    } else {
        Err(normalize_error(status.as_u16(), &body))
    }
}

fn normalize_error(status: u16, body: &[u8]) -> ControlPlaneError {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => ControlPlaneError::Api {
            status,
            code: envelope.error.code,
            message: envelope.error.message,
        },
        Err(_) => ControlPlaneError::UnexpectedStatus(status),
    }
}

/// `Microsoft.Network/trafficManagerProfiles/azureEndpoints` → `azureEndpoints`.
fn endpoint_type_segment(endpoint_type: &str) -> &str {
    match endpoint_type.get(..ENDPOINT_TYPE_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(ENDPOINT_TYPE_PREFIX) => {
            &endpoint_type[ENDPOINT_TYPE_PREFIX.len()..]
        }
        _ => endpoint_type.rsplit('/').next().unwrap_or(endpoint_type),
    }
}

fn into_profile(resource: ProfileResource) -> ControlPlaneResult<RoutingProfile> {
    let properties = resource.properties.ok_or_else(|| {
        ControlPlaneError::InvalidResponse(format!("profile {} has no properties", resource.name))
    })?;

    let endpoints = properties
        .endpoints
        .into_iter()
        .map(into_endpoint)
        .collect::<ControlPlaneResult<Vec<_>>>()?;

    Ok(RoutingProfile {
        name: resource.name,
        routing_method: properties
            .traffic_routing_method
            .unwrap_or(RoutingMethod::Unknown),
        endpoints,
    })
}

fn into_endpoint(resource: EndpointResource) -> ControlPlaneResult<Endpoint> {
    let missing = |field: &str| {
        ControlPlaneError::InvalidResponse(format!("endpoint {} has no {}", resource.name, field))
    };
    let properties = resource.properties.as_ref().ok_or_else(|| missing("properties"))?;
    let priority = properties.priority.ok_or_else(|| missing("priority"))?;
    let status = properties.endpoint_status.ok_or_else(|| missing("endpointStatus"))?;
    let monitor_status = properties
        .endpoint_monitor_status
        .unwrap_or(MonitorStatus::Unknown);

    Ok(Endpoint {
        name: resource.name,
        endpoint_type: resource.endpoint_type,
        id: resource.id,
        priority,
        status,
        monitor_status,
    })
}
