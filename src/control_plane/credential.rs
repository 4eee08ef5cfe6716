//! Access tokens for the management API.
//!
//! # Responsibilities
//! - Hand out bearer tokens to the control plane client
//! - Cache managed-identity tokens until shortly before expiry
//!
//! # Design Decisions
//! - Token acquisition is probed once at startup; failure there is fatal
//! - Providers are shared across cycles, so caching is behind a mutex

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use url::Url;

use crate::config::CredentialConfig;
use crate::control_plane::error::CredentialError;

/// Environment variable naming the managed-identity token endpoint.
pub const IDENTITY_ENDPOINT_ENV: &str = "IDENTITY_ENDPOINT";
/// Environment variable holding the managed-identity secret header.
pub const IDENTITY_HEADER_ENV: &str = "IDENTITY_HEADER";

const MANAGED_IDENTITY_API_VERSION: &str = "2019-08-01";
const REFRESH_MARGIN: Duration = Duration::from_secs(300);

/// A bearer token and, when known, its expiry.
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Option<SystemTime>,
}

impl AccessToken {
    /// True while the token is comfortably inside its lifetime.
    pub fn is_fresh(&self) -> bool {
        match self.expires_at {
            Some(expiry) => SystemTime::now() + REFRESH_MARGIN < expiry,
            None => true,
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Supplies tokens for control plane calls.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn token(&self) -> Result<AccessToken, CredentialError>;
}

/// A fixed token, e.g. one minted out of band.
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn token(&self) -> Result<AccessToken, CredentialError> {
        Ok(AccessToken {
            token: self.token.clone(),
            expires_at: None,
        })
    }
}

/// Managed identity of the hosting App Service / Functions app.
pub struct ManagedIdentityCredential {
    endpoint: Url,
    secret_header: String,
    resource: String,
    client_id: Option<String>,
    http: reqwest::Client,
    cached: Mutex<Option<AccessToken>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_on: Value,
}

impl ManagedIdentityCredential {
    /// Every token request is bounded by `timeout`, so a silent endpoint
    /// fails instead of holding the cache lock indefinitely.
    pub fn new(
        endpoint: Url,
        secret_header: impl Into<String>,
        resource: impl Into<String>,
        client_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CredentialError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CredentialError::Unavailable(format!("identity client: {e}")))?;

        Ok(Self {
            endpoint,
            secret_header: secret_header.into(),
            resource: resource.into(),
            client_id,
            http,
            cached: Mutex::new(None),
        })
    }

    /// Build from the variables the hosting environment injects.
    pub fn from_env(
        resource: &str,
        client_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CredentialError> {
        let endpoint = std::env::var(IDENTITY_ENDPOINT_ENV).map_err(|_| {
            CredentialError::Unavailable(format!("{IDENTITY_ENDPOINT_ENV} is not set"))
        })?;
        let secret = std::env::var(IDENTITY_HEADER_ENV).map_err(|_| {
            CredentialError::Unavailable(format!("{IDENTITY_HEADER_ENV} is not set"))
        })?;
        let endpoint = Url::parse(&endpoint).map_err(|e| {
            CredentialError::Unavailable(format!("invalid {IDENTITY_ENDPOINT_ENV}: {e}"))
        })?;
        Self::new(endpoint, secret, resource, client_id, timeout)
    }

    async fn request_token(&self) -> Result<AccessToken, CredentialError> {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("resource", &self.resource)
                .append_pair("api-version", MANAGED_IDENTITY_API_VERSION);
            if let Some(client_id) = &self.client_id {
                query.append_pair("client_id", client_id);
            }
        }

        let response = self
            .http
            .get(url)
            .header("X-IDENTITY-HEADER", &self.secret_header)
            .send()
            .await
            .map_err(|e| CredentialError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CredentialError::Request(format!("status {status}: {body}")));
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| CredentialError::InvalidResponse(e.to_string()))?;

        Ok(AccessToken {
            token: parsed.access_token,
            expires_at: parse_expires_on(&parsed.expires_on),
        })
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    async fn token(&self) -> Result<AccessToken, CredentialError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.clone());
        }

        let token = self.request_token().await?;
        tracing::debug!(expires_at = ?token.expires_at, "Acquired managed identity token");
        *cached = Some(token.clone());
        Ok(token)
    }
}

/// `expires_on` arrives as epoch seconds, either as a string or a number.
fn parse_expires_on(value: &Value) -> Option<SystemTime> {
    let secs = match value {
        Value::String(s) => s.parse::<u64>().ok()?,
        Value::Number(n) => n.as_u64()?,
        _ => return None,
    };
    UNIX_EPOCH.checked_add(Duration::from_secs(secs))
}

/// Build the configured credential provider. `timeout` bounds each token request.
pub fn from_config(
    config: &CredentialConfig,
    resource: &str,
    timeout: Duration,
) -> Result<Arc<dyn TokenCredential>, CredentialError> {
    match config {
        CredentialConfig::Static { token, token_env } => {
            let token = match token {
                Some(token) => token.clone(),
                None => std::env::var(token_env).map_err(|_| {
                    CredentialError::Unavailable(format!("{token_env} is not set"))
                })?,
            };
            Ok(Arc::new(StaticTokenCredential::new(token)))
        }
        CredentialConfig::ManagedIdentity { client_id } => Ok(Arc::new(
            ManagedIdentityCredential::from_env(resource, client_id.clone(), timeout)?,
        )),
    }
}
