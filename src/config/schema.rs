//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the breaker.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the failover breaker.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BreakerConfig {
    /// Listener configuration (bind address, port override).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Control plane endpoint and credentials.
    pub control_plane: ControlPlaneConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Environment variable whose value, when set, replaces the port of
    /// `bind_address`. Serverless hosts hand the port over this way.
    pub port_env: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            port_env: "FUNCTIONS_CUSTOMHANDLER_PORT".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Webhook request timeout in seconds. Covers only the synchronous
    /// part; the decision cycle runs detached.
    pub request_secs: u64,

    /// Deadline for one decision cycle in seconds.
    pub cycle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            cycle_secs: 240,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum webhook body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024,
        }
    }
}

/// Management API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlPlaneConfig {
    /// Base URL of the management API.
    pub base_url: String,

    /// `api-version` query parameter sent with every call.
    pub api_version: String,

    /// Per-call timeout in seconds.
    pub request_timeout_secs: u64,

    /// How to obtain bearer tokens.
    pub credential: CredentialConfig,
}

impl ControlPlaneConfig {
    /// Token audience for the management API (base URL with a trailing slash).
    pub fn token_resource(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            base_url: "https://management.azure.com".to_string(),
            api_version: "2022-04-01".to_string(),
            request_timeout_secs: 30,
            credential: CredentialConfig::default(),
        }
    }
}

/// Credential source.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CredentialConfig {
    /// Fixed bearer token, inline or read from an environment variable.
    Static {
        #[serde(default)]
        token: Option<String>,
        #[serde(default = "default_token_env")]
        token_env: String,
    },
    /// Host-provided managed identity endpoint.
    ManagedIdentity {
        /// Client id of a user-assigned identity.
        #[serde(default)]
        client_id: Option<String>,
    },
}

fn default_token_env() -> String {
    "AZURE_ACCESS_TOKEN".to_string()
}

impl Default for CredentialConfig {
    fn default() -> Self {
        CredentialConfig::ManagedIdentity { client_id: None }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Metrics endpoint address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
