//! Control plane error definitions.

use thiserror::Error;

/// Failure to obtain an access token.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The provider is not configured for this environment.
    #[error("credential unavailable: {0}")]
    Unavailable(String),

    /// The token endpoint could not be reached or answered with an error.
    #[error("token request failed: {0}")]
    Request(String),

    /// The token endpoint answered with something that is not a token.
    #[error("invalid token response: {0}")]
    InvalidResponse(String),
}

/// Errors from control plane reads and writes.
#[derive(Debug, Error)]
pub enum ControlPlaneError {
    /// Structured error returned by the management API.
    #[error("{code}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Non-success status without a structured error body.
    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),

    /// Network or protocol failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response could not be turned into a profile.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request URL could not be built.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl ControlPlaneError {
    /// Normalised error code, when the API supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ControlPlaneError::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Result type for control plane operations.
pub type ControlPlaneResult<T> = Result<T, ControlPlaneError>;
