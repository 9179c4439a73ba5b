//! Error types used throughout the workspace

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::environment::{CreateEnvironmentResult, ProvisioningStep};

/// Categories of errors, used by callers to decide whether to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No usable session, or the remote side rejected the credentials
    Authentication,
    /// Network or HTTP-level failure
    Transport,
    /// More than one remote row matched a unique-by-name lookup
    AmbiguousResource,
    /// The remote side reported `success = false`, an exception, or a problem
    RemoteFailure,
    /// A bounded wait expired before a terminal state was observed
    Timeout,
    /// A multi-step workflow failed after earlier steps succeeded
    PartialSuccess,
    /// Caller-supplied input or configuration was rejected locally
    InvalidRequest,
    /// Local failure that does not fit any other category
    Internal,
}

/// Main error type for Scratchforce
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ForceError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{operation} failed: {message}")]
    Remote {
        operation: String,
        code: Option<String>,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("More than one {resource} matches '{name}' ({matches} found)")]
    Ambiguous { resource: String, name: String, matches: usize },

    #[error("Timed out after {waited:?} waiting for {operation}")]
    Timeout { operation: String, waited: Duration },

    #[error("Environment '{name}' failed to provision: {message}")]
    ProvisioningFailed { name: String, message: String },

    #[error(
        "Environment '{}' partially provisioned, {step} failed: {reason}",
        .result.environment.name
    )]
    PartiallyProvisioned {
        step: ProvisioningStep,
        result: Box<CreateEnvironmentResult>,
        #[source]
        reason: Box<ForceError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ForceError {
    /// Error returned by every remote operation attempted without a session.
    pub fn not_authenticated() -> Self {
        Self::Auth("session is not authenticated".into())
    }

    /// Remote failure with only a message.
    pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote { operation: operation.into(), code: None, message: message.into(), details: None }
    }

    /// Get the error category for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth(_) => ErrorKind::Authentication,
            Self::Network(_) => ErrorKind::Transport,
            Self::Remote { .. } | Self::ProvisioningFailed { .. } => ErrorKind::RemoteFailure,
            Self::Ambiguous { .. } => ErrorKind::AmbiguousResource,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::PartiallyProvisioned { .. } => ErrorKind::PartialSuccess,
            Self::Config(_) | Self::InvalidInput(_) => ErrorKind::InvalidRequest,
            Self::Archive(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether repeating the same call may succeed.
    ///
    /// Timeouts and transport failures are transient. Terminal remote
    /// failures, ambiguous lookups and partial provisioning are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport | ErrorKind::Timeout)
    }

    /// Partial output carried by a partially provisioned error.
    pub fn partial_result(&self) -> Option<&CreateEnvironmentResult> {
        match self {
            Self::PartiallyProvisioned { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// Result type alias for Scratchforce operations
pub type Result<T> = std::result::Result<T, ForceError>;
