//! Configuration types
//!
//! Every field has a serde default so partial JSON/TOML files load cleanly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_VERSION, DEFAULT_CLIENT_ID, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_LOGIN_URL,
    DEFAULT_REDIRECT_URI, DEPLOY_MAX_ATTEMPTS, DEPLOY_POLL_INTERVAL_MS, PASSWORD_LENGTH,
    PASSWORD_MIN_NUMERIC, PASSWORD_MIN_SPECIAL, PASSWORD_MIN_UPPER, PROVISION_DEADLINE_SECS,
    PROVISION_POLL_INTERVAL_SECS,
};

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub api_version: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub login_url: String,
    pub http_timeout_secs: u64,
    pub deploy: DeployConfig,
    pub provisioning: ProvisioningConfig,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            deploy: DeployConfig::default(),
            provisioning: ProvisioningConfig::default(),
        }
    }
}

impl ForceConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Deployment job polling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub poll_interval_ms: u64,
    /// Zero disables the attempt bound, leaving `deadline_secs` in charge.
    pub max_attempts: u32,
    /// Optional wall-clock bound on top of `max_attempts`.
    pub deadline_secs: Option<u64>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEPLOY_POLL_INTERVAL_MS,
            max_attempts: DEPLOY_MAX_ATTEMPTS,
            deadline_secs: None,
        }
    }
}

impl DeployConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

/// Environment provisioning polling and credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    pub poll_interval_secs: u64,
    pub deadline_secs: u64,
    pub password: PasswordPolicy,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: PROVISION_POLL_INTERVAL_SECS,
            deadline_secs: PROVISION_DEADLINE_SECS,
            password: PasswordPolicy::default(),
        }
    }
}

impl ProvisioningConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

/// Composition rule for generated passwords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub length: usize,
    pub min_special: usize,
    pub min_numeric: usize,
    pub min_upper: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            length: PASSWORD_LENGTH,
            min_special: PASSWORD_MIN_SPECIAL,
            min_numeric: PASSWORD_MIN_NUMERIC,
            min_upper: PASSWORD_MIN_UPPER,
        }
    }
}

impl PasswordPolicy {
    /// Characters fixed by the minimums.
    pub fn required(&self) -> usize {
        self.min_special + self.min_numeric + self.min_upper
    }
}
