//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! workspace.

// Remote API
pub const DEFAULT_API_VERSION: &str = "53.0";
pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com";
pub const DEFAULT_CLIENT_ID: &str = "PlatformCLI";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:1717/OauthRedirect";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

// Deployment job polling
pub const DEPLOY_POLL_INTERVAL_MS: u64 = 1_000;
pub const DEPLOY_MAX_ATTEMPTS: u32 = 120;
pub const DEPLOY_TIMEOUT_MESSAGE: &str = "Timeout while waiting for result";
pub const DEPLOY_ARCHIVE_FILENAME: &str = "deploy.zip";

// Environment provisioning
pub const PROVISION_POLL_INTERVAL_SECS: u64 = 10;
pub const PROVISION_DEADLINE_SECS: u64 = 360;
pub const ENVIRONMENT_OBJECT: &str = "ScratchOrgInfo";
pub const DEFAULT_DURATION_DAYS: u8 = 30;
pub const MAX_DURATION_DAYS: u8 = 30;
pub const DEFAULT_LANGUAGE: &str = "en_US";
/// Unique-by-name lookups fetch one extra row so duplicates are visible.
pub const UNIQUE_LOOKUP_LIMIT: u32 = 2;
pub const TEARDOWN_BATCH_LIMIT: u32 = 10;

// Password generation
pub const PASSWORD_LENGTH: usize = 16;
pub const PASSWORD_MIN_SPECIAL: usize = 2;
pub const PASSWORD_MIN_NUMERIC: usize = 2;
pub const PASSWORD_MIN_UPPER: usize = 2;
