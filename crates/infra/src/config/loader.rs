//! Configuration loader
//!
//! Builds a [`ForceConfig`] from defaults, an optional config file and
//! environment variables.
//!
//! ## Loading Strategy
//! 1. Start from [`ForceConfig::default`]
//! 2. If a config file is found, it replaces the defaults (missing fields
//!    keep their default values)
//! 3. Environment variables override individual fields
//!
//! ## Environment Variables
//! - `SCRATCHFORCE_LOGIN_URL`: Login endpoint for new environments
//! - `SCRATCHFORCE_API_VERSION`: Remote API version, e.g. `53.0`
//! - `SCRATCHFORCE_CLIENT_ID`: Connected app client id
//! - `SCRATCHFORCE_REDIRECT_URI`: Connected app redirect URI
//! - `SCRATCHFORCE_HTTP_TIMEOUT`: Per-request timeout in seconds
//! - `SCRATCHFORCE_DEPLOY_POLL_INTERVAL_MS`: Deployment poll interval
//! - `SCRATCHFORCE_DEPLOY_MAX_ATTEMPTS`: Deployment status fetch budget
//! - `SCRATCHFORCE_PROVISION_POLL_INTERVAL`: Provisioning poll interval in
//!   seconds
//! - `SCRATCHFORCE_PROVISION_DEADLINE`: Provisioning deadline in seconds
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./scratchforce.json` or `./scratchforce.toml` (current working
//!    directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use scratchforce_domain::{ForceConfig, ForceError, Result};

pub const ENV_LOGIN_URL: &str = "SCRATCHFORCE_LOGIN_URL";
pub const ENV_API_VERSION: &str = "SCRATCHFORCE_API_VERSION";
pub const ENV_CLIENT_ID: &str = "SCRATCHFORCE_CLIENT_ID";
pub const ENV_REDIRECT_URI: &str = "SCRATCHFORCE_REDIRECT_URI";
pub const ENV_HTTP_TIMEOUT: &str = "SCRATCHFORCE_HTTP_TIMEOUT";
pub const ENV_DEPLOY_POLL_INTERVAL_MS: &str = "SCRATCHFORCE_DEPLOY_POLL_INTERVAL_MS";
pub const ENV_DEPLOY_MAX_ATTEMPTS: &str = "SCRATCHFORCE_DEPLOY_MAX_ATTEMPTS";
pub const ENV_PROVISION_POLL_INTERVAL: &str = "SCRATCHFORCE_PROVISION_POLL_INTERVAL";
pub const ENV_PROVISION_DEADLINE: &str = "SCRATCHFORCE_PROVISION_DEADLINE";

/// Load configuration: probed file (or defaults), then environment overrides
///
/// # Errors
/// Returns `ForceError::Config` if a probed file is malformed or an
/// environment variable holds an invalid value.
pub fn load() -> Result<ForceConfig> {
    let mut config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            ForceConfig::default()
        }
    };
    apply_env_overrides(&mut config)?;
    validate(&config)?;
    Ok(config)
}

/// Defaults with environment overrides applied
pub fn load_from_env() -> Result<ForceConfig> {
    let mut config = ForceConfig::default();
    apply_env_overrides(&mut config)?;
    validate(&config)?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Supports JSON and
/// TOML, detected by file extension.
///
/// # Errors
/// Returns `ForceError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ForceConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ForceError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ForceError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ForceError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    validate(&config)?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<ForceConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ForceError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ForceError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(ForceError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a config file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["config.json", "config.toml", "scratchforce.json", "scratchforce.toml"];

    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(NAMES.iter().map(|name| cwd.join(name)));
        candidates.push(cwd.join("../config.json"));
        candidates.push(cwd.join("../config.toml"));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Override fields of `config` from any `SCRATCHFORCE_*` variables that are set.
pub fn apply_env_overrides(config: &mut ForceConfig) -> Result<()> {
    if let Some(value) = env_string(ENV_LOGIN_URL) {
        config.login_url = value;
    }
    if let Some(value) = env_string(ENV_API_VERSION) {
        config.api_version = value;
    }
    if let Some(value) = env_string(ENV_CLIENT_ID) {
        config.client_id = value;
    }
    if let Some(value) = env_string(ENV_REDIRECT_URI) {
        config.redirect_uri = value;
    }
    if let Some(value) = env_parse(ENV_HTTP_TIMEOUT)? {
        config.http_timeout_secs = value;
    }
    if let Some(value) = env_parse(ENV_DEPLOY_POLL_INTERVAL_MS)? {
        config.deploy.poll_interval_ms = value;
    }
    if let Some(value) = env_parse(ENV_DEPLOY_MAX_ATTEMPTS)? {
        config.deploy.max_attempts = value;
    }
    if let Some(value) = env_parse(ENV_PROVISION_POLL_INTERVAL)? {
        config.provisioning.poll_interval_secs = value;
    }
    if let Some(value) = env_parse(ENV_PROVISION_DEADLINE)? {
        config.provisioning.deadline_secs = value;
    }
    Ok(())
}

/// Reject values no workflow can run with.
fn validate(config: &ForceConfig) -> Result<()> {
    if config.api_version.trim().is_empty() {
        return Err(ForceError::Config("api_version must not be empty".into()));
    }
    if config.http_timeout_secs == 0 {
        return Err(ForceError::Config("http_timeout_secs must be positive".into()));
    }
    if config.deploy.max_attempts == 0 && config.deploy.deadline_secs.is_none() {
        return Err(ForceError::Config(
            "deploy polling needs max_attempts or deadline_secs".into(),
        ));
    }
    if config.provisioning.deadline_secs == 0 {
        return Err(ForceError::Config("provisioning deadline_secs must be positive".into()));
    }
    if config.provisioning.password.required() > config.provisioning.password.length {
        return Err(ForceError::Config(
            "password minimums exceed the configured password length".into(),
        ));
    }
    Ok(())
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| ForceError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}
