//! Example: provisioning a short-lived environment from a hub org
//!
//! # Setup
//!
//! 1. Create a `.env` file (or export the variables):
//!    ```bash
//!    SCRATCHFORCE_HUB_INSTANCE_URL=https://my-hub.my.salesforce.com
//!    SCRATCHFORCE_HUB_ACCESS_TOKEN=00D...
//!    SCRATCHFORCE_ENV_NAME=demo
//!    SCRATCHFORCE_ENV_USERNAME=admin@demo.example.com
//!    ```
//!
//! 2. Run this example: ```bash cargo run -p scratchforce-infra --example
//!    provision_environment ```
//!
//! Set `SCRATCHFORCE_TEARDOWN=1` to delete the environment again afterwards
//! and `SCRATCHFORCE_LOG_FORMAT=json` for JSON log lines.

use std::sync::Arc;

use scratchforce_core::ProvisioningService;
use scratchforce_domain::CreateEnvironmentParams;
use scratchforce_infra::{
    config, init_logging, AuthCodeConnector, LogFormat, Session, SettingsArchivePackager,
};
use tracing::{info, warn};

fn required(key: &str) -> Result<String, Box<dyn std::error::Error>> {
    std::env::var(key).map_err(|_| format!("missing environment variable {key}").into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let format = std::env::var("SCRATCHFORCE_LOG_FORMAT")
        .map(|value| LogFormat::from_env_value(&value))
        .unwrap_or_default();
    init_logging(format)?;

    let config = config::load()?;
    let hub = Session::with_token(
        required("SCRATCHFORCE_HUB_INSTANCE_URL")?,
        required("SCRATCHFORCE_HUB_ACCESS_TOKEN")?,
        &config,
    )?;

    let service = ProvisioningService::new(
        AuthCodeConnector::new(config.clone()),
        Arc::new(SettingsArchivePackager::new(config.api_version.clone())),
        &config,
    );

    let name = required("SCRATCHFORCE_ENV_NAME")?;
    let mut params = CreateEnvironmentParams::new(&name, required("SCRATCHFORCE_ENV_USERNAME")?);
    params.features = vec!["API".into(), "AuthorApex".into()];
    params.duration_days = 1;

    let existing = service.exists(&hub, &name).await?;
    if existing.exists {
        warn!(name = %name, expires_at = ?existing.expires_at, "Environment already exists");
        return Ok(());
    }

    match service.create(&hub, &params).await {
        Ok(result) => {
            let environment = result.environment;
            info!(
                name = %environment.name,
                login_url = %environment.login_url,
                username = %environment.username,
                expires_at = ?environment.expiry_date(),
                "Environment ready"
            );
        }
        Err(err) => {
            if let Some(partial) = err.partial_result() {
                warn!(environment = ?partial.environment, "Environment left partially provisioned");
            }
            return Err(err.into());
        }
    }

    if std::env::var("SCRATCHFORCE_TEARDOWN").is_ok_and(|v| v == "1") {
        let removal = service.teardown(&hub, &name).await?;
        info!(removed = removal.removed, "Environment removed");
    }

    Ok(())
}
