use async_trait::async_trait;
use scratchforce_core::EnvironmentConnector;
use scratchforce_domain::{ForceConfig, ForceError, ProvisionedEnvironment, Result};
use tracing::instrument;

use super::session::Session;

/// Opens sessions into new environments through the authorization-code grant
#[derive(Debug, Clone)]
pub struct AuthCodeConnector {
    config: ForceConfig,
}

impl AuthCodeConnector {
    pub fn new(config: ForceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EnvironmentConnector for AuthCodeConnector {
    type Session = Session;

    #[instrument(skip(self, environment), fields(environment = %environment.name))]
    async fn connect(&self, environment: &ProvisionedEnvironment) -> Result<Session> {
        let auth_code = environment.auth_code.as_str();
        if auth_code.is_empty() {
            return Err(ForceError::Auth(format!(
                "environment '{}' has no authorization code",
                environment.name
            )));
        }

        let login_url = if environment.login_url.is_empty() {
            self.config.login_url.as_str()
        } else {
            environment.login_url.as_str()
        };

        Session::login_with_auth_code(&self.config, login_url, auth_code).await
    }
}
