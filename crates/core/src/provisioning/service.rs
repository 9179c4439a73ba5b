//! Provisioning service - create, configure, inspect and tear down environments
//!
//! `create` drives the whole lifecycle: insert the request row, poll until the
//! environment is `Active`, then connect to it and apply settings, password
//! and user details. A failure after `Active` is reported as
//! `ForceError::PartiallyProvisioned` so callers keep whatever was produced.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use scratchforce_domain::{
    CreateEnvironmentParams, CreateEnvironmentResult, DeployOptions, DeployResult,
    EnvironmentRecord, EnvironmentSettings, EnvironmentStatus, ExistenceCheck, ForceConfig,
    ForceError, PasswordPolicy, ProvisionedEnvironment, ProvisioningStep, RemovalResult, Result,
    TestLevel,
};
use tracing::{debug, info, instrument, warn};

use crate::deploy::DeployService;
use crate::password::generate_password;
use crate::poll::{poll_until, PollOutcome, PollPolicy, PollStep};
use crate::ports::{EnvironmentConnector, OrgApi, SettingsPackager};
use crate::scripts;

const RESOURCE: &str = "environment";

/// Provisioning service
pub struct ProvisioningService<C: EnvironmentConnector> {
    connector: C,
    packager: Arc<dyn SettingsPackager>,
    deployer: DeployService,
    client_id: String,
    redirect_uri: String,
    poll_interval: Duration,
    deadline: Duration,
    password_policy: PasswordPolicy,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl<C: EnvironmentConnector> ProvisioningService<C> {
    /// Create a new provisioning service
    pub fn new(connector: C, packager: Arc<dyn SettingsPackager>, config: &ForceConfig) -> Self {
        Self {
            connector,
            packager,
            deployer: DeployService::from_config(&config.deploy),
            client_id: config.client_id.clone(),
            redirect_uri: config.redirect_uri.clone(),
            poll_interval: config.provisioning.poll_interval(),
            deadline: config.provisioning.deadline(),
            password_policy: config.provisioning.password,
            rng: Mutex::new(Box::new(StdRng::from_entropy())),
        }
    }

    /// Replace the random source used for passwords
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Mutex::new(Box::new(rng));
        self
    }

    /// Override the create-poll interval and deadline
    pub fn with_polling(mut self, interval: Duration, deadline: Duration) -> Self {
        self.poll_interval = interval;
        self.deadline = deadline;
        self
    }

    /// Replace the deployment service used for settings
    pub fn with_deployer(mut self, deployer: DeployService) -> Self {
        self.deployer = deployer;
        self
    }

    /// Provision an environment and leave it ready to log into.
    ///
    /// # Errors
    /// - `Auth` when `api` is not authenticated
    /// - `ProvisioningFailed` when the remote side reports `Error`
    /// - `Ambiguous` when more than one row matches name and username
    /// - `Timeout` when the environment is not `Active` before the deadline
    /// - `PartiallyProvisioned` when a step after activation fails
    #[instrument(skip(self, api, params), fields(name = %params.name))]
    pub async fn create(
        &self,
        api: &dyn OrgApi,
        params: &CreateEnvironmentParams,
    ) -> Result<CreateEnvironmentResult> {
        if !api.is_authenticated() {
            return Err(ForceError::not_authenticated());
        }
        params.validate()?;

        let insert = scripts::insert_environment_script(params, &self.client_id, &self.redirect_uri)?;
        api.execute_anonymous(&insert).await?.ensure_success("environment insert")?;
        info!("Environment requested");

        let mut environment = self.await_active(api, params).await?;
        info!(expires_at = ?environment.expires_at, "Environment active");

        let session = self
            .connector
            .connect(&environment)
            .await
            .map_err(|e| partial(ProvisioningStep::Authenticate, &environment, e))?;

        self.apply_settings(&session, &params.settings)
            .await
            .map_err(|e| partial(ProvisioningStep::ApplySettings, &environment, e))?;

        self.set_credentials(&session, params, &mut environment).await?;

        info!("Environment ready");
        Ok(CreateEnvironmentResult { success: true, environment })
    }

    /// Deploy settings to an environment through `session`. Not rolled back
    /// on failure.
    #[instrument(skip(self, session, settings), fields(ip_ranges = settings.ip_ranges.len()))]
    pub async fn apply_settings(
        &self,
        session: &dyn OrgApi,
        settings: &EnvironmentSettings,
    ) -> Result<DeployResult> {
        let archive = self.packager.package(settings)?;
        self.deployer
            .deploy(session, archive, &DeployOptions::with_test_level(TestLevel::NoTestRun))
            .await
    }

    /// Set a generated password, then locale, phone and country.
    ///
    /// Runs through the environment's own `session`. The password is stored
    /// on `environment` before the second script runs, so it survives a
    /// failure there.
    ///
    /// # Errors
    /// `PartiallyProvisioned` naming the failed step.
    #[instrument(skip_all, fields(name = %environment.name))]
    pub async fn set_credentials(
        &self,
        session: &dyn OrgApi,
        params: &CreateEnvironmentParams,
        environment: &mut ProvisionedEnvironment,
    ) -> Result<()> {
        let password = self
            .next_password()
            .map_err(|e| partial(ProvisioningStep::SetPassword, environment, e))?;

        let script = scripts::set_password_script(&password)
            .map_err(|e| partial(ProvisioningStep::SetPassword, environment, e))?;
        run_script(session, &script, "password update")
            .await
            .map_err(|e| partial(ProvisioningStep::SetPassword, environment, e))?;
        environment.password = Some(password);
        debug!("Password set");

        let script = scripts::update_user_details_script(params)
            .map_err(|e| partial(ProvisioningStep::UpdateUserDetails, environment, e))?;
        run_script(session, &script, "user details update")
            .await
            .map_err(|e| partial(ProvisioningStep::UpdateUserDetails, environment, e))?;
        debug!("User details updated");

        Ok(())
    }

    /// Check whether an active environment with `name` exists.
    #[instrument(skip(self, api))]
    pub async fn exists(&self, api: &dyn OrgApi, name: &str) -> Result<ExistenceCheck> {
        if !api.is_authenticated() {
            return Err(ForceError::not_authenticated());
        }

        let result = api.query(&scripts::active_environment_query(name)?).await?;
        match result.records.as_slice() {
            [] => Ok(ExistenceCheck { exists: false, expires_at: None }),
            [record] => {
                let record = EnvironmentRecord::from_record(record);
                Ok(ExistenceCheck { exists: true, expires_at: record.expires_at })
            }
            records => Err(ambiguous(name, records.len())),
        }
    }

    /// Delete active environments named `name`, up to one batch.
    ///
    /// Finding nothing is a success and issues no delete.
    #[instrument(skip(self, api))]
    pub async fn teardown(&self, api: &dyn OrgApi, name: &str) -> Result<RemovalResult> {
        if !api.is_authenticated() {
            return Err(ForceError::not_authenticated());
        }

        let result = api.query(&scripts::active_environment_ids_query(name)?).await?;
        let ids: Vec<String> =
            result.records.iter().filter_map(|r| r.id().map(str::to_string)).collect();
        if ids.is_empty() {
            info!("No active environment to remove");
            return Ok(RemovalResult { success: true, removed: 0 });
        }

        let script = scripts::delete_environments_script(&ids)?;
        run_script(api, &script, "environment delete").await?;
        info!(removed = ids.len(), "Environments removed");
        Ok(RemovalResult { success: true, removed: ids.len() })
    }

    /// All active environments visible to `api`.
    #[instrument(skip(self, api))]
    pub async fn list(&self, api: &dyn OrgApi) -> Result<Vec<EnvironmentRecord>> {
        if !api.is_authenticated() {
            return Err(ForceError::not_authenticated());
        }

        let result = api.query(&scripts::active_environments_query()?).await?;
        Ok(result.records.iter().map(EnvironmentRecord::from_record).collect())
    }

    async fn await_active(
        &self,
        api: &dyn OrgApi,
        params: &CreateEnvironmentParams,
    ) -> Result<ProvisionedEnvironment> {
        let query = scripts::environment_by_owner_query(&params.name, &params.username)?;
        let query = query.as_str();
        let name = params.name.as_str();
        let policy = PollPolicy::every(self.poll_interval).with_deadline(self.deadline);
        let last_seen = Mutex::new(EnvironmentStatus::Provisioning);
        let last_seen = &last_seen;

        let outcome = poll_until(&policy, |attempt| async move {
            let result = api.query(query).await?;
            match result.records.as_slice() {
                [] => {
                    debug!(attempt, "Environment not visible yet");
                    Ok(PollStep::Pending)
                }
                [record] => {
                    let record = EnvironmentRecord::from_record(record);
                    if let Ok(mut previous) = last_seen.lock() {
                        if !previous.can_transition_to(record.status) {
                            warn!(
                                attempt,
                                from = ?*previous,
                                to = ?record.status,
                                "Environment status moved backwards"
                            );
                        }
                        *previous = record.status;
                    }
                    match record.status {
                        EnvironmentStatus::Active => Ok(PollStep::Ready(record)),
                        EnvironmentStatus::Error => {
                            warn!(error_code = ?record.error_code, "Environment failed to provision");
                            Err(ForceError::ProvisioningFailed {
                                name: name.to_string(),
                                message: record
                                    .error_code
                                    .unwrap_or_else(|| "remote reported Error status".to_string()),
                            })
                        }
                        status => {
                            debug!(attempt, status = ?status, "Environment still provisioning");
                            Ok(PollStep::Pending)
                        }
                    }
                }
                records => Err(ambiguous(name, records.len())),
            }
        })
        .await?;

        match outcome {
            PollOutcome::Completed { value, .. } => Ok(ProvisionedEnvironment::from_record(value)),
            PollOutcome::Exhausted { attempts } => {
                warn!(attempts, "Environment did not become active in time");
                Err(ForceError::Timeout {
                    operation: "environment provisioning".to_string(),
                    waited: self.deadline,
                })
            }
        }
    }

    fn next_password(&self) -> Result<String> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| ForceError::Internal("password generator lock poisoned".into()))?;
        generate_password(&self.password_policy, &mut *rng)
    }
}

async fn run_script(api: &dyn OrgApi, body: &str, operation: &str) -> Result<()> {
    api.execute_anonymous(body).await?.ensure_success(operation)?;
    Ok(())
}

fn ambiguous(name: &str, matches: usize) -> ForceError {
    warn!(name, matches, "More than one environment matches");
    ForceError::Ambiguous { resource: RESOURCE.to_string(), name: name.to_string(), matches }
}

fn partial(
    step: ProvisioningStep,
    environment: &ProvisionedEnvironment,
    reason: ForceError,
) -> ForceError {
    warn!(name = %environment.name, %step, error = %reason, "Provisioning step failed");
    ForceError::PartiallyProvisioned {
        step,
        result: Box::new(CreateEnvironmentResult { success: false, environment: environment.clone() }),
        reason: Box::new(reason),
    }
}
