//! Port interfaces for the remote platform
//!
//! These traits define the boundaries between the workflows in this crate
//! and the HTTP/archive adapters in `scratchforce-infra`.

use async_trait::async_trait;
use scratchforce_domain::{
    DeployOptions, EnvironmentSettings, JobId, JobStatus, ProvisionedEnvironment, QueryResult,
    Result, ScriptResult,
};

/// Authenticated access to one remote org
#[async_trait]
pub trait OrgApi: Send + Sync {
    /// Whether the session holds usable credentials. Every other method
    /// fails with `ForceError::Auth` when this is false.
    fn is_authenticated(&self) -> bool;

    /// Run a query and return all matching records in remote order
    async fn query(&self, soql: &str) -> Result<QueryResult>;

    /// Execute an anonymous script.
    ///
    /// A script that fails to compile or throws is reported through the
    /// returned [`ScriptResult`], not as `Err`.
    async fn execute_anonymous(&self, body: &str) -> Result<ScriptResult>;

    /// Submit a deployment archive and return the initial job status
    async fn submit_deploy(&self, archive: Vec<u8>, options: &DeployOptions) -> Result<JobStatus>;

    /// Fetch the current status of a deployment, including component details
    async fn deploy_status(&self, job: &JobId) -> Result<JobStatus>;
}

/// Opens a session into a freshly provisioned environment
#[async_trait]
pub trait EnvironmentConnector: Send + Sync {
    type Session: OrgApi + 'static;

    /// Exchange the environment's one-time auth code for a new session.
    /// The caller's own session is never touched.
    async fn connect(&self, environment: &ProvisionedEnvironment) -> Result<Self::Session>;
}

/// Builds the deployment archive that carries environment settings
pub trait SettingsPackager: Send + Sync {
    fn package(&self, settings: &EnvironmentSettings) -> Result<Vec<u8>>;
}
