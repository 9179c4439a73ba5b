//! Domain types and models

pub mod environment;
pub mod job;
pub mod query;
pub mod script;

pub use environment::{
    CreateEnvironmentParams, CreateEnvironmentResult, Edition, EnvironmentRecord,
    EnvironmentSettings, EnvironmentStatus, ExistenceCheck, IpRange, ProvisionedEnvironment,
    ProvisioningStep, Release, RemovalResult,
};
pub use job::{DeployOptions, DeployResponse, DeployResult, JobId, JobStatus, TestLevel};
pub use query::{QueryResult, Record};
pub use script::ScriptResult;
