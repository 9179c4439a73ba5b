//! Asynchronous job types for metadata deployment
//!
//! Shapes follow the remote `deployRequest` resource: a submission returns
//! `{id, deployResult}` and every status fetch returns the same envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::DEPLOY_TIMEOUT_MESSAGE;
use crate::impl_remote_enum_conversions;

/// Opaque handle of a server-side asynchronous job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Polled state of an asynchronous job.
///
/// Only a status with `done == true` is authoritative; `success` and the
/// error fields of a pending status carry no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error_status_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
    /// Set only on a status synthesized locally after the poll budget ran out.
    #[serde(skip)]
    pub timed_out: bool,
}

impl JobStatus {
    /// Terminal failure synthesized when polling gives up.
    pub fn timed_out(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            done: true,
            success: false,
            error_message: Some(DEPLOY_TIMEOUT_MESSAGE.to_string()),
            timed_out: true,
            ..Self::default()
        }
    }

    pub fn job_id(&self) -> JobId {
        JobId::new(self.id.clone())
    }
}

/// Envelope returned by deploy submission and status endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub deploy_result: JobStatus,
}

impl DeployResponse {
    /// Flatten the envelope into a status that always carries the job id.
    pub fn into_status(self) -> JobStatus {
        let mut status = self.deploy_result;
        if status.id.is_empty() {
            status.id = self.id;
        }
        status
    }
}

/// Test execution level for a deployment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestLevel {
    #[default]
    NoTestRun,
    RunSpecifiedTests,
    RunLocalTests,
    RunAllTestsInOrg,
}

impl_remote_enum_conversions!(TestLevel {
    NoTestRun => "NoTestRun",
    RunSpecifiedTests => "RunSpecifiedTests",
    RunLocalTests => "RunLocalTests",
    RunAllTestsInOrg => "RunAllTestsInOrg",
});

/// Options sent as the JSON part of a deploy submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployOptions {
    pub allow_missing_files: bool,
    pub auto_update_package: bool,
    pub check_only: bool,
    pub ignore_warnings: bool,
    pub perform_retrieve: bool,
    pub purge_on_delete: bool,
    pub rollback_on_error: bool,
    pub run_tests: Option<Vec<String>>,
    pub single_package: bool,
    pub test_level: TestLevel,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            allow_missing_files: false,
            auto_update_package: false,
            check_only: false,
            ignore_warnings: false,
            perform_retrieve: false,
            purge_on_delete: false,
            rollback_on_error: false,
            run_tests: None,
            single_package: true,
            test_level: TestLevel::NoTestRun,
        }
    }
}

impl DeployOptions {
    pub fn with_test_level(test_level: TestLevel) -> Self {
        Self { test_level, ..Self::default() }
    }

    /// JSON document for the `json` multipart part.
    pub fn descriptor(&self) -> Value {
        serde_json::json!({ "deployOptions": self })
    }
}

/// User-facing projection of a finished deployment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResult {
    pub success: bool,
    pub error_status_code: Option<String>,
    pub error_message: Option<String>,
    pub details: Option<Value>,
    /// Per-component problems found in `details`, in remote order.
    pub problems: Vec<String>,
}

impl From<JobStatus> for DeployResult {
    fn from(status: JobStatus) -> Self {
        Self {
            success: status.success,
            error_status_code: status.error_status_code,
            error_message: status.error_message,
            details: status.details,
            problems: Vec::new(),
        }
    }
}
