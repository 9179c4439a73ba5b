//! Deployment service - submit an archive, wait, and judge the outcome

use scratchforce_domain::{
    DeployConfig, DeployOptions, DeployResult, ForceError, JobId, JobStatus, Result,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::poll::JobPoller;
use crate::ports::OrgApi;

const OPERATION: &str = "deployment";

/// Deploys metadata archives and interprets the final job status
#[derive(Debug, Clone, Default)]
pub struct DeployService {
    poller: JobPoller,
}

impl DeployService {
    pub fn new(poller: JobPoller) -> Self {
        Self { poller }
    }

    pub fn from_config(config: &DeployConfig) -> Self {
        Self { poller: JobPoller::from_config(config) }
    }

    /// Deploy `archive` and wait for a verdict.
    ///
    /// The archive must be complete before this is called. Success requires
    /// top-level success and no component problem.
    #[instrument(
        skip(self, api, archive, options),
        fields(bytes = archive.len(), test_level = %options.test_level)
    )]
    pub async fn deploy(
        &self,
        api: &dyn OrgApi,
        archive: Vec<u8>,
        options: &DeployOptions,
    ) -> Result<DeployResult> {
        if !api.is_authenticated() {
            return Err(ForceError::not_authenticated());
        }

        let status = self
            .poller
            .run(api.submit_deploy(archive, options), move |job: JobId| async move {
                api.deploy_status(&job).await
            })
            .await?;

        self.interpret(status)
    }

    /// Turn a terminal job status into a verdict.
    pub fn interpret(&self, status: JobStatus) -> Result<DeployResult> {
        if status.timed_out {
            warn!(job_id = %status.id, "Deployment did not finish in time");
            return Err(ForceError::Timeout {
                operation: OPERATION.to_string(),
                waited: self.poller.budget(),
            });
        }

        if !status.success {
            warn!(
                job_id = %status.id,
                code = ?status.error_status_code,
                "Deployment reported failure"
            );
            return Err(ForceError::Remote {
                operation: OPERATION.to_string(),
                code: status.error_status_code,
                message: status.error_message.unwrap_or_else(|| "Deployment failed".to_string()),
                details: status.details,
            });
        }

        let problems = component_problems(status.details.as_ref());
        if !problems.is_empty() {
            warn!(job_id = %status.id, count = problems.len(), "Deployment reported component problems");
            return Err(ForceError::Remote {
                operation: OPERATION.to_string(),
                code: status.error_status_code,
                message: problems.join(", "),
                details: status.details,
            });
        }

        info!(job_id = %status.id, "Deployment succeeded");
        Ok(DeployResult::from(status))
    }
}

/// Non-null `problem` entries of `details.allComponentMessages`, in order.
///
/// Missing or malformed sections yield no problems.
pub fn component_problems(details: Option<&Value>) -> Vec<String> {
    details
        .and_then(|d| d.get("allComponentMessages"))
        .and_then(Value::as_array)
        .map(|messages| {
            messages
                .iter()
                .filter_map(|message| message.get("problem"))
                .filter_map(|problem| match problem {
                    Value::Null => None,
                    Value::String(text) => Some(text.clone()),
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn done(success: bool, details: Option<Value>) -> JobStatus {
        JobStatus { id: "0Af1".into(), done: true, success, details, ..JobStatus::default() }
    }

    #[test]
    fn test_component_problems_in_order() {
        let details = json!({
            "allComponentMessages": [
                {"fullName": "Security", "problem": "Invalid ipRange"},
                {"fullName": "package.xml", "problem": null},
                {"fullName": "Quote", "problem": "Quotes not enabled"}
            ]
        });
        assert_eq!(
            component_problems(Some(&details)),
            vec!["Invalid ipRange".to_string(), "Quotes not enabled".to_string()]
        );
    }

    #[test]
    fn test_component_problems_tolerates_missing_sections() {
        assert!(component_problems(None).is_empty());
        assert!(component_problems(Some(&json!({}))).is_empty());
        assert!(component_problems(Some(&json!({"allComponentMessages": "n/a"}))).is_empty());
        assert!(component_problems(Some(&json!({"allComponentMessages": [{"fullName": "x"}]})))
            .is_empty());
    }

    #[test]
    fn test_success_without_problems() {
        let details = json!({"allComponentMessages": [{"problem": null}]});
        let result = DeployService::default().interpret(done(true, Some(details))).unwrap();
        assert!(result.success);
        assert!(result.problems.is_empty());
    }

    #[test]
    fn test_success_with_problems_fails() {
        let details = json!({
            "allComponentMessages": [{"problem": "A"}, {"problem": "B"}]
        });
        match DeployService::default().interpret(done(true, Some(details))) {
            Err(ForceError::Remote { operation, message, details, .. }) => {
                assert_eq!(operation, "deployment");
                assert_eq!(message, "A, B");
                assert!(details.is_some());
            }
            other => panic!("expected remote failure, got {:?}", other),
        }
    }

    #[test]
    fn test_remote_failure_keeps_code_and_details() {
        let status = JobStatus {
            error_status_code: Some("INVALID_CROSS_REFERENCE_KEY".into()),
            error_message: Some("No such column".into()),
            ..done(false, Some(json!({"componentFailures": []})))
        };

        match DeployService::default().interpret(status) {
            Err(ForceError::Remote { code, message, details, .. }) => {
                assert_eq!(code.as_deref(), Some("INVALID_CROSS_REFERENCE_KEY"));
                assert_eq!(message, "No such column");
                assert_eq!(details, Some(json!({"componentFailures": []})));
            }
            other => panic!("expected remote failure, got {:?}", other),
        }
    }

    #[test]
    fn test_timed_out_status_is_timeout_error() {
        let err = DeployService::default().interpret(JobStatus::timed_out("0Af1")).unwrap_err();
        assert!(matches!(err, ForceError::Timeout { .. }));
        assert!(err.is_retryable());
    }
}
