// Submit-then-poll protocol for asynchronous remote jobs
use std::future::Future;
use std::time::Duration;

use scratchforce_domain::{DeployConfig, JobId, JobStatus, Result};
use tracing::{debug, warn};

use super::poller::{poll_until, PollOutcome, PollPolicy, PollStep};

/// Drives one asynchronous job from submission to a terminal status
#[derive(Debug, Clone, Copy)]
pub struct JobPoller {
    policy: PollPolicy,
}

impl Default for JobPoller {
    fn default() -> Self {
        Self::from_config(&DeployConfig::default())
    }
}

impl JobPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    /// `max_attempts == 0` means no attempt bound; the deadline alone applies.
    pub fn from_config(config: &DeployConfig) -> Self {
        let mut policy = PollPolicy::every(config.poll_interval());
        if config.max_attempts > 0 {
            policy = policy.with_max_attempts(config.max_attempts);
        }
        if let Some(deadline) = config.deadline() {
            policy = policy.with_deadline(deadline);
        }
        Self { policy }
    }

    /// Longest the poller waits before synthesizing a timeout.
    pub fn budget(&self) -> Duration {
        self.policy.budget()
    }

    /// Submit once, then fetch the status until it reports `done`.
    ///
    /// A status that is already `done` on submission is returned without a
    /// single fetch. When the bounds run out, a terminal failure with
    /// `timed_out` set is returned instead of an error. Submit and fetch
    /// errors propagate unchanged.
    pub async fn run<S, F, Fut>(&self, submit: S, mut fetch: F) -> Result<JobStatus>
    where
        S: Future<Output = Result<JobStatus>>,
        F: FnMut(JobId) -> Fut,
        Fut: Future<Output = Result<JobStatus>>,
    {
        let initial = submit.await?;
        let job_id = initial.job_id();
        if initial.done {
            debug!(job_id = %job_id, "Job finished on submission");
            return Ok(initial);
        }

        let outcome = poll_until(&self.policy, |attempt| {
            let status = fetch(job_id.clone());
            async move {
                let status = status.await?;
                debug!(attempt, done = status.done, state = ?status.status, "Polled job status");
                Ok(if status.done { PollStep::Ready(status) } else { PollStep::Pending })
            }
        })
        .await?;

        match outcome {
            PollOutcome::Completed { value, .. } => Ok(value),
            PollOutcome::Exhausted { attempts } => {
                warn!(job_id = %job_id, attempts, "Gave up waiting for job");
                Ok(JobStatus::timed_out(job_id.as_str()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use scratchforce_domain::constants::DEPLOY_TIMEOUT_MESSAGE;
    use scratchforce_domain::ForceError;

    use super::*;

    fn poller(max_attempts: u32) -> JobPoller {
        JobPoller::new(PollPolicy::every(Duration::from_millis(1)).with_max_attempts(max_attempts))
    }

    fn pending(id: &str) -> JobStatus {
        JobStatus { id: id.into(), status: Some("InProgress".into()), ..JobStatus::default() }
    }

    fn finished(id: &str) -> JobStatus {
        JobStatus { id: id.into(), done: true, success: true, ..JobStatus::default() }
    }

    #[tokio::test]
    async fn test_done_on_submit_skips_polling() {
        let fetches = AtomicU32::new(0);
        let status = poller(5)
            .run(async { Ok(finished("0Af1")) }, |_| {
                fetches.fetch_add(1, Ordering::SeqCst);
                async { Ok(finished("0Af1")) }
            })
            .await
            .unwrap();

        assert!(status.done);
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_polls_until_done() {
        let fetches = AtomicU32::new(0);
        let status = poller(10)
            .run(async { Ok(pending("0Af1")) }, |id| {
                let n = fetches.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    assert_eq!(id.as_str(), "0Af1");
                    Ok(if n == 3 { finished("0Af1") } else { pending("0Af1") })
                }
            })
            .await
            .unwrap();

        assert!(status.success);
        assert_eq!(fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_synthesizes_timeout_after_exact_fetches() {
        let fetches = AtomicU32::new(0);
        let status = poller(4)
            .run(async { Ok(pending("0Af1")) }, |_| {
                fetches.fetch_add(1, Ordering::SeqCst);
                async { Ok(pending("0Af1")) }
            })
            .await
            .unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 4);
        assert!(status.done);
        assert!(!status.success);
        assert!(status.timed_out);
        assert_eq!(status.id, "0Af1");
        assert_eq!(status.error_message.as_deref(), Some(DEPLOY_TIMEOUT_MESSAGE));
    }

    #[tokio::test]
    async fn test_submit_error_propagates() {
        let result = poller(4)
            .run(async { Err(ForceError::Network("refused".into())) }, |_| async {
                Ok(pending("0Af1"))
            })
            .await;
        assert!(matches!(result, Err(ForceError::Network(_))));
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let result = poller(4)
            .run(async { Ok(pending("0Af1")) }, |_| async {
                Err(ForceError::Auth("session expired".into()))
            })
            .await;
        assert!(matches!(result, Err(ForceError::Auth(_))));
    }

    #[tokio::test]
    async fn test_deadline_only_config_still_fetches_status() {
        let config = DeployConfig { poll_interval_ms: 1, max_attempts: 0, deadline_secs: Some(60) };
        let fetches = AtomicU32::new(0);
        let status = JobPoller::from_config(&config)
            .run(async { Ok(pending("0Af1")) }, |_| {
                fetches.fetch_add(1, Ordering::SeqCst);
                async { Ok(finished("0Af1")) }
            })
            .await
            .unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(status.success);
        assert!(!status.timed_out);
        assert_eq!(JobPoller::from_config(&config).budget(), Duration::from_secs(60));
    }

    #[test]
    fn test_default_budget() {
        assert_eq!(JobPoller::default().budget(), Duration::from_secs(120));
    }
}
