// Fixed-interval poll loop with attempt and deadline bounds
use std::future::Future;
use std::time::{Duration, Instant};

use scratchforce_domain::{ForceError, Result};
use tracing::debug;

/// What a single probe observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep<T> {
    /// Terminal state reached
    Ready(T),
    /// Not yet terminal, keep polling
    Pending,
}

/// How a poll loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Completed { value: T, attempts: u32 },
    Exhausted { attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Completed { attempts, .. } | Self::Exhausted { attempts } => *attempts,
        }
    }
}

/// Interval and bounds of a poll loop.
///
/// At least one of `max_attempts` or `deadline` must be set; an unbounded
/// policy is rejected when the loop starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    interval: Duration,
    max_attempts: Option<u32>,
    deadline: Option<Duration>,
}

impl PollPolicy {
    /// Poll every `interval`, with no bound set yet
    pub fn every(interval: Duration) -> Self {
        Self { interval, max_attempts: None, deadline: None }
    }

    /// Stop after this many probes
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Stop once this much wall-clock time has passed since the loop started.
    /// Checked after each probe, so one in-flight probe is never cut short.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Longest time the loop may wait, used when reporting a timeout.
    pub fn budget(&self) -> Duration {
        let by_attempts =
            self.max_attempts.map(|attempts| self.interval.saturating_mul(attempts));
        match (self.deadline, by_attempts) {
            (Some(deadline), Some(attempts)) => deadline.min(attempts),
            (Some(deadline), None) => deadline,
            (None, Some(attempts)) => attempts,
            (None, None) => Duration::MAX,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_attempts.is_none() && self.deadline.is_none() {
            return Err(ForceError::InvalidInput(
                "poll policy needs an attempt bound or a deadline".into(),
            ));
        }
        Ok(())
    }
}

/// Sleep one interval, probe, repeat until the probe is ready or a bound is hit.
///
/// The probe receives the 1-based attempt number. A probe error ends the
/// loop immediately and is returned unchanged; it is never retried.
pub async fn poll_until<T, F, Fut>(policy: &PollPolicy, mut probe: F) -> Result<PollOutcome<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<PollStep<T>>>,
{
    policy.validate()?;

    let started = Instant::now();
    let mut attempts = 0u32;

    loop {
        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            return Ok(PollOutcome::Exhausted { attempts });
        }

        tokio::time::sleep(policy.interval).await;
        attempts += 1;

        match probe(attempts).await? {
            PollStep::Ready(value) => return Ok(PollOutcome::Completed { value, attempts }),
            PollStep::Pending => debug!(attempt = attempts, "Still pending"),
        }

        if policy.deadline.is_some_and(|deadline| started.elapsed() >= deadline) {
            return Ok(PollOutcome::Exhausted { attempts });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast() -> PollPolicy {
        PollPolicy::every(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_completes_when_probe_is_ready() {
        let outcome = poll_until(&fast().with_max_attempts(10), |attempt| async move {
            if attempt == 3 {
                Ok(PollStep::Ready("done"))
            } else {
                Ok(PollStep::Pending)
            }
        })
        .await
        .unwrap();

        assert_eq!(outcome, PollOutcome::Completed { value: "done", attempts: 3 });
    }

    #[tokio::test]
    async fn test_exhausts_after_exact_attempts() {
        let calls = AtomicU32::new(0);
        let outcome: PollOutcome<()> = poll_until(&fast().with_max_attempts(5), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(PollStep::Pending) }
        })
        .await
        .unwrap();

        assert_eq!(outcome, PollOutcome::Exhausted { attempts: 5 });
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_probe_error_aborts_without_retry() {
        let calls = AtomicU32::new(0);
        let result: Result<PollOutcome<()>> = poll_until(&fast().with_max_attempts(5), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ForceError::Network("connection reset".into())) }
        })
        .await;

        assert!(matches!(result, Err(ForceError::Network(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_deadline_bounds_loop() {
        let policy = PollPolicy::every(Duration::from_millis(5)).with_deadline(Duration::from_millis(30));
        let outcome: PollOutcome<()> =
            poll_until(&policy, |_| async { Ok(PollStep::Pending) }).await.unwrap();

        match outcome {
            PollOutcome::Exhausted { attempts } => assert!(attempts >= 1 && attempts <= 6),
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unbounded_policy_is_rejected() {
        let result: Result<PollOutcome<()>> =
            poll_until(&fast(), |_| async { Ok(PollStep::Pending) }).await;
        assert!(matches!(result, Err(ForceError::InvalidInput(_))));
    }

    #[test]
    fn test_budget_prefers_tighter_bound() {
        let policy = PollPolicy::every(Duration::from_secs(1)).with_max_attempts(120);
        assert_eq!(policy.budget(), Duration::from_secs(120));
        assert_eq!(policy.with_deadline(Duration::from_secs(30)).budget(), Duration::from_secs(30));
    }
}
