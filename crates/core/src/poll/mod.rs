//! Bounded polling of remote state
//!
//! [`poll_until`] is the single loop behind both long-running workflows.
//! [`JobPoller`] layers the submit-then-poll protocol of asynchronous jobs
//! on top of it.

pub mod job;
pub mod poller;

pub use job::JobPoller;
pub use poller::{poll_until, PollOutcome, PollPolicy, PollStep};
