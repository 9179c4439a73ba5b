//! # Scratchforce Core
//!
//! Workflow layer - no HTTP or archive code.
//!
//! This crate contains:
//! - Port interfaces for the remote platform (traits)
//! - The bounded poll loop and the asynchronous job poller
//! - Deployment and environment provisioning services
//! - Password generation and escaped query/script templates
//!
//! ## Architecture Principles
//! - Only depends on `scratchforce-domain`
//! - All remote access via [`ports::OrgApi`]
//! - Randomness is injected, never global

pub mod deploy;
pub mod password;
pub mod poll;
pub mod ports;
pub mod provisioning;
pub mod scripts;

pub use deploy::DeployService;
pub use poll::{poll_until, JobPoller, PollOutcome, PollPolicy, PollStep};
pub use ports::{EnvironmentConnector, OrgApi, SettingsPackager};
pub use provisioning::ProvisioningService;
pub use scripts::ScriptTemplate;
