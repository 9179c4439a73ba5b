//! # Scratchforce Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The REST session implementing `OrgApi`
//! - The authorization-code connector for new environments
//! - Zip and XML packaging of environment settings
//! - Configuration loading and logging setup
//!
//! ## Architecture
//! - Implements traits defined in `scratchforce-core`
//! - Contains all "impure" code (HTTP, archives, files, environment)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod logging;
pub mod metadata;

// Re-export commonly used items
pub use api::{AuthCodeConnector, Session};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use logging::{init_logging, LogFormat};
pub use metadata::SettingsArchivePackager;
