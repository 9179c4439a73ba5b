//! Ephemeral environment provisioning

pub mod service;

pub use service::ProvisioningService;
