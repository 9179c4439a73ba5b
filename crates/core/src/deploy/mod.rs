//! Metadata deployment workflow

pub mod service;

pub use service::{component_problems, DeployService};
