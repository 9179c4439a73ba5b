//! # Scratchforce Domain
//!
//! Business domain types and models for Scratchforce.
//!
//! This crate contains:
//! - Remote job, query and script result types
//! - Environment provisioning types
//! - Domain error types and Result definitions
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other Scratchforce crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
