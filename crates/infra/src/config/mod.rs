//! Configuration loading
//!
//! Loads [`ForceConfig`](scratchforce_domain::ForceConfig) from files and
//! environment variables.

pub mod loader;

pub use loader::{apply_env_overrides, load, load_from_env, load_from_file, probe_config_paths};
