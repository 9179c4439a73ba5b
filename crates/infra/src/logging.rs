//! Tracing subscriber setup for binaries and demos
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the process entry point.

use scratchforce_domain::{ForceError, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Output format of the global subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// `json` selects JSON lines, anything else the human-readable format.
    pub fn from_env_value(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Install the global subscriber, filtered by `RUST_LOG` (default `info`).
///
/// # Errors
/// Returns `ForceError::Config` if `RUST_LOG` is malformed or a global
/// subscriber is already installed.
pub fn init_logging(format: LogFormat) -> Result<()> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => EnvFilter::try_new(directives)
            .map_err(|e| ForceError::Config(format!("Invalid log filter: {}", e)))?,
        Err(_) => EnvFilter::new(DEFAULT_FILTER),
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|e| ForceError::Config(format!("Failed to install subscriber: {}", e)))
}
