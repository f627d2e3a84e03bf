//! Structured logging setup.
//!
//! Page objects emit `tracing` events; a test binary installs a subscriber
//! once with [`init_logging`]. `RUST_LOG` overrides the configured level.

use crate::result::{HarnessError, HarnessResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// JSON lines, one event per line
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

fn build_filter(level: &str) -> HarnessResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).map_err(|e| HarnessError::Config {
            message: format!("invalid log level {level:?}: {e}"),
        }),
    }
}

/// Install the global subscriber
///
/// # Errors
///
/// Returns an error for an invalid level or when a global subscriber is
/// already installed.
pub fn init_logging(config: &LogConfig) -> HarnessResult<()> {
    let filter = build_filter(&config.level)?;
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .flatten_event(true),
            )
            .try_init(),
    };
    installed.map_err(|e| HarnessError::Config {
        message: format!("logging already initialised: {e}"),
    })
}
