//! Harness configuration.
//!
//! Loaded from YAML, overridden by `TIPLINE_*` environment variables, or
//! assembled with builder methods. Every field has a default, so an empty
//! document is a valid configuration.

use crate::form::FormLayout;
use crate::logging::LogConfig;
use crate::result::{HarnessError, HarnessResult};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the system under test
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8082";

/// Default receipt format: sixteen digits once whitespace is removed
pub const DEFAULT_RECEIPT_PATTERN: &str = r"^[0-9]{16}$";

/// Default proof-of-work readiness expression, evaluated on the submission form
pub const DEFAULT_PROOF_OF_WORK_EXPR: &str =
    "angular.element(this).scope().submission.pow === true";

/// Environment variable overriding [`HarnessConfig::base_url`]
pub const ENV_BASE_URL: &str = "TIPLINE_BASE_URL";
/// Environment variable overriding [`HarnessConfig::browser`]
pub const ENV_BROWSER: &str = "TIPLINE_BROWSER";
/// Environment variable overriding [`HarnessConfig::file_upload`]
pub const ENV_FILE_UPLOAD: &str = "TIPLINE_FILE_UPLOAD";
/// Environment variable overriding [`HarnessConfig::wait_timeout_ms`]
pub const ENV_WAIT_TIMEOUT_MS: &str = "TIPLINE_WAIT_TIMEOUT_MS";
/// Environment variable overriding [`HarnessConfig::fixtures_dir`]
pub const ENV_FIXTURES_DIR: &str = "TIPLINE_FIXTURES_DIR";

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Base URL relative navigations are joined to
    pub base_url: String,
    /// Directory holding test fixture files
    pub fixtures_dir: PathBuf,
    /// Timeout for every bounded wait
    pub wait_timeout_ms: u64,
    /// Polling interval of bounded waits
    pub poll_interval_ms: u64,
    /// Browser name reported by the execution environment
    pub browser: Option<String>,
    /// Explicit file-upload capability, wins over browser detection
    pub file_upload: Option<bool>,
    /// Fixture names attached during a submission
    pub attachments: Vec<String>,
    /// Text typed into the submission body field
    pub submission_body: String,
    /// Regular expression a receipt must match (whitespace removed)
    pub receipt_pattern: String,
    /// Readiness expression evaluated on the submission form, if any
    pub proof_of_work_expr: Option<String>,
    /// Named addressing of the submission form
    pub form: FormLayout,
    /// Logging setup, installed by [`Harness::init_logging`](crate::Harness::init_logging)
    /// or by passing it to [`init_logging`](crate::logging::init_logging)
    pub log: LogConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            fixtures_dir: PathBuf::from("tests/files"),
            wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            browser: None,
            file_upload: None,
            attachments: vec!["antani.txt".to_string(), "unknown.filetype".to_string()],
            submission_body: "x y z".to_string(),
            receipt_pattern: DEFAULT_RECEIPT_PATTERN.to_string(),
            proof_of_work_expr: Some(DEFAULT_PROOF_OF_WORK_EXPR.to_string()),
            form: FormLayout::default(),
            log: LogConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> HarnessResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> HarnessResult<Self> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&yaml)
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> HarnessResult<Self> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `TIPLINE_*` overrides read through `lookup`
    pub fn with_env_overrides<F>(mut self, lookup: F) -> HarnessResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(browser) = lookup(ENV_BROWSER) {
            self.browser = Some(browser);
        }
        if let Some(dir) = lookup(ENV_FIXTURES_DIR) {
            self.fixtures_dir = PathBuf::from(dir);
        }
        if let Some(flag) = lookup(ENV_FILE_UPLOAD) {
            self.file_upload = Some(parse_flag(ENV_FILE_UPLOAD, &flag)?);
        }
        if let Some(ms) = lookup(ENV_WAIT_TIMEOUT_MS) {
            self.wait_timeout_ms = ms.trim().parse().map_err(|_| HarnessError::Config {
                message: format!("{ENV_WAIT_TIMEOUT_MS} must be milliseconds, got {ms:?}"),
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject values no run can succeed with
    pub fn validate(&self) -> HarnessResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(HarnessError::Config {
                message: "base_url is empty".to_string(),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(HarnessError::Config {
                message: "poll_interval_ms must be positive".to_string(),
            });
        }
        if self.poll_interval_ms > self.wait_timeout_ms {
            return Err(HarnessError::Config {
                message: format!(
                    "poll_interval_ms ({}) exceeds wait_timeout_ms ({})",
                    self.poll_interval_ms, self.wait_timeout_ms
                ),
            });
        }
        Ok(())
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set fixtures directory
    #[must_use]
    pub fn with_fixtures_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixtures_dir = dir.into();
        self
    }

    /// Set wait timeout
    #[must_use]
    pub const fn with_wait_timeout(mut self, timeout_ms: u64) -> Self {
        self.wait_timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Set browser name
    #[must_use]
    pub fn with_browser(mut self, browser: impl Into<String>) -> Self {
        self.browser = Some(browser.into());
        self
    }

    /// Force the file-upload capability
    #[must_use]
    pub const fn with_file_upload(mut self, supported: bool) -> Self {
        self.file_upload = Some(supported);
        self
    }

    /// Disable the proof-of-work readiness check
    #[must_use]
    pub fn without_proof_of_work(mut self) -> Self {
        self.proof_of_work_expr = None;
        self
    }

    /// Wait options derived from this config
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.wait_timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
    }
}

fn parse_flag(key: &str, raw: &str) -> HarnessResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(HarnessError::Config {
            message: format!("{key} must be a boolean, got {other:?}"),
        }),
    }
}
