//! Result and error types for Tipline.

use thiserror::Error;

/// Result type for Tipline operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that can occur while driving a page object.
///
/// None of these are retried inside the harness. A scenario sees the first
/// one raised and treats it as a hard failure.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Selector resolved to nothing at interaction time
    #[error("No element matches {selector}")]
    LocatorFailure {
        /// Rendered selector
        selector: String,
    },

    /// Element exists but the action cannot be performed on it
    #[error("Cannot interact with {selector}: {message}")]
    Interaction {
        /// Rendered selector
        selector: String,
        /// Error message
        message: String,
    },

    /// A bounded wait exceeded its deadline
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Description of the awaited condition
        waited_for: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Field path not declared in the form layout
    #[error("Unknown form field: {path}")]
    UnknownField {
        /// Rendered field path
        path: String,
    },

    /// Invalid harness configuration
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Browser backend or transport failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl HarnessError {
    /// Build a locator failure for a selector
    pub fn locator(selector: impl ToString) -> Self {
        Self::LocatorFailure {
            selector: selector.to_string(),
        }
    }

    /// Build an interaction error for a selector
    pub fn interaction(selector: impl ToString, message: impl Into<String>) -> Self {
        Self::Interaction {
            selector: selector.to_string(),
            message: message.into(),
        }
    }

    /// Build a driver error
    pub fn driver(message: impl ToString) -> Self {
        Self::Driver {
            message: message.to_string(),
        }
    }

    /// Whether this is a wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this is a locator failure
    #[must_use]
    pub const fn is_locator_failure(&self) -> bool {
        matches!(self, Self::LocatorFailure { .. })
    }

    /// Whether this is an interaction error
    #[must_use]
    pub const fn is_interaction(&self) -> bool {
        matches!(self, Self::Interaction { .. })
    }
}
