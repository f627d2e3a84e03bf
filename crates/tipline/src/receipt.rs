//! Submission receipt codes.

use crate::result::{HarnessError, HarnessResult};
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Receipt shown to a whistleblower after a successful submission.
///
/// Whitespace used for display grouping is removed; the code is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReceiptCode(String);

impl ReceiptCode {
    /// Normalise `raw` and check it against `format`
    ///
    /// # Errors
    ///
    /// [`HarnessError::AssertionFailed`] when the code is empty or does not
    /// match the expected format.
    pub fn parse(raw: &str, format: &Regex) -> HarnessResult<Self> {
        let code: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if code.is_empty() {
            return Err(HarnessError::AssertionFailed {
                message: "receipt code is empty".to_string(),
            });
        }
        if !format.is_match(&code) {
            return Err(HarnessError::AssertionFailed {
                message: format!("receipt code {code:?} does not match {}", format.as_str()),
            });
        }
        Ok(Self(code))
    }

    /// Normalised code
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the normalised code
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ReceiptCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReceiptCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compile a receipt pattern
pub fn receipt_format(pattern: &str) -> HarnessResult<Regex> {
    Regex::new(pattern).map_err(|e| HarnessError::Config {
        message: format!("invalid receipt pattern {pattern:?}: {e}"),
    })
}
