//! Execution-environment capabilities.
//!
//! Some browsers cannot have a file chosen on an `<input type="file">` by
//! automation. The harness learns this once per session and turns it into
//! an [`UploadStrategy`], which page objects consult instead of probing
//! the environment themselves.

use crate::config::HarnessConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Browsers whose automation cannot simulate a file selection
const NO_FILE_UPLOAD_BROWSERS: &[&str] = &["safari", "internet explorer", "ie", "microsoftedge"];

/// Capability check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityStatus {
    /// Capability is available
    Available,
    /// Capability is unavailable with reason
    Unavailable(String),
}

impl CapabilityStatus {
    /// Whether the capability is available
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl fmt::Display for CapabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => f.write_str("available"),
            Self::Unavailable(reason) => write!(f, "unavailable ({reason})"),
        }
    }
}

/// Facts about what the current execution environment supports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Browser name, if the environment reported one
    pub browser: Option<String>,
    /// Whether a real file selection can be simulated
    pub file_upload: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::full_support()
    }
}

impl Capabilities {
    /// Environment supporting every automation operation
    #[must_use]
    pub const fn full_support() -> Self {
        Self {
            browser: None,
            file_upload: true,
        }
    }

    /// Environment unable to simulate file selection
    #[must_use]
    pub const fn without_file_upload() -> Self {
        Self {
            browser: None,
            file_upload: false,
        }
    }

    /// Capabilities implied by a browser name
    #[must_use]
    pub fn for_browser(name: &str) -> Self {
        let normalized = name.trim().to_ascii_lowercase();
        Self {
            file_upload: !NO_FILE_UPLOAD_BROWSERS.contains(&normalized.as_str()),
            browser: Some(normalized),
        }
    }

    /// Detect from configuration; an explicit `file_upload` wins over the
    /// browser name
    #[must_use]
    pub fn detect(config: &HarnessConfig) -> Self {
        let mut caps = config
            .browser
            .as_deref()
            .map_or_else(Self::full_support, Self::for_browser);
        if let Some(flag) = config.file_upload {
            caps.file_upload = flag;
        }
        caps
    }

    /// File-upload status with a reason when unavailable
    #[must_use]
    pub fn file_upload_status(&self) -> CapabilityStatus {
        if self.file_upload {
            CapabilityStatus::Available
        } else {
            CapabilityStatus::Unavailable(format!(
                "{} cannot simulate file selection",
                self.browser.as_deref().unwrap_or("this environment")
            ))
        }
    }
}

/// How key material and attachments reach the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadStrategy {
    /// Hand file paths to the file input
    SimulatedPathUpload,
    /// Read files locally and type their text into the page
    DirectTextInjection,
}

impl UploadStrategy {
    /// Strategy for the given capabilities
    #[must_use]
    pub const fn for_capabilities(caps: &Capabilities) -> Self {
        if caps.file_upload {
            Self::SimulatedPathUpload
        } else {
            Self::DirectTextInjection
        }
    }

    /// Whether real attachments can be uploaded
    #[must_use]
    pub const fn allows_attachments(self) -> bool {
        matches!(self, Self::SimulatedPathUpload)
    }
}

impl fmt::Display for UploadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SimulatedPathUpload => write!(f, "simulated-path-upload"),
            Self::DirectTextInjection => write!(f, "direct-text-injection"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod capabilities_tests {
        use super::*;

        #[test]
        fn test_default_supports_upload() {
            assert!(Capabilities::default().file_upload);
            assert!(Capabilities::detect(&HarnessConfig::default()).file_upload);
        }

        #[test]
        fn test_browser_detection() {
            assert!(Capabilities::for_browser("chrome").file_upload);
            assert!(Capabilities::for_browser("firefox").file_upload);
            assert!(!Capabilities::for_browser("Safari").file_upload);
            assert!(!Capabilities::for_browser("MicrosoftEdge").file_upload);
            assert_eq!(
                Capabilities::for_browser(" Safari ").browser.as_deref(),
                Some("safari")
            );
        }

        #[test]
        fn test_explicit_flag_wins() {
            let config = HarnessConfig::default()
                .with_browser("safari")
                .with_file_upload(true);
            assert!(Capabilities::detect(&config).file_upload);

            let config = HarnessConfig::default()
                .with_browser("chrome")
                .with_file_upload(false);
            assert!(!Capabilities::detect(&config).file_upload);
        }

        #[test]
        fn test_status_reason() {
            let status = Capabilities::for_browser("safari").file_upload_status();
            assert_eq!(
                status,
                CapabilityStatus::Unavailable("safari cannot simulate file selection".into())
            );
            assert!(Capabilities::full_support()
                .file_upload_status()
                .is_available());
        }

        #[test]
        fn test_status_display() {
            assert_eq!(CapabilityStatus::Available.to_string(), "available");
            assert_eq!(
                Capabilities::without_file_upload().file_upload_status().to_string(),
                "unavailable (this environment cannot simulate file selection)"
            );
        }
    }

    mod strategy_tests {
        use super::*;

        #[test]
        fn test_strategy_selection() {
            assert_eq!(
                UploadStrategy::for_capabilities(&Capabilities::full_support()),
                UploadStrategy::SimulatedPathUpload
            );
            assert_eq!(
                UploadStrategy::for_capabilities(&Capabilities::without_file_upload()),
                UploadStrategy::DirectTextInjection
            );
        }

        #[test]
        fn test_allows_attachments() {
            assert!(UploadStrategy::SimulatedPathUpload.allows_attachments());
            assert!(!UploadStrategy::DirectTextInjection.allows_attachments());
        }

        #[test]
        fn test_display() {
            assert_eq!(
                UploadStrategy::DirectTextInjection.to_string(),
                "direct-text-injection"
            );
        }
    }
}
