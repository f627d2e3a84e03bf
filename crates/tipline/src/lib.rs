//! Tipline: Page-Object Harness for Whistleblowing-Platform E2E Tests
//!
//! Scenario scripts drive the web client through page objects; page objects
//! drive a browser through the [`UiDriver`] trait and never touch a browser
//! API themselves.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    TIPLINE Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌──────────────┐    ┌──────────────────┐    │
//! │   │ Scenario   │    │ Harness      │    │ UiDriver         │    │
//! │   │ (test fn)  │───►│ ReceiverPage │───►│ MockDriver       │    │
//! │   │            │    │ Whistleblower│    │ ChromiumDriver   │    │
//! │   └────────────┘    └──────────────┘    └──────────────────┘    │
//! │                            │                                    │
//! │                  Capabilities → UploadStrategy                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tipline::{Harness, HarnessConfig, MockDriver};
//!
//! # async fn run() -> tipline::HarnessResult<()> {
//! let harness = Harness::new(Arc::new(MockDriver::new()), HarnessConfig::from_env()?)?;
//! let receipt = harness.whistleblower().perform_submission("Report A", true).await?;
//! println!("receipt {receipt}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Environment capabilities and the upload strategy derived from them
pub mod capability;

/// Harness configuration (YAML, environment, builders)
pub mod config;

/// UI-automation driver trait and implementations
#[allow(clippy::missing_errors_doc)]
pub mod driver;

/// Test fixture file resolution
#[allow(clippy::missing_errors_doc)]
pub mod fixture;

/// Named addressing of questionnaire fields
#[allow(clippy::missing_errors_doc)]
pub mod form;

mod harness;

/// Structured logging setup
pub mod logging;

/// Page-object trait and shared action plumbing
#[allow(clippy::missing_errors_doc)]
pub mod page_object;

/// Recipient and whistleblower page objects
pub mod pages;

/// Receipt codes
#[allow(clippy::missing_errors_doc)]
pub mod receipt;

mod result;

/// Element selectors
pub mod selector;

/// Bounded polling waits
#[allow(clippy::missing_errors_doc)]
pub mod wait;

pub use capability::{Capabilities, CapabilityStatus, UploadStrategy};
pub use config::HarnessConfig;
#[cfg(feature = "browser")]
pub use driver::{BrowserSettings, ChromiumDriver};
pub use driver::{DriverCall, ElementHandle, ElementKind, MockDriver, MockElement, UiDriver};
pub use fixture::FixtureResolver;
pub use form::{FieldPath, FormLayout};
pub use harness::Harness;
pub use logging::{init_logging, LogConfig, LogFormat};
pub use page_object::{PageContext, PageObject};
pub use pages::{ReceiverPage, WhistleblowerPage};
pub use receipt::ReceiptCode;
pub use result::{HarnessError, HarnessResult};
pub use selector::Selector;
pub use wait::{wait_until, WaitOptions, WaitResult};
