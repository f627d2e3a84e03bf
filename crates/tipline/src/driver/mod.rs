//! UiDriver - Abstract UI Automation Trait
//!
//! Page objects never talk to a browser directly. They compose calls on a
//! [`UiDriver`], injected at construction, so the same workflows run
//! against a scripted [`MockDriver`] in unit tests and against a real
//! browser (`ChromiumDriver`, feature `browser`) in end-to-end runs.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────────────────┐
//! │  Scenario    │────►│  Page Object │────►│  UiDriver                │
//! │  (caller)    │     │  action      │     │  MockDriver | Chromium   │
//! └──────────────┘     └──────────────┘     └──────────────────────────┘
//! ```
//!
//! # Handle lifetime
//!
//! Every driver keeps a navigation *epoch*. [`UiDriver::locate`] binds the
//! current epoch into the handle without touching the page; a handle used
//! after a navigation is stale and fails with an interaction error.

mod mock;

#[cfg(feature = "browser")]
mod chromium;

pub use mock::{DriverCall, ElementKind, MockDriver, MockElement};

#[cfg(feature = "browser")]
pub use chromium::{BrowserSettings, ChromiumDriver};

use crate::result::{HarnessError, HarnessResult};
use crate::selector::Selector;
use async_trait::async_trait;
use std::path::Path;

/// Transient reference to an element.
///
/// Resolution is lazy: creating a handle never fails. The selector is
/// resolved again on every interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    selector: Selector,
    epoch: u64,
}

impl ElementHandle {
    /// Bind a selector to a navigation epoch
    #[must_use]
    pub const fn new(selector: Selector, epoch: u64) -> Self {
        Self { selector, epoch }
    }

    /// Selector this handle resolves
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Navigation epoch the handle was created in
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Fail if a navigation happened since this handle was created
    pub fn ensure_fresh(&self, current_epoch: u64) -> HarnessResult<()> {
        if self.epoch == current_epoch {
            Ok(())
        } else {
            Err(HarnessError::interaction(
                &self.selector,
                format!(
                    "stale handle (created in epoch {}, page is at epoch {current_epoch})",
                    self.epoch
                ),
            ))
        }
    }
}

/// Abstract driver trait for UI automation
///
/// All interactions take `&self`: one browser session is shared by every
/// page object of a harness, so implementations use interior mutability.
///
/// # Implementations
///
/// - [`MockDriver`] - scripted in-memory page, records a call trace
/// - `ChromiumDriver` - CDP via chromiumoxide (feature `browser`)
#[async_trait]
pub trait UiDriver: Send + Sync {
    /// Current navigation epoch
    fn epoch(&self) -> u64;

    /// Bind a selector to the current epoch without resolving it
    fn locate(&self, selector: &Selector) -> ElementHandle {
        ElementHandle::new(selector.clone(), self.epoch())
    }

    /// Navigate to a path or URL; invalidates every handle
    async fn navigate(&self, path: &str) -> HarnessResult<()>;

    /// Click element
    async fn click(&self, handle: &ElementHandle) -> HarnessResult<()>;

    /// Type text into an editable element, appending to its value
    async fn type_text(&self, handle: &ElementHandle, text: &str) -> HarnessResult<()>;

    /// Clear an editable element
    async fn clear(&self, handle: &ElementHandle) -> HarnessResult<()>;

    /// Read the rendered text of an element
    async fn read_text(&self, handle: &ElementHandle) -> HarnessResult<String>;

    /// Select a file on a file input.
    ///
    /// Disabled inputs are rejected. Hidden inputs are accepted, since
    /// styled upload widgets keep the real input out of view.
    async fn upload_file(&self, handle: &ElementHandle, path: &Path) -> HarnessResult<()>;

    /// Whether the selector currently resolves to an element
    async fn is_present(&self, handle: &ElementHandle) -> HarnessResult<bool>;

    /// Whether the element is present, visible and enabled
    async fn is_clickable(&self, handle: &ElementHandle) -> HarnessResult<bool>;

    /// Evaluate a JavaScript expression with `this` bound to the element.
    ///
    /// An expression that throws yields `null`, so readiness flags read
    /// from a page that is still bootstrapping count as not set.
    async fn evaluate(
        &self,
        handle: &ElementHandle,
        expression: &str,
    ) -> HarnessResult<serde_json::Value>;
}
