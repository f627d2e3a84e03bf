//! Page Object Model Support
//!
//! A page object is a named bundle of actions for one UI surface. Actions
//! are composed from [`PageContext`] steps, each of which locates its
//! element afresh, performs one driver call and returns before the next
//! step starts.
//!
//! # Example
//!
//! ```ignore
//! struct LoginPage<D: ?Sized> {
//!     ctx: PageContext<D>,
//! }
//!
//! impl<D: UiDriver + ?Sized> LoginPage<D> {
//!     pub async fn login(&self, user: &str, password: &str) -> HarnessResult<()> {
//!         self.ctx.goto("/login").await?;
//!         self.ctx.type_into(&Selector::model("login.username"), user).await?;
//!         self.ctx.type_into(&Selector::model("login.password"), password).await?;
//!         self.ctx.click(&Selector::id("login-button")).await
//!     }
//! }
//! ```

use crate::capability::UploadStrategy;
use crate::config::HarnessConfig;
use crate::driver::{ElementHandle, UiDriver};
use crate::fixture::FixtureResolver;
use crate::result::HarnessResult;
use crate::selector::Selector;
use crate::wait::{self, WaitOptions, WaitResult};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Trait for page objects representing a page or role in the UI.
pub trait PageObject {
    /// Path the page's workflows start from
    fn entry_path(&self) -> &str;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared plumbing of every page object: the injected driver, the session
/// configuration and the upload strategy chosen for the session.
pub struct PageContext<D: ?Sized> {
    driver: Arc<D>,
    config: Arc<HarnessConfig>,
    fixtures: FixtureResolver,
    strategy: UploadStrategy,
}

impl<D: ?Sized> Clone for PageContext<D> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            config: Arc::clone(&self.config),
            fixtures: self.fixtures.clone(),
            strategy: self.strategy,
        }
    }
}

impl<D: ?Sized> fmt::Debug for PageContext<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageContext")
            .field("base_url", &self.config.base_url)
            .field("fixtures", &self.fixtures.root())
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl<D: UiDriver + ?Sized> PageContext<D> {
    /// Build a context over a shared driver
    #[must_use]
    pub fn new(driver: Arc<D>, config: Arc<HarnessConfig>, strategy: UploadStrategy) -> Self {
        let fixtures = FixtureResolver::new(config.fixtures_dir.clone());
        Self {
            driver,
            config,
            fixtures,
            strategy,
        }
    }

    /// Injected driver
    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Session configuration
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Fixture resolver
    #[must_use]
    pub const fn fixtures(&self) -> &FixtureResolver {
        &self.fixtures
    }

    /// Upload strategy chosen for the session
    #[must_use]
    pub const fn strategy(&self) -> UploadStrategy {
        self.strategy
    }

    /// Bounded-wait options of the session
    #[must_use]
    pub fn wait_options(&self) -> WaitOptions {
        self.config.wait_options()
    }

    /// Lazy handle bound to the current page
    #[must_use]
    pub fn locate(&self, selector: &Selector) -> ElementHandle {
        self.driver.locate(selector)
    }

    /// Navigate to a path
    pub async fn goto(&self, path: &str) -> HarnessResult<()> {
        debug!(path, "goto");
        self.driver.navigate(path).await
    }

    /// Click the first match of `selector`
    pub async fn click(&self, selector: &Selector) -> HarnessResult<()> {
        debug!(%selector, "click");
        self.driver.click(&self.locate(selector)).await
    }

    /// Type `text` into the first match of `selector`
    pub async fn type_into(&self, selector: &Selector, text: &str) -> HarnessResult<()> {
        debug!(%selector, chars = text.chars().count(), "type");
        self.driver.type_text(&self.locate(selector), text).await
    }

    /// Clear the first match of `selector`
    pub async fn clear(&self, selector: &Selector) -> HarnessResult<()> {
        debug!(%selector, "clear");
        self.driver.clear(&self.locate(selector)).await
    }

    /// Read the text of the first match of `selector`
    pub async fn read_text(&self, selector: &Selector) -> HarnessResult<String> {
        debug!(%selector, "read text");
        self.driver.read_text(&self.locate(selector)).await
    }

    /// Select `path` on the file input matched by `selector`
    pub async fn upload(&self, selector: &Selector, path: &Path) -> HarnessResult<()> {
        debug!(%selector, path = %path.display(), "upload");
        self.driver.upload_file(&self.locate(selector), path).await
    }

    /// Wait until `selector` is present
    pub async fn wait_present(&self, selector: &Selector) -> HarnessResult<WaitResult> {
        wait::wait_until_present(self.driver(), selector, &self.wait_options()).await
    }

    /// Wait until `selector` renders non-empty text
    pub async fn wait_text(&self, selector: &Selector) -> HarnessResult<WaitResult> {
        wait::wait_until_text(self.driver(), selector, &self.wait_options()).await
    }

    /// Wait, under one deadline, until the optional flag holds and
    /// `button` is clickable
    pub async fn wait_ready(
        &self,
        flag: Option<(&Selector, &str)>,
        button: &Selector,
    ) -> HarnessResult<WaitResult> {
        wait::wait_until_ready(self.driver(), flag, button, &self.wait_options()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverCall, MockDriver, MockElement};

    fn context(driver: MockDriver) -> (Arc<MockDriver>, PageContext<MockDriver>) {
        let driver = Arc::new(driver);
        let ctx = PageContext::new(
            Arc::clone(&driver),
            Arc::new(HarnessConfig::default().with_fixtures_dir("/fixtures")),
            UploadStrategy::SimulatedPathUpload,
        );
        (driver, ctx)
    }

    #[derive(Debug)]
    struct StatusPage;

    impl PageObject for StatusPage {
        fn entry_path(&self) -> &str {
            "/status"
        }
    }

    #[test]
    fn test_page_name_defaults_to_type() {
        assert!(StatusPage.page_name().contains("StatusPage"));
        assert_eq!(StatusPage.entry_path(), "/status");
    }

    #[test]
    fn test_context_accessors() {
        let (_, ctx) = context(MockDriver::new());
        assert_eq!(ctx.fixtures().root(), Path::new("/fixtures"));
        assert_eq!(ctx.strategy(), UploadStrategy::SimulatedPathUpload);
        assert_eq!(ctx.wait_options(), HarnessConfig::default().wait_options());
        assert!(format!("{ctx:?}").contains("PageContext"));
    }

    #[tokio::test]
    async fn test_steps_relocate_after_navigation() {
        let sel = Selector::id("tip-0");
        let (driver, ctx) = context(MockDriver::new().with_element(sel.clone(), MockElement::button()));
        ctx.click(&sel).await.unwrap();
        ctx.goto("/recipient/reports").await.unwrap();
        ctx.click(&sel).await.unwrap();
        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::Click("#tip-0".into()),
                DriverCall::Navigate("/recipient/reports".into()),
                DriverCall::Click("#tip-0".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_clone_shares_driver() {
        let sel = Selector::id("tip-0");
        let (driver, ctx) = context(MockDriver::new().with_element(sel.clone(), MockElement::button()));
        let other = ctx.clone();
        other.click(&sel).await.unwrap();
        assert_eq!(driver.click_count(&sel), 1);
    }
}
