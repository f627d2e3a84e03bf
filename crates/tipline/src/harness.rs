//! Test-session harness.
//!
//! One [`Harness`] per browser session. Construction detects what the
//! environment supports, fixes the upload strategy for the whole session
//! and builds the page objects, which scenarios then borrow.

use crate::capability::{Capabilities, CapabilityStatus, UploadStrategy};
use crate::config::HarnessConfig;
use crate::driver::UiDriver;
use crate::fixture::FixtureResolver;
use crate::logging;
use crate::page_object::PageContext;
use crate::pages::{ReceiverPage, WhistleblowerPage};
use crate::result::HarnessResult;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Page objects and session facts over one shared driver
pub struct Harness<D: ?Sized> {
    session_id: Uuid,
    config: Arc<HarnessConfig>,
    capabilities: Capabilities,
    strategy: UploadStrategy,
    fixtures: FixtureResolver,
    receiver: ReceiverPage<D>,
    whistleblower: WhistleblowerPage<D>,
}

impl<D: ?Sized> fmt::Debug for Harness<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field("session_id", &self.session_id)
            .field("capabilities", &self.capabilities)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl<D: UiDriver + ?Sized> Harness<D> {
    /// Harness with capabilities detected from `config`
    ///
    /// # Errors
    ///
    /// [`HarnessError::Config`](crate::HarnessError::Config) for an invalid
    /// configuration or receipt pattern.
    pub fn new(driver: Arc<D>, config: HarnessConfig) -> HarnessResult<Self> {
        let capabilities = Capabilities::detect(&config);
        Self::with_capabilities(driver, config, capabilities)
    }

    /// Harness with explicit capabilities
    ///
    /// # Errors
    ///
    /// [`HarnessError::Config`](crate::HarnessError::Config) for an invalid
    /// configuration or receipt pattern.
    pub fn with_capabilities(
        driver: Arc<D>,
        config: HarnessConfig,
        capabilities: Capabilities,
    ) -> HarnessResult<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let strategy = UploadStrategy::for_capabilities(&capabilities);
        let ctx = PageContext::new(driver, Arc::clone(&config), strategy);
        let fixtures = ctx.fixtures().clone();
        let whistleblower = WhistleblowerPage::new(ctx.clone())?;
        let receiver = ReceiverPage::new(ctx);
        let session_id = Uuid::new_v4();
        let file_upload = capabilities.file_upload_status();

        info!(
            %session_id,
            %strategy,
            %file_upload,
            browser = capabilities.browser.as_deref().unwrap_or("unknown"),
            base_url = %config.base_url,
            "harness ready"
        );
        if let CapabilityStatus::Unavailable(reason) = &file_upload {
            warn!(%reason, "attachments will be skipped and keys entered as text");
        }

        Ok(Self {
            session_id,
            config,
            capabilities,
            strategy,
            fixtures,
            receiver,
            whistleblower,
        })
    }

    /// Recipient page object
    #[must_use]
    pub const fn receiver(&self) -> &ReceiverPage<D> {
        &self.receiver
    }

    /// Whistleblower page object
    #[must_use]
    pub const fn whistleblower(&self) -> &WhistleblowerPage<D> {
        &self.whistleblower
    }

    /// Capabilities the session was built with
    #[must_use]
    pub const fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Upload strategy fixed for the session
    #[must_use]
    pub const fn strategy(&self) -> UploadStrategy {
        self.strategy
    }

    /// Unique id of this session, for correlating logs
    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Fixture resolver of the session
    #[must_use]
    pub const fn fixtures(&self) -> &FixtureResolver {
        &self.fixtures
    }

    /// Session configuration
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Install the global subscriber from the session's log settings
    ///
    /// # Errors
    ///
    /// [`HarnessError::Config`](crate::HarnessError::Config) for an invalid
    /// level or when a subscriber is already installed.
    pub fn init_logging(&self) -> HarnessResult<()> {
        logging::init_logging(&self.config.log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use crate::page_object::PageObject;

    #[test]
    fn test_detected_strategy() {
        let driver = Arc::new(MockDriver::new());
        let harness = Harness::new(driver, HarnessConfig::default().with_browser("safari")).unwrap();
        assert!(!harness.capabilities().file_upload);
        assert_eq!(harness.strategy(), UploadStrategy::DirectTextInjection);
    }

    #[test]
    fn test_explicit_capabilities() {
        let driver = Arc::new(MockDriver::new());
        let harness = Harness::with_capabilities(
            driver,
            HarnessConfig::default().with_browser("safari"),
            Capabilities::full_support(),
        )
        .unwrap();
        assert_eq!(harness.strategy(), UploadStrategy::SimulatedPathUpload);
    }

    #[test]
    fn test_accessors() {
        let driver = Arc::new(MockDriver::new());
        let config = HarnessConfig::default().with_fixtures_dir("/srv/files");
        let harness = Harness::new(driver, config.clone()).unwrap();
        assert_eq!(harness.config(), &config);
        assert_eq!(harness.fixtures().root(), std::path::Path::new("/srv/files"));
        assert_eq!(harness.receiver().page_name(), "receiver");
        assert_eq!(harness.whistleblower().page_name(), "whistleblower");
        assert!(format!("{harness:?}").contains("session_id"));
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        let driver = Arc::new(MockDriver::new());
        let a = Harness::new(Arc::clone(&driver), HarnessConfig::default()).unwrap();
        let b = Harness::new(driver, HarnessConfig::default()).unwrap();
        assert_ne!(a.session_id(), b.session_id());
    }

    #[test]
    fn test_init_logging_uses_session_settings() {
        let driver = Arc::new(MockDriver::new());
        let mut config = HarnessConfig::default();
        config.log.level = "tipline=trace".into();
        let harness = Harness::new(driver, config).unwrap();
        // the first call may lose to another test in this binary
        let _ = harness.init_logging();
        assert!(harness.init_logging().is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let driver = Arc::new(MockDriver::new());
        let err = Harness::new(driver, HarnessConfig::default().with_poll_interval(0)).unwrap_err();
        assert!(matches!(err, crate::HarnessError::Config { .. }));
    }

    #[test]
    fn test_trait_object_driver() {
        let driver: Arc<dyn UiDriver> = Arc::new(MockDriver::new());
        let harness = Harness::new(driver, HarnessConfig::default()).unwrap();
        assert_eq!(harness.strategy(), UploadStrategy::SimulatedPathUpload);
    }
}
