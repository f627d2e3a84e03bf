//! Recipient-side page object.

use crate::capability::UploadStrategy;
use crate::driver::{ElementHandle, UiDriver};
use crate::page_object::{PageContext, PageObject};
use crate::result::HarnessResult;
use crate::selector::Selector;
use std::fmt;
use std::path::Path;
use tracing::{info, instrument};

/// Recipient preferences, where the PGP key is configured
pub const PREFERENCES_PATH: &str = "/recipient/preferences";

/// First entry of the recipient's submission list
#[must_use]
pub fn latest_submission() -> Selector {
    Selector::id("tip-0")
}

/// Text area holding the armored public key
#[must_use]
pub fn pgp_key_text_area() -> Selector {
    Selector::model("preferences.pgp_key_public")
}

/// First `span` whose text contains "Save"
#[must_use]
pub fn save_button() -> Selector {
    Selector::css_with_text("span", "Save")
}

/// Widget for uploading files to the whistleblower
#[must_use]
pub fn wbfile_upload_widget() -> Selector {
    Selector::id("TipPageWBFileUpload")
}

/// Actions available to a recipient
pub struct ReceiverPage<D: ?Sized> {
    ctx: PageContext<D>,
}

impl<D: ?Sized> Clone for ReceiverPage<D> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
        }
    }
}

impl<D: ?Sized> fmt::Debug for ReceiverPage<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiverPage").field("ctx", &self.ctx).finish()
    }
}

impl<D: ?Sized> PageObject for ReceiverPage<D> {
    fn entry_path(&self) -> &str {
        PREFERENCES_PATH
    }

    fn page_name(&self) -> &str {
        "receiver"
    }
}

impl<D: UiDriver + ?Sized> ReceiverPage<D> {
    /// Page over a shared context
    #[must_use]
    pub const fn new(ctx: PageContext<D>) -> Self {
        Self { ctx }
    }

    /// Open the most recent submission in the list.
    ///
    /// The list must hold at least one entry.
    ///
    /// # Errors
    ///
    /// [`HarnessError::LocatorFailure`](crate::HarnessError::LocatorFailure)
    /// when the list is empty.
    #[instrument(skip(self))]
    pub async fn view_most_recent_submission(&self) -> HarnessResult<()> {
        self.ctx.click(&latest_submission()).await
    }

    /// Install a PGP public key for the recipient.
    ///
    /// Relative key paths are resolved against the fixtures directory.
    /// With file-upload support the key file is handed to the first file
    /// input of the preferences page; otherwise it is read as UTF-8, the key
    /// text area is cleared and the key is typed verbatim. Either way the
    /// first "Save" span is clicked exactly once.
    ///
    /// # Errors
    ///
    /// Propagates driver failures, and I/O errors reading the key in the
    /// text-injection branch.
    #[instrument(skip(self), fields(strategy = %self.ctx.strategy()))]
    pub async fn add_public_key(&self, key_path: &Path) -> HarnessResult<()> {
        self.ctx.goto(self.entry_path()).await?;

        match self.ctx.strategy() {
            UploadStrategy::SimulatedPathUpload => {
                let key_path = self.ctx.fixtures().resolve(key_path);
                self.ctx.upload(&Selector::file_input(), &key_path).await?;
            }
            UploadStrategy::DirectTextInjection => {
                let key = self.ctx.fixtures().read_text(key_path).await?;
                let area = pgp_key_text_area();
                self.ctx.clear(&area).await?;
                self.ctx.type_into(&area, &key).await?;
            }
        }

        self.ctx.click(&save_button()).await?;
        info!(page = self.page_name(), "public key saved");
        Ok(())
    }

    /// Lazy handle to the whistleblower-file upload widget
    #[must_use]
    pub fn wbfile_widget(&self) -> ElementHandle {
        self.ctx.locate(&wbfile_upload_widget())
    }

    /// Select `path` (resolved like a fixture) on the first file input
    ///
    /// # Errors
    ///
    /// Propagates the driver's upload failure.
    #[instrument(skip(self))]
    pub async fn upload_wb_file(&self, path: &Path) -> HarnessResult<()> {
        let path = self.ctx.fixtures().resolve(path);
        self.ctx.upload(&Selector::file_input(), &path).await
    }
}
