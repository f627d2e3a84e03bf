//! Whistleblower-side page object: the anonymous submission flow.
//!
//! ```text
//! /#/submission ─► SubmissionForm ─► receivers 0,1 ─► Next
//!      ─► title + body ─► [attachments] ─► pow ready ─► Submit ─► KeyCode
//! ```

use crate::driver::UiDriver;
use crate::form::{FieldPath, ATTACHMENTS_FIELD, DESCRIPTION_FIELD, DETAILS_STEP, TITLE_FIELD};
use crate::page_object::{PageContext, PageObject};
use crate::receipt::{receipt_format, ReceiptCode};
use crate::result::HarnessResult;
use crate::selector::Selector;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Entry point of the submission flow
pub const SUBMISSION_PATH: &str = "/#/submission";

/// Receivers ticked on every submission
const SELECTED_RECEIVERS: [usize; 2] = [0, 1];

/// The submission form container
#[must_use]
pub fn submission_form() -> Selector {
    Selector::id("SubmissionForm")
}

/// Checkbox of the `index`-th receiver, inside the receiver-selection step
#[must_use]
pub fn receiver_checkbox(index: usize) -> Selector {
    Selector::id("step-receiver-selection").descendant(Selector::id(format!("receiver-{index}")))
}

/// Button leaving the receiver-selection step
#[must_use]
pub fn next_step_button() -> Selector {
    Selector::id("NextStepButton")
}

/// Final submit button
#[must_use]
pub fn submit_button() -> Selector {
    Selector::id("SubmitButton")
}

/// Receipt shown after a successful submission
#[must_use]
pub fn key_code() -> Selector {
    Selector::id("KeyCode")
}

/// Per-call state of one submission, resolved before the page is touched
#[derive(Debug)]
struct SubmissionDraft<'a> {
    title: &'a str,
    title_input: Selector,
    body_input: Selector,
    receivers: &'static [usize],
    attachment_input: Selector,
    attachments: Vec<PathBuf>,
}

/// Actions available to a whistleblower
pub struct WhistleblowerPage<D: ?Sized> {
    ctx: PageContext<D>,
    receipt_format: Regex,
}

impl<D: ?Sized> Clone for WhistleblowerPage<D> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            receipt_format: self.receipt_format.clone(),
        }
    }
}

impl<D: ?Sized> fmt::Debug for WhistleblowerPage<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhistleblowerPage")
            .field("ctx", &self.ctx)
            .field("receipt_format", &self.receipt_format.as_str())
            .finish()
    }
}

impl<D: ?Sized> PageObject for WhistleblowerPage<D> {
    fn entry_path(&self) -> &str {
        SUBMISSION_PATH
    }

    fn page_name(&self) -> &str {
        "whistleblower"
    }
}

impl<D: UiDriver + ?Sized> WhistleblowerPage<D> {
    /// Page over a shared context; compiles the configured receipt pattern
    ///
    /// # Errors
    ///
    /// [`HarnessError::Config`](crate::HarnessError::Config) for an invalid
    /// receipt pattern.
    pub fn new(ctx: PageContext<D>) -> HarnessResult<Self> {
        let receipt_format = receipt_format(&ctx.config().receipt_pattern)?;
        Ok(Self {
            ctx,
            receipt_format,
        })
    }

    fn draft<'a>(&self, title: &'a str, attach_files: bool) -> HarnessResult<SubmissionDraft<'a>> {
        let layout = &self.ctx.config().form;
        let title_input = layout
            .resolve(&FieldPath::new(DETAILS_STEP, TITLE_FIELD, 0))?
            .input_selector();
        let body_input = layout
            .resolve(&FieldPath::new(DETAILS_STEP, DESCRIPTION_FIELD, 0))?
            .input_selector();
        let attachment_input = layout
            .resolve(&FieldPath::new(DETAILS_STEP, ATTACHMENTS_FIELD, 0))?
            .file_input_selector();

        let attachments = if attach_files && self.ctx.strategy().allows_attachments() {
            self.ctx.fixtures().resolve_all(&self.ctx.config().attachments)
        } else {
            if attach_files {
                warn!(
                    strategy = %self.ctx.strategy(),
                    "file upload unsupported, submitting without attachments"
                );
            }
            Vec::new()
        };

        Ok(SubmissionDraft {
            title,
            title_input,
            body_input,
            receivers: &SELECTED_RECEIVERS,
            attachment_input,
            attachments,
        })
    }

    /// Walk the submission form and return the receipt code.
    ///
    /// Receivers 0 and 1 are selected, `title` and the configured body text
    /// are entered and, when `attach_files` is set and the environment can
    /// upload files, the configured attachments are added. Without upload
    /// support attachments are skipped and the submission still goes ahead.
    ///
    /// # Errors
    ///
    /// - [`HarnessError::UnknownField`](crate::HarnessError::UnknownField)
    ///   when the form layout lacks a details field; nothing is driven
    /// - [`HarnessError::Timeout`](crate::HarnessError::Timeout) when the
    ///   form, the submit button or the receipt never becomes ready
    /// - [`HarnessError::AssertionFailed`](crate::HarnessError::AssertionFailed)
    ///   when the receipt does not match the configured pattern
    #[instrument(skip(self), fields(strategy = %self.ctx.strategy()))]
    pub async fn perform_submission(
        &self,
        title: &str,
        attach_files: bool,
    ) -> HarnessResult<ReceiptCode> {
        let draft = self.draft(title, attach_files)?;
        let ctx = &self.ctx;
        let form = submission_form();

        ctx.goto(self.entry_path()).await?;
        let _ = ctx.wait_present(&form).await?;

        for &index in draft.receivers {
            ctx.click(&receiver_checkbox(index)).await?;
        }
        ctx.click(&next_step_button()).await?;

        ctx.type_into(&draft.title_input, draft.title).await?;
        ctx.type_into(&draft.body_input, &ctx.config().submission_body)
            .await?;

        for path in &draft.attachments {
            ctx.upload(&draft.attachment_input, path).await?;
        }

        let submit = submit_button();
        let proof_of_work = ctx.config().proof_of_work_expr.as_deref();
        let _ = ctx
            .wait_ready(proof_of_work.map(|expr| (&form, expr)), &submit)
            .await?;
        ctx.click(&submit).await?;

        let receipt = key_code();
        let _ = ctx.wait_text(&receipt).await?;
        let raw = ctx.read_text(&receipt).await?;
        let code = ReceiptCode::parse(&raw, &self.receipt_format)?;

        info!(
            page = self.page_name(),
            attachments = draft.attachments.len(),
            receivers = draft.receivers.len(),
            "submission completed"
        );
        Ok(code)
    }

    /// Select `path` (resolved like a fixture) on the first file input
    ///
    /// # Errors
    ///
    /// Propagates the driver's upload failure.
    #[instrument(skip(self))]
    pub async fn submit_file(&self, path: &Path) -> HarnessResult<()> {
        let path = self.ctx.fixtures().resolve(path);
        self.ctx.upload(&Selector::file_input(), &path).await
    }
}
