//! Page objects of the whistleblowing client.
//!
//! | Page | Role | Actions |
//! |------|------|---------|
//! | [`ReceiverPage`] | recipient | open latest report, add PGP key, upload files |
//! | [`WhistleblowerPage`] | whistleblower | anonymous submission, file upload |

mod receiver;
mod whistleblower;

pub use receiver::ReceiverPage;
pub use whistleblower::WhistleblowerPage;

/// Selectors bound by the page objects
pub mod selectors {
    pub use super::receiver::{
        latest_submission, pgp_key_text_area, save_button, wbfile_upload_widget, PREFERENCES_PATH,
    };
    pub use super::whistleblower::{
        key_code, next_step_button, receiver_checkbox, submission_form, submit_button,
        SUBMISSION_PATH,
    };
}
