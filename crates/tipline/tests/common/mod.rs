//! Scripted pages shared by the scenario tests.

#![allow(dead_code)]

use serde_json::json;
use std::sync::Arc;
use tipline::pages::selectors;
use tipline::{Capabilities, Harness, HarnessConfig, MockDriver, MockElement, Selector};

/// Receipt rendered by the scripted submission page
pub const RECEIPT: &str = "6143 8215 9923 0571";

pub fn title_input() -> Selector {
    Selector::id("step-0").descendant(Selector::id("step-0-field-0-0-input-0"))
}

pub fn body_input() -> Selector {
    Selector::id("step-0").descendant(Selector::id("step-0-field-1-0-input-0"))
}

pub fn attachment_input() -> Selector {
    Selector::id("step-0")
        .descendant(Selector::id("step-0-field-2-0"))
        .descendant(Selector::file_input())
}

/// Submission form whose receipt appears once the submit button is clicked
pub fn submission_page() -> MockDriver {
    let driver = MockDriver::new()
        .with_element(selectors::submission_form(), MockElement::container())
        .with_element(selectors::receiver_checkbox(0), MockElement::button())
        .with_element(selectors::receiver_checkbox(1), MockElement::button())
        .with_element(selectors::next_step_button(), MockElement::button())
        .with_element(title_input(), MockElement::text_input())
        .with_element(body_input(), MockElement::text_area())
        .with_element(attachment_input(), MockElement::file_input())
        .with_element(selectors::submit_button(), MockElement::button())
        .with_element(selectors::key_code(), MockElement::text(RECEIPT).detached());
    driver.script_evaluation(selectors::submission_form(), [json!(true)]);
    driver.reveal_on_click(selectors::submit_button(), selectors::key_code());
    driver
}

/// Recipient preferences with a file input, the key text area and Save
pub fn preferences_page() -> MockDriver {
    MockDriver::new()
        .with_element(Selector::file_input(), MockElement::file_input())
        .with_element(selectors::pgp_key_text_area(), MockElement::text_area())
        .with_element(selectors::save_button(), MockElement::text("Save"))
}

pub fn harness(driver: &Arc<MockDriver>, caps: Capabilities) -> Harness<MockDriver> {
    let config = HarnessConfig::default()
        .with_fixtures_dir("/srv/tipline/files")
        .with_wait_timeout(2_000)
        .with_poll_interval(50);
    Harness::with_capabilities(Arc::clone(driver), config, caps).unwrap()
}
