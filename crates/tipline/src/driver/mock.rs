//! Scripted in-memory driver for exercising page objects without a browser.
//!
//! Elements are registered under the exact [`Selector`] a page object will
//! use; lookups are by selector equality, not by DOM matching. Every
//! completed interaction is appended to a [`DriverCall`] trace so tests can
//! assert on ordering and on the absence of calls.

use super::{ElementHandle, UiDriver};
use crate::result::{HarnessError, HarnessResult};
use crate::selector::Selector;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

/// Kind of a mock element, deciding which interactions it accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElementKind {
    /// Clickable control
    Button,
    /// Single-line text input
    TextInput,
    /// Multi-line text area
    TextArea,
    /// `<input type="file">`
    FileInput,
    /// Structural container (form, step, list)
    Container,
    /// Read-only text
    Text,
}

impl ElementKind {
    /// Whether typing and clearing are allowed
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::TextInput | Self::TextArea)
    }
}

/// A scripted element
#[derive(Debug, Clone)]
pub struct MockElement {
    /// Element kind
    pub kind: ElementKind,
    /// Rendered text
    pub text: String,
    /// Current value of editable elements
    pub value: String,
    /// Whether the element accepts interaction
    pub enabled: bool,
    /// Whether the element is rendered visibly
    pub visible: bool,
    /// Whether the element is in the document
    pub attached: bool,
    /// Presence checks answered with `false` before the element shows up
    pub appear_after: u32,
    /// Files selected on a file input
    pub files: Vec<PathBuf>,
}

impl MockElement {
    /// Create an attached, visible, enabled element
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            text: String::new(),
            value: String::new(),
            enabled: true,
            visible: true,
            attached: true,
            appear_after: 0,
            files: Vec::new(),
        }
    }

    /// Clickable control
    #[must_use]
    pub fn button() -> Self {
        Self::new(ElementKind::Button)
    }

    /// Single-line text input
    #[must_use]
    pub fn text_input() -> Self {
        Self::new(ElementKind::TextInput)
    }

    /// Multi-line text area
    #[must_use]
    pub fn text_area() -> Self {
        Self::new(ElementKind::TextArea)
    }

    /// File input
    #[must_use]
    pub fn file_input() -> Self {
        Self::new(ElementKind::FileInput)
    }

    /// Structural container
    #[must_use]
    pub fn container() -> Self {
        Self::new(ElementKind::Container)
    }

    /// Read-only text element
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(ElementKind::Text).with_text(text)
    }

    /// Set rendered text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the initial value of an editable element
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Render the element disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Render the element invisible
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Keep the element out of the document until revealed by a click
    #[must_use]
    pub const fn detached(mut self) -> Self {
        self.attached = false;
        self
    }

    /// Answer the first `checks` presence checks with `false`
    #[must_use]
    pub const fn appearing_after(mut self, checks: u32) -> Self {
        self.appear_after = checks;
        self
    }
}

/// A completed driver interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DriverCall {
    /// Navigation to a path
    Navigate(String),
    /// Click on a selector
    Click(String),
    /// Text typed into a selector
    TypeText {
        /// Rendered selector
        selector: String,
        /// Typed text
        text: String,
    },
    /// Selector cleared
    Clear(String),
    /// Text read from a selector
    ReadText(String),
    /// File selected on a selector
    UploadFile {
        /// Rendered selector
        selector: String,
        /// Selected file
        path: PathBuf,
    },
    /// Expression evaluated against a selector
    Evaluate {
        /// Rendered selector
        selector: String,
        /// Evaluated expression
        expression: String,
    },
}

#[derive(Debug, Default)]
struct MockState {
    epoch: u64,
    url: String,
    elements: HashMap<Selector, MockElement>,
    presence_checks: HashMap<Selector, u32>,
    reveals: HashMap<Selector, Vec<Selector>>,
    evaluations: HashMap<Selector, VecDeque<serde_json::Value>>,
    calls: Vec<DriverCall>,
}

impl MockState {
    fn presence_count(&self, selector: &Selector) -> u32 {
        self.presence_checks.get(selector).copied().unwrap_or(0)
    }

    fn is_attached(&self, selector: &Selector) -> bool {
        self.elements
            .get(selector)
            .is_some_and(|e| e.attached && self.presence_count(selector) >= e.appear_after)
    }

    /// Presence check: counts towards `appear_after`
    fn check_presence(&mut self, selector: &Selector) -> Option<&MockElement> {
        let present = self.is_attached(selector);
        *self.presence_checks.entry(selector.clone()).or_insert(0) += 1;
        if present {
            self.elements.get(selector)
        } else {
            None
        }
    }

    fn resolve(&mut self, handle: &ElementHandle) -> HarnessResult<&mut MockElement> {
        handle.ensure_fresh(self.epoch)?;
        let selector = handle.selector();
        if !self.is_attached(selector) {
            return Err(HarnessError::locator(selector));
        }
        self.elements
            .get_mut(selector)
            .ok_or_else(|| HarnessError::locator(selector))
    }

    fn resolve_interactable(&mut self, handle: &ElementHandle) -> HarnessResult<&mut MockElement> {
        let element = self.resolve(handle)?;
        if !element.visible {
            return Err(HarnessError::interaction(
                handle.selector(),
                "element is not visible",
            ));
        }
        if !element.enabled {
            return Err(HarnessError::interaction(
                handle.selector(),
                "element is disabled",
            ));
        }
        Ok(element)
    }
}

/// Mock driver for unit testing
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create an empty mock page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element (builder form)
    #[must_use]
    pub fn with_element(mut self, selector: Selector, element: MockElement) -> Self {
        let _ = self.state.get_mut().elements.insert(selector, element);
        self
    }

    /// Register or replace an element
    pub fn add_element(&self, selector: Selector, element: MockElement) {
        let _ = self.state.lock().elements.insert(selector, element);
    }

    /// Attach `target` to the document when `trigger` is clicked
    pub fn reveal_on_click(&self, trigger: Selector, target: Selector) {
        self.state
            .lock()
            .reveals
            .entry(trigger)
            .or_default()
            .push(target);
    }

    /// Script successive `evaluate` results for a selector.
    ///
    /// Values are consumed in order; the last one keeps being returned.
    pub fn script_evaluation(
        &self,
        selector: Selector,
        values: impl IntoIterator<Item = serde_json::Value>,
    ) {
        let _ = self
            .state
            .lock()
            .evaluations
            .insert(selector, values.into_iter().collect());
    }

    /// Enable or disable an element
    pub fn set_enabled(&self, selector: &Selector, enabled: bool) {
        if let Some(element) = self.state.lock().elements.get_mut(selector) {
            element.enabled = enabled;
        }
    }

    /// Completed calls, oldest first
    #[must_use]
    pub fn calls(&self) -> Vec<DriverCall> {
        self.state.lock().calls.clone()
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Number of clicks performed on a selector
    #[must_use]
    pub fn click_count(&self, selector: &Selector) -> usize {
        let rendered = selector.to_string();
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, DriverCall::Click(s) if *s == rendered))
            .count()
    }

    /// Number of file selections performed, on any selector
    #[must_use]
    pub fn upload_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, DriverCall::UploadFile { .. }))
            .count()
    }

    /// Current value of an editable element
    #[must_use]
    pub fn value_of(&self, selector: &Selector) -> Option<String> {
        self.state
            .lock()
            .elements
            .get(selector)
            .map(|e| e.value.clone())
    }

    /// Files selected on a file input
    #[must_use]
    pub fn files_of(&self, selector: &Selector) -> Vec<PathBuf> {
        self.state
            .lock()
            .elements
            .get(selector)
            .map(|e| e.files.clone())
            .unwrap_or_default()
    }

    /// Last navigated location
    #[must_use]
    pub fn current_url(&self) -> String {
        self.state.lock().url.clone()
    }
}

#[async_trait]
impl UiDriver for MockDriver {
    fn epoch(&self) -> u64 {
        self.state.lock().epoch
    }

    async fn navigate(&self, path: &str) -> HarnessResult<()> {
        let mut state = self.state.lock();
        state.epoch += 1;
        state.url = path.to_string();
        state.calls.push(DriverCall::Navigate(path.to_string()));
        Ok(())
    }

    async fn click(&self, handle: &ElementHandle) -> HarnessResult<()> {
        let mut state = self.state.lock();
        let _ = state.resolve_interactable(handle)?;
        state
            .calls
            .push(DriverCall::Click(handle.selector().to_string()));
        let revealed = state
            .reveals
            .get(handle.selector())
            .cloned()
            .unwrap_or_default();
        for target in revealed {
            if let Some(element) = state.elements.get_mut(&target) {
                element.attached = true;
            }
        }
        Ok(())
    }

    async fn type_text(&self, handle: &ElementHandle, text: &str) -> HarnessResult<()> {
        let mut state = self.state.lock();
        let element = state.resolve_interactable(handle)?;
        if !element.kind.is_editable() {
            return Err(HarnessError::interaction(
                handle.selector(),
                format!("cannot type into {:?}", element.kind),
            ));
        }
        element.value.push_str(text);
        state.calls.push(DriverCall::TypeText {
            selector: handle.selector().to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn clear(&self, handle: &ElementHandle) -> HarnessResult<()> {
        let mut state = self.state.lock();
        let element = state.resolve_interactable(handle)?;
        if !element.kind.is_editable() {
            return Err(HarnessError::interaction(
                handle.selector(),
                format!("cannot clear {:?}", element.kind),
            ));
        }
        element.value.clear();
        state
            .calls
            .push(DriverCall::Clear(handle.selector().to_string()));
        Ok(())
    }

    async fn read_text(&self, handle: &ElementHandle) -> HarnessResult<String> {
        let mut state = self.state.lock();
        let text = state.resolve(handle)?.text.clone();
        state
            .calls
            .push(DriverCall::ReadText(handle.selector().to_string()));
        Ok(text)
    }

    async fn upload_file(&self, handle: &ElementHandle, path: &Path) -> HarnessResult<()> {
        let mut state = self.state.lock();
        let element = state.resolve(handle)?;
        if !element.enabled {
            return Err(HarnessError::interaction(
                handle.selector(),
                "element is disabled",
            ));
        }
        if element.kind != ElementKind::FileInput {
            return Err(HarnessError::interaction(
                handle.selector(),
                format!("cannot upload to {:?}", element.kind),
            ));
        }
        element.files.push(path.to_path_buf());
        state.calls.push(DriverCall::UploadFile {
            selector: handle.selector().to_string(),
            path: path.to_path_buf(),
        });
        Ok(())
    }

    async fn is_present(&self, handle: &ElementHandle) -> HarnessResult<bool> {
        let mut state = self.state.lock();
        handle.ensure_fresh(state.epoch)?;
        Ok(state.check_presence(handle.selector()).is_some())
    }

    async fn is_clickable(&self, handle: &ElementHandle) -> HarnessResult<bool> {
        let mut state = self.state.lock();
        handle.ensure_fresh(state.epoch)?;
        Ok(state
            .check_presence(handle.selector())
            .is_some_and(|e| e.visible && e.enabled))
    }

    async fn evaluate(
        &self,
        handle: &ElementHandle,
        expression: &str,
    ) -> HarnessResult<serde_json::Value> {
        let mut state = self.state.lock();
        let _ = state.resolve(handle)?;
        let selector = handle.selector();
        let value = match state.evaluations.get_mut(selector) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
        .ok_or_else(|| {
            HarnessError::driver(format!("no scripted evaluation for {selector}"))
        })?;
        state.calls.push(DriverCall::Evaluate {
            selector: selector.to_string(),
            expression: expression.to_string(),
        });
        Ok(value)
    }
}
