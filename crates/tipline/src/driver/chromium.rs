//! Chromium driver over CDP (feature `browser`).
//!
//! Element interactions are executed as page scripts built from
//! [`Selector::to_query`], so every variant (including text filters and
//! scoped selectors) resolves with the same first-match rule. File
//! selection goes through `DOM.setFileInputFiles` and therefore needs a
//! selector with a CSS rendering.

use super::{ElementHandle, UiDriver};
use crate::config::HarnessConfig;
use crate::result::{HarnessError, HarnessResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

/// Launch settings for [`ChromiumDriver`]
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Base URL relative navigations are joined to
    pub base_url: String,
    /// Run without a window
    pub headless: bool,
    /// Keep the Chromium sandbox enabled
    pub sandbox: bool,
    /// Chromium executable override
    pub chromium_path: Option<PathBuf>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
            headless: true,
            sandbox: true,
            chromium_path: None,
        }
    }
}

impl BrowserSettings {
    /// Settings pointing at the configured base URL
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            ..Self::default()
        }
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Disable the Chromium sandbox (containers, CI)
    #[must_use]
    pub const fn no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Use a specific Chromium executable
    #[must_use]
    pub fn chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }
}

/// Result envelope of an element script
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum ScriptOutcome {
    Ok {
        #[serde(default)]
        value: serde_json::Value,
    },
    Missing,
    Rejected {
        message: String,
    },
}

/// Browser driver with a real CDP connection
#[derive(Debug)]
pub struct ChromiumDriver {
    settings: BrowserSettings,
    browser: Mutex<Browser>,
    page: Page,
    epoch: AtomicU64,
    handler: JoinHandle<()>,
}

impl ChromiumDriver {
    /// Launch Chromium and open a blank page
    ///
    /// # Errors
    ///
    /// Returns error if the browser cannot be launched
    pub async fn launch(settings: BrowserSettings) -> HarnessResult<Self> {
        let mut builder = BrowserConfig::builder();
        if !settings.headless {
            builder = builder.with_head();
        }
        if !settings.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = settings.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(HarnessError::driver)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(HarnessError::driver)?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(HarnessError::driver)?;

        Ok(Self {
            settings,
            browser: Mutex::new(browser),
            page,
            epoch: AtomicU64::new(0),
            handler,
        })
    }

    /// Close the browser
    ///
    /// # Errors
    ///
    /// Returns error if the browser refuses to close
    pub async fn close(self) -> HarnessResult<()> {
        let _ = self
            .browser
            .lock()
            .await
            .close()
            .await
            .map_err(HarnessError::driver)?;
        self.handler.abort();
        Ok(())
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") || path == "about:blank" {
            path.to_string()
        } else {
            format!("{}{path}", self.settings.base_url.trim_end_matches('/'))
        }
    }

    /// Resolve the handle in the page and run `body` with `el` bound.
    ///
    /// `body` must return `{ status: "ok", value }` or
    /// `{ status: "rejected", message }`.
    async fn run(&self, handle: &ElementHandle, body: &str) -> HarnessResult<serde_json::Value> {
        handle.ensure_fresh(self.epoch())?;
        let script = format!(
            "(() => {{ const el = {}; if (!el) return {{ status: \"missing\" }}; {body} }})()",
            handle.selector().to_query()
        );
        let outcome: ScriptOutcome = self
            .page
            .evaluate(script.as_str())
            .await
            .map_err(HarnessError::driver)?
            .into_value()?;
        match outcome {
            ScriptOutcome::Ok { value } => Ok(value),
            ScriptOutcome::Missing => Err(HarnessError::locator(handle.selector())),
            ScriptOutcome::Rejected { message } => {
                Err(HarnessError::interaction(handle.selector(), message))
            }
        }
    }

    async fn query_bool(&self, handle: &ElementHandle, expression: &str) -> HarnessResult<bool> {
        handle.ensure_fresh(self.epoch())?;
        let script = format!(
            "(() => {{ const el = {}; return {expression}; }})()",
            handle.selector().to_query()
        );
        Ok(self
            .page
            .evaluate(script.as_str())
            .await
            .map_err(HarnessError::driver)?
            .into_value()?)
    }
}

const REJECT_DISABLED: &str =
    "if (el.disabled) return { status: \"rejected\", message: \"element is disabled\" };";
const REJECT_HIDDEN: &str = "if (el.getClientRects().length === 0) return { status: \"rejected\", message: \"element is not visible\" };";
const REJECT_NOT_EDITABLE: &str = "if (!(\"value\" in el) || el.type === \"file\") return { status: \"rejected\", message: \"element is not editable\" };";
const NOTIFY_INPUT: &str = "el.dispatchEvent(new Event(\"input\", { bubbles: true })); el.dispatchEvent(new Event(\"change\", { bubbles: true }));";

/// Element script evaluating `expression` with `this` bound to `el`; a throw yields `null`
fn evaluate_body(expression: &str) -> String {
    format!(
        "let value = null; try {{ value = (function () {{ return ({expression}); }}).call(el); }} catch (e) {{}} return {{ status: \"ok\", value }};"
    )
}

#[async_trait]
impl UiDriver for ChromiumDriver {
    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    async fn navigate(&self, path: &str) -> HarnessResult<()> {
        let url = self.url_for(path);
        debug!(url = %url, "navigate");
        let _ = self
            .page
            .goto(url.as_str())
            .await
            .map_err(|e| HarnessError::driver(format!("navigation to {url} failed: {e}")))?;
        let _ = self.epoch.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn click(&self, handle: &ElementHandle) -> HarnessResult<()> {
        let body = format!("{REJECT_DISABLED} {REJECT_HIDDEN} el.click(); return {{ status: \"ok\" }};");
        self.run(handle, &body).await.map(drop)
    }

    async fn type_text(&self, handle: &ElementHandle, text: &str) -> HarnessResult<()> {
        let body = format!(
            "{REJECT_DISABLED} {REJECT_NOT_EDITABLE} el.focus(); el.value += {}; {NOTIFY_INPUT} return {{ status: \"ok\" }};",
            serde_json::to_string(text)?
        );
        self.run(handle, &body).await.map(drop)
    }

    async fn clear(&self, handle: &ElementHandle) -> HarnessResult<()> {
        let body = format!(
            "{REJECT_DISABLED} {REJECT_NOT_EDITABLE} el.value = \"\"; {NOTIFY_INPUT} return {{ status: \"ok\" }};"
        );
        self.run(handle, &body).await.map(drop)
    }

    async fn read_text(&self, handle: &ElementHandle) -> HarnessResult<String> {
        let value = self
            .run(handle, "return { status: \"ok\", value: el.innerText };")
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn upload_file(&self, handle: &ElementHandle, path: &Path) -> HarnessResult<()> {
        let css = handle.selector().to_css().ok_or_else(|| {
            HarnessError::interaction(handle.selector(), "file inputs need a CSS selector")
        })?;
        self.run(
            handle,
            &format!("{REJECT_DISABLED} if (el.type !== \"file\") return {{ status: \"rejected\", message: \"not a file input\" }}; return {{ status: \"ok\" }};"),
        )
        .await?;

        let element = self
            .page
            .find_element(css)
            .await
            .map_err(|_| HarnessError::locator(handle.selector()))?;
        let params = SetFileInputFilesParams::builder()
            .files(vec![path.display().to_string()])
            .backend_node_id(element.backend_node_id)
            .build()
            .map_err(HarnessError::driver)?;
        let _ = self
            .page
            .execute(params)
            .await
            .map_err(HarnessError::driver)?;
        Ok(())
    }

    async fn is_present(&self, handle: &ElementHandle) -> HarnessResult<bool> {
        self.query_bool(handle, "el !== null").await
    }

    async fn is_clickable(&self, handle: &ElementHandle) -> HarnessResult<bool> {
        self.query_bool(
            handle,
            "el !== null && !el.disabled && el.getClientRects().length > 0",
        )
        .await
    }

    async fn evaluate(
        &self,
        handle: &ElementHandle,
        expression: &str,
    ) -> HarnessResult<serde_json::Value> {
        self.run(handle, &evaluate_body(expression)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let config = HarnessConfig::default().with_base_url("http://sut.local:8443");
        let settings = BrowserSettings::from_config(&config).no_sandbox();
        assert_eq!(settings.base_url, "http://sut.local:8443");
        assert!(!settings.sandbox);
        assert!(settings.headless);
    }

    #[test]
    fn test_evaluation_swallows_throws() {
        let body = evaluate_body("this.scope().submission.pow === true");
        assert!(body.starts_with("let value = null; try {"));
        assert!(body.contains("return (this.scope().submission.pow === true);"));
        assert!(body.contains("catch (e) {}"));
        assert!(body.ends_with("return { status: \"ok\", value };"));
    }

    #[test]
    fn test_outcome_parsing() {
        let ok: ScriptOutcome =
            serde_json::from_str(r#"{"status":"ok","value":"1234"}"#).unwrap();
        assert!(matches!(ok, ScriptOutcome::Ok { value } if value == "1234"));

        let missing: ScriptOutcome = serde_json::from_str(r#"{"status":"missing"}"#).unwrap();
        assert!(matches!(missing, ScriptOutcome::Missing));

        let bare: ScriptOutcome = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert!(matches!(bare, ScriptOutcome::Ok { value } if value.is_null()));
    }
}
