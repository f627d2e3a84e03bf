//! Wait Mechanisms
//!
//! [`wait_until`] is the only suspension primitive page objects use: it
//! polls an async predicate on a fixed interval until it holds or the
//! timeout elapses. The condition helpers below re-locate their element on
//! every poll, so a navigation during a wait never leaves a stale handle
//! behind.
//!
//! A predicate that fails with a locator failure counts as "not yet"; any
//! other error aborts the wait immediately.

use crate::driver::UiDriver;
use crate::result::{HarnessError, HarnessResult};
use crate::selector::Selector;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of predicate evaluations
    pub polls: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `predicate` until it returns `true` or the timeout elapses.
///
/// The predicate is evaluated once immediately, then after every poll
/// interval. The last evaluation happens no later than the deadline.
///
/// # Errors
///
/// [`HarnessError::Timeout`] when the deadline passes; any non-locator error
/// raised by the predicate.
pub async fn wait_until<F, Fut>(
    waited_for: &str,
    options: &WaitOptions,
    mut predicate: F,
) -> HarnessResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = HarnessResult<bool>>,
{
    let start = Instant::now();
    let deadline = start + options.timeout();
    let mut polls = 0_u32;

    loop {
        polls += 1;
        let satisfied = match predicate().await {
            Ok(value) => value,
            Err(HarnessError::LocatorFailure { .. }) => false,
            Err(e) => return Err(e),
        };
        if satisfied {
            let elapsed = start.elapsed();
            debug!(waited_for, polls, elapsed_ms = elapsed.as_millis() as u64, "wait satisfied");
            return Ok(WaitResult {
                elapsed,
                polls,
                waited_for: waited_for.to_string(),
            });
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(HarnessError::Timeout {
                waited_for: waited_for.to_string(),
                ms: options.timeout_ms,
            });
        }
        trace!(waited_for, polls, "condition not met yet");
        tokio::time::sleep(options.poll_interval().min(deadline - now)).await;
    }
}

// =============================================================================
// CONDITIONS
// =============================================================================

/// Wait until `selector` resolves to an element
pub async fn wait_until_present<D>(
    driver: &D,
    selector: &Selector,
    options: &WaitOptions,
) -> HarnessResult<WaitResult>
where
    D: UiDriver + ?Sized,
{
    wait_until(&format!("{selector} present"), options, || async {
        driver.is_present(&driver.locate(selector)).await
    })
    .await
}

/// Wait until `selector` is present and renders non-empty text
pub async fn wait_until_text<D>(
    driver: &D,
    selector: &Selector,
    options: &WaitOptions,
) -> HarnessResult<WaitResult>
where
    D: UiDriver + ?Sized,
{
    wait_until(&format!("{selector} has text"), options, || async {
        let handle = driver.locate(selector);
        if !driver.is_present(&handle).await? {
            return Ok::<_, HarnessError>(false);
        }
        Ok(!driver.read_text(&handle).await?.trim().is_empty())
    })
    .await
}

/// Wait until an optional readiness flag is set and `button` is clickable.
///
/// Both checks share one deadline. The flag, when given, is `expression`
/// evaluated on its selector and must yield `true`; the button is checked
/// only once the flag holds.
pub async fn wait_until_ready<D>(
    driver: &D,
    flag: Option<(&Selector, &str)>,
    button: &Selector,
    options: &WaitOptions,
) -> HarnessResult<WaitResult>
where
    D: UiDriver + ?Sized,
{
    let waited_for = match flag {
        Some((selector, expression)) => format!("{selector} {expression} and {button} clickable"),
        None => format!("{button} clickable"),
    };
    wait_until(&waited_for, options, || async {
        if let Some((selector, expression)) = flag {
            let value = driver.evaluate(&driver.locate(selector), expression).await?;
            if value.as_bool() != Some(true) {
                return Ok::<_, HarnessError>(false);
            }
        }
        driver.is_clickable(&driver.locate(button)).await
    })
    .await
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use serde_json::json;
    use std::cell::Cell;

    fn fast() -> WaitOptions {
        WaitOptions::new().with_timeout(1_000).with_poll_interval(100)
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_durations() {
            let opts = WaitOptions::new().with_timeout(250).with_poll_interval(50);
            assert_eq!(opts.timeout(), Duration::from_millis(250));
            assert_eq!(opts.poll_interval(), Duration::from_millis(50));
        }
    }

    mod polling_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_immediate_success_polls_once() {
            let result = wait_until("always", &fast(), || async { Ok::<_, HarnessError>(true) })
                .await
                .unwrap();
            assert_eq!(result.polls, 1);
            assert_eq!(result.waited_for, "always");
        }

        #[tokio::test(start_paused = true)]
        async fn test_succeeds_after_polls() {
            let count = Cell::new(0);
            let result = wait_until("third time", &fast(), || {
                count.set(count.get() + 1);
                let n = count.get();
                async move { Ok::<_, HarnessError>(n >= 3) }
            })
            .await
            .unwrap();
            assert_eq!(result.polls, 3);
            assert!(result.elapsed >= Duration::from_millis(200));
        }

        #[tokio::test(start_paused = true)]
        async fn test_timeout_is_error_not_empty_result() {
            let err = wait_until("never", &fast(), || async { Ok::<_, HarnessError>(false) })
                .await
                .unwrap_err();
            assert!(err.is_timeout());
            assert!(err.to_string().contains("never"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_locator_failure_means_not_yet() {
            let count = Cell::new(0);
            let result = wait_until("eventually", &fast(), || {
                count.set(count.get() + 1);
                let n = count.get();
                async move {
                    if n < 2 {
                        Err(HarnessError::locator("#late"))
                    } else {
                        Ok::<_, HarnessError>(true)
                    }
                }
            })
            .await
            .unwrap();
            assert_eq!(result.polls, 2);
        }

        #[tokio::test(start_paused = true)]
        async fn test_other_errors_abort() {
            let err = wait_until("broken", &fast(), || async {
                Err::<bool, _>(HarnessError::interaction("#x", "detached"))
            })
            .await
            .unwrap_err();
            assert!(err.is_interaction());
        }
    }

    mod condition_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_present_after_polls() {
            let sel = Selector::id("SubmissionForm");
            let driver = MockDriver::new()
                .with_element(sel.clone(), MockElement::container().appearing_after(3));
            let result = wait_until_present(&driver, &sel, &fast()).await.unwrap();
            assert_eq!(result.polls, 4);
        }

        #[tokio::test(start_paused = true)]
        async fn test_missing_element_times_out() {
            let driver = MockDriver::new();
            let err = wait_until_present(&driver, &Selector::id("KeyCode"), &fast())
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test(start_paused = true)]
        async fn test_clickable_distinct_from_present() {
            let sel = Selector::id("SubmitButton");
            let driver =
                MockDriver::new().with_element(sel.clone(), MockElement::button().disabled());
            assert!(wait_until_present(&driver, &sel, &fast()).await.is_ok());
            let err = wait_until_ready(&driver, None, &sel, &fast())
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test(start_paused = true)]
        async fn test_empty_text_never_satisfies() {
            let sel = Selector::id("KeyCode");
            let driver = MockDriver::new().with_element(sel.clone(), MockElement::text("  "));
            let err = wait_until_text(&driver, &sel, &fast()).await.unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test(start_paused = true)]
        async fn test_flag_polls_until_true() {
            let form = Selector::id("SubmissionForm");
            let submit = Selector::id("SubmitButton");
            let driver = MockDriver::new()
                .with_element(form.clone(), MockElement::container())
                .with_element(submit.clone(), MockElement::button());
            driver.script_evaluation(form.clone(), [json!(false), json!(null), json!(true)]);
            let result = wait_until_ready(&driver, Some((&form, "this.pow")), &submit, &fast())
                .await
                .unwrap();
            assert_eq!(result.polls, 3);
        }

        #[tokio::test(start_paused = true)]
        async fn test_flag_and_button_share_one_deadline() {
            let form = Selector::id("SubmissionForm");
            let submit = Selector::id("SubmitButton");
            let driver = MockDriver::new()
                .with_element(form.clone(), MockElement::container())
                .with_element(submit.clone(), MockElement::button().disabled());
            // flag turns true on the ninth poll, 800ms in
            let mut flags = vec![json!(false); 8];
            flags.push(json!(true));
            driver.script_evaluation(form.clone(), flags);

            let start = Instant::now();
            let err = wait_until_ready(&driver, Some((&form, "this.pow")), &submit, &fast())
                .await
                .unwrap_err();
            assert!(err.is_timeout());
            assert!(start.elapsed() <= fast().timeout());
        }
    }
}
