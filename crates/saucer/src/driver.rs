//! PageDriver - Abstract Browser Automation Trait
//!
//! Page objects never talk to a browser directly. They go through
//! [`PageDriver`], which keeps the automation engine swappable:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  PageDriver (Abstract Trait)                                      │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌────────────────────┐  ┌────────────────────┐  ┌─────────────┐ │
//! │  │  ChromiumDriver    │  │  Storefront        │  │  MockDriver │ │
//! │  │  (feature browser) │  │  (offline replica) │  │  (units)    │ │
//! │  │  CDP via           │  │  in-process shop   │  │  scripted   │ │
//! │  │  chromiumoxide     │  │  state machine     │  │  elements   │ │
//! │  └────────────────────┘  └────────────────────┘  └─────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Element handles are positional (selector + index) and are re-resolved by
//! the driver on every use, so a handle never pins a stale DOM node.

use crate::result::{SaucerError, SaucerResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

/// Reference to the `index`-th element matching `selector`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Selector the element was found with
    pub selector: String,
    /// Position among the selector's matches, in DOM order
    pub index: usize,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(selector: impl Into<String>, index: usize) -> Self {
        Self {
            selector: selector.into(),
            index,
        }
    }

    /// Handles for the first `count` matches of a selector
    #[must_use]
    pub fn all(selector: &str, count: usize) -> Vec<Self> {
        (0..count).map(|index| Self::new(selector, index)).collect()
    }
}

/// Abstract driver trait for browser automation
///
/// All methods take `&self`: one handle is shared by every page object of a
/// test, and implementations keep their own interior state.
///
/// # Implementations
///
/// - `ChromiumDriver` - real browser, uses chromiumoxide (feature `browser`)
/// - `Storefront` - offline replica of the demo shop
/// - `MockDriver` - for unit testing
#[async_trait]
pub trait PageDriver: Send + Sync + std::fmt::Debug {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> SaucerResult<()>;

    /// Wait until an element matching `selector` is visible
    ///
    /// Fails with [`SaucerError::Timeout`] once `timeout` elapses.
    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> SaucerResult<ElementHandle>;

    /// First matching element, if any, without waiting
    async fn query_selector(&self, selector: &str) -> SaucerResult<Option<ElementHandle>> {
        Ok(self.query_selector_all(selector).await?.into_iter().next())
    }

    /// All matching elements in DOM order, without waiting
    async fn query_selector_all(&self, selector: &str) -> SaucerResult<Vec<ElementHandle>>;

    /// Click element
    async fn click(&self, element: &ElementHandle) -> SaucerResult<()>;

    /// Replace the value of an input element
    async fn fill(&self, element: &ElementHandle, text: &str) -> SaucerResult<()>;

    /// Text content of an element (may be empty)
    async fn text_content(&self, element: &ElementHandle) -> SaucerResult<String>;

    /// Choose an option of a `<select>` by value
    async fn select_option(&self, selector: &str, value: &str) -> SaucerResult<()>;

    /// Serialized page markup
    async fn content(&self) -> SaucerResult<String>;

    /// Document title
    async fn title(&self) -> SaucerResult<String>;

    /// Capture the viewport as PNG bytes
    async fn screenshot(&self) -> SaucerResult<Vec<u8>>;

    /// Wait until the page has stopped loading
    async fn wait_for_network_idle(&self, timeout: Duration) -> SaucerResult<()>;

    /// Close the browser session
    async fn close(&self) -> SaucerResult<()>;
}

/// Scripted element for [`MockDriver`]
#[derive(Debug, Clone)]
pub struct MockElement {
    /// Selector the element answers to
    pub selector: String,
    /// Text content
    pub text: String,
    /// How long after a wait starts the element becomes visible
    pub appears_after: Duration,
}

/// Mock driver for unit testing
///
/// Waits are resolved on a simulated clock: an element that appears after
/// `d` satisfies any wait whose timeout is at least `d`, and stays present
/// from then on. Handles number only the elements present at call time.
#[derive(Debug, Default)]
pub struct MockDriver {
    elements: Vec<MockElement>,
    broken_selectors: Vec<String>,
    failing_navigation: bool,
    content: String,
    title: String,
    screenshot_data: Vec<u8>,
    current_url: Mutex<String>,
    clock: Mutex<Duration>,
    call_history: Mutex<Vec<String>>,
    closed: Mutex<bool>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element that is visible immediately
    #[must_use]
    pub fn with_element(self, selector: &str, text: &str) -> Self {
        self.with_delayed_element(selector, text, Duration::ZERO)
    }

    /// Add an element that becomes visible after `delay`
    #[must_use]
    pub fn with_delayed_element(mut self, selector: &str, text: &str, delay: Duration) -> Self {
        self.elements.push(MockElement {
            selector: selector.to_string(),
            text: text.to_string(),
            appears_after: delay,
        });
        self
    }

    /// Make every query for `selector` fail with a driver error
    #[must_use]
    pub fn with_broken_selector(mut self, selector: &str) -> Self {
        self.broken_selectors.push(selector.to_string());
        self
    }

    /// Make navigation fail
    #[must_use]
    pub const fn with_failing_navigation(mut self) -> Self {
        self.failing_navigation = true;
        self
    }

    /// Set page content
    #[must_use]
    pub fn with_content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    /// Set document title
    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Set mock screenshot bytes
    #[must_use]
    pub fn with_screenshot(mut self, data: Vec<u8>) -> Self {
        self.screenshot_data = data;
        self
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.call_history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.history().iter().any(|c| c.starts_with(method))
    }

    /// Last URL navigated to
    #[must_use]
    pub fn current_url(&self) -> String {
        self.current_url
            .lock()
            .map(|u| u.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(call);
        }
    }

    fn ensure_open(&self) -> SaucerResult<()> {
        match self.closed.lock() {
            Ok(closed) if *closed => Err(SaucerError::SessionClosed),
            Ok(_) => Ok(()),
            Err(_) => Err(SaucerError::driver("mock state poisoned")),
        }
    }

    fn check_selector(&self, selector: &str) -> SaucerResult<()> {
        if self.broken_selectors.iter().any(|s| s == selector) {
            return Err(SaucerError::driver(format!(
                "evaluation failed for '{selector}'"
            )));
        }
        Ok(())
    }

    fn matching(&self, selector: &str) -> impl Iterator<Item = &MockElement> {
        let selector = selector.to_string();
        self.elements.iter().filter(move |e| e.selector == selector)
    }

    fn now(&self) -> Duration {
        self.clock.lock().map(|c| *c).unwrap_or_default()
    }

    fn present(&self, selector: &str) -> impl Iterator<Item = &MockElement> {
        let now = self.now();
        self.matching(selector).filter(move |e| e.appears_after <= now)
    }

    fn resolve(&self, element: &ElementHandle) -> SaucerResult<&MockElement> {
        self.present(&element.selector)
            .nth(element.index)
            .ok_or_else(|| SaucerError::ElementNotFound {
                selector: element.selector.clone(),
            })
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&self, url: &str) -> SaucerResult<()> {
        self.ensure_open()?;
        self.record(format!("navigate:{url}"));
        if self.failing_navigation {
            return Err(SaucerError::NavigationError {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_REFUSED".to_string(),
            });
        }
        if let Ok(mut current) = self.current_url.lock() {
            *current = url.to_string();
        }
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> SaucerResult<ElementHandle> {
        self.ensure_open()?;
        self.check_selector(selector)?;
        self.record(format!("wait:{selector}"));
        let first = self
            .matching(selector)
            .filter(|e| e.appears_after <= timeout)
            .map(|e| e.appears_after)
            .min()
            .ok_or_else(|| SaucerError::timeout(selector, timeout))?;
        if let Ok(mut clock) = self.clock.lock() {
            *clock = (*clock).max(first);
        }
        let index = self
            .present(selector)
            .position(|e| e.appears_after <= first)
            .unwrap_or_default();
        Ok(ElementHandle::new(selector, index))
    }

    async fn query_selector_all(&self, selector: &str) -> SaucerResult<Vec<ElementHandle>> {
        self.ensure_open()?;
        self.check_selector(selector)?;
        self.record(format!("query:{selector}"));
        let count = self.present(selector).count();
        Ok(ElementHandle::all(selector, count))
    }

    async fn click(&self, element: &ElementHandle) -> SaucerResult<()> {
        self.ensure_open()?;
        let _ = self.resolve(element)?;
        self.record(format!("click:{}", element.selector));
        Ok(())
    }

    async fn fill(&self, element: &ElementHandle, text: &str) -> SaucerResult<()> {
        self.ensure_open()?;
        let _ = self.resolve(element)?;
        self.record(format!("fill:{}={text}", element.selector));
        Ok(())
    }

    async fn text_content(&self, element: &ElementHandle) -> SaucerResult<String> {
        self.ensure_open()?;
        Ok(self.resolve(element)?.text.clone())
    }

    async fn select_option(&self, selector: &str, value: &str) -> SaucerResult<()> {
        self.ensure_open()?;
        self.check_selector(selector)?;
        self.record(format!("select:{selector}={value}"));
        Ok(())
    }

    async fn content(&self) -> SaucerResult<String> {
        self.ensure_open()?;
        Ok(self.content.clone())
    }

    async fn title(&self) -> SaucerResult<String> {
        self.ensure_open()?;
        Ok(self.title.clone())
    }

    async fn screenshot(&self) -> SaucerResult<Vec<u8>> {
        self.ensure_open()?;
        self.record("screenshot".to_string());
        if self.screenshot_data.is_empty() {
            return Err(SaucerError::ScreenshotError {
                message: "No mock screenshot set".to_string(),
            });
        }
        Ok(self.screenshot_data.clone())
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> SaucerResult<()> {
        self.ensure_open()?;
        self.record("network_idle".to_string());
        Ok(())
    }

    async fn close(&self) -> SaucerResult<()> {
        self.record("close".to_string());
        if let Ok(mut closed) = self.closed.lock() {
            *closed = true;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod element_handle_tests {
        use super::*;

        #[test]
        fn test_element_handle_creation() {
            let elem = ElementHandle::new(".title", 2);
            assert_eq!(elem.selector, ".title");
            assert_eq!(elem.index, 2);
        }

        #[test]
        fn test_all_handles_are_positional() {
            let handles = ElementHandle::all(".cart_item", 3);
            assert_eq!(handles.len(), 3);
            assert_eq!(handles[2], ElementHandle::new(".cart_item", 2));
        }
    }

    mod mock_driver_tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_driver_navigate() {
            let driver = MockDriver::new();
            driver.navigate("https://example.com").await.unwrap();
            assert_eq!(driver.current_url(), "https://example.com");
            assert!(driver.was_called("navigate"));
        }

        #[tokio::test]
        async fn test_delayed_element_respects_timeout() {
            let driver =
                MockDriver::new().with_delayed_element("#late", "hi", Duration::from_secs(2));

            let err = driver
                .wait_for_selector("#late", Duration::from_secs(1))
                .await
                .unwrap_err();
            assert!(err.is_absence());

            let handle = driver
                .wait_for_selector("#late", Duration::from_secs(3))
                .await
                .unwrap();
            assert_eq!(handle.index, 0);
        }

        #[tokio::test]
        async fn test_broken_selector_is_not_absence() {
            let driver = MockDriver::new().with_broken_selector("::bad");
            let err = driver
                .wait_for_selector("::bad", Duration::from_secs(1))
                .await
                .unwrap_err();
            assert!(!err.is_absence());
        }

        #[tokio::test]
        async fn test_query_only_sees_present_elements() {
            let driver = MockDriver::new()
                .with_element(".item", "a")
                .with_element(".item", "b")
                .with_delayed_element(".item", "c", Duration::from_millis(10));

            let all = driver.query_selector_all(".item").await.unwrap();
            assert_eq!(all.len(), 2);
            let first = driver.query_selector(".item").await.unwrap().unwrap();
            assert_eq!(driver.text_content(&first).await.unwrap(), "a");
        }

        #[tokio::test]
        async fn test_handles_skip_elements_not_yet_present() {
            let driver = MockDriver::new()
                .with_delayed_element(".item", "late", Duration::from_secs(3))
                .with_element(".item", "present");

            let first = driver.query_selector(".item").await.unwrap().unwrap();
            assert_eq!(first.index, 0);
            assert_eq!(driver.text_content(&first).await.unwrap(), "present");

            let waited = driver
                .wait_for_selector(".item", Duration::from_secs(1))
                .await
                .unwrap();
            assert_eq!(driver.text_content(&waited).await.unwrap(), "present");
        }

        #[tokio::test]
        async fn test_waited_element_stays_present() {
            let driver = MockDriver::new()
                .with_delayed_element(".item", "late", Duration::from_secs(3))
                .with_element(".item", "present")
                .with_delayed_element("#banner", "sale", Duration::from_secs(3));

            assert_eq!(driver.query_selector_all(".item").await.unwrap().len(), 1);
            driver
                .wait_for_selector("#banner", Duration::from_secs(5))
                .await
                .unwrap();

            assert_eq!(driver.query_selector_all(".item").await.unwrap().len(), 2);
            let texts = [
                driver.text_content(&ElementHandle::new(".item", 0)).await.unwrap(),
                driver.text_content(&ElementHandle::new(".item", 1)).await.unwrap(),
            ];
            assert_eq!(texts, ["late", "present"]);
        }

        #[tokio::test]
        async fn test_closed_driver_rejects_calls() {
            let driver = MockDriver::new();
            driver.close().await.unwrap();
            let err = driver.navigate("https://example.com").await.unwrap_err();
            assert!(matches!(err, SaucerError::SessionClosed));
        }

        #[tokio::test]
        async fn test_missing_screenshot() {
            let driver = MockDriver::new();
            assert!(driver.screenshot().await.is_err());
        }
    }
}
