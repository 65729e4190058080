//! Page Object Model Support
//!
//! [`BasePage`] is the shared capability set every screen is built from:
//! navigation, waiting, clicking, filling, reading text, visibility checks,
//! text checks and screenshots. Screen types hold a `BasePage` rather than
//! inheriting from it, and implement [`PageObject`] on top.
//!
//! Operations come in two kinds that are never mixed:
//! - actions (`navigate`, `click_element`, `fill_element`) change application state
//! - checks (`is_*`, `get_*`, `verify_*`) only read it
//!
//! Nothing is cached: every call resolves its selector against the live page.

use crate::config::Config;
use crate::driver::{ElementHandle, PageDriver};
use crate::result::SaucerResult;
use crate::screenshot::ScreenshotStore;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Shared capability set bound to one driver handle and one config snapshot
#[derive(Debug, Clone)]
pub struct BasePage {
    driver: Arc<dyn PageDriver>,
    config: Arc<Config>,
    screenshots: ScreenshotStore,
}

impl BasePage {
    /// Bind to a driver and configuration
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, config: Arc<Config>) -> Self {
        let screenshots = ScreenshotStore::new(config.screenshots_dir.clone());
        Self {
            driver,
            config,
            screenshots,
        }
    }

    /// The driver handle
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn PageDriver> {
        &self.driver
    }

    /// The configuration snapshot
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Screenshot directory
    #[must_use]
    pub const fn screenshots(&self) -> &ScreenshotStore {
        &self.screenshots
    }

    /// Navigate to `url`, or to the configured base URL when `None`
    pub async fn navigate(&self, url: Option<&str>) -> SaucerResult<()> {
        let url = url.unwrap_or(self.config.base_url.as_str());
        debug!(url, "navigate");
        self.driver.navigate(url).await?;
        self.pace().await;
        Ok(())
    }

    /// Wait for an element to be visible
    ///
    /// `None` uses the configured default timeout. A timeout is an error.
    pub async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Option<Duration>,
    ) -> SaucerResult<ElementHandle> {
        let timeout = timeout.unwrap_or_else(|| self.config.default_timeout());
        debug!(selector, timeout_ms = timeout.as_millis() as u64, "wait for element");
        self.driver.wait_for_selector(selector, timeout).await
    }

    /// Wait for an element, then click it
    pub async fn click_element(&self, selector: &str) -> SaucerResult<()> {
        let element = self.wait_for_element(selector, None).await?;
        debug!(selector, "click");
        self.driver.click(&element).await?;
        self.pace().await;
        Ok(())
    }

    /// Wait for an input, then replace its value
    pub async fn fill_element(&self, selector: &str, text: &str) -> SaucerResult<()> {
        let element = self.wait_for_element(selector, None).await?;
        debug!(selector, "fill");
        self.driver.fill(&element, text).await?;
        self.pace().await;
        Ok(())
    }

    /// Wait for an element, then read its text content
    pub async fn get_text(&self, selector: &str) -> SaucerResult<String> {
        let element = self.wait_for_element(selector, None).await?;
        self.driver.text_content(&element).await
    }

    /// Whether an element becomes visible within the check budget
    ///
    /// `None` uses `wait_time` seconds. Only absence (timeout or vanished
    /// element) turns into `false`; any other driver failure is returned.
    pub async fn is_element_visible(
        &self,
        selector: &str,
        timeout: Option<Duration>,
    ) -> SaucerResult<bool> {
        let timeout = timeout.unwrap_or_else(|| self.config.visibility_timeout());
        match self.driver.wait_for_selector(selector, timeout).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_absence() => {
                debug!(selector, "not visible: {e}");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Case-sensitive substring check over the rendered page
    pub async fn verify_page_contains_text(&self, text: &str) -> SaucerResult<bool> {
        Ok(self.driver.content().await?.contains(text))
    }

    /// Save a screenshot as `<screenshots_dir>/<name>.png`
    pub async fn take_screenshot(&self, name: &str) -> SaucerResult<PathBuf> {
        let png = self.driver.screenshot().await?;
        let path = self.screenshots.path_for(name);
        self.screenshots.write(&path, &png)?;
        Ok(path)
    }

    /// Document title
    pub async fn get_page_title(&self) -> SaucerResult<String> {
        self.driver.title().await
    }

    /// Wait until the network has gone quiet
    pub async fn wait_for_page_load(&self) -> SaucerResult<()> {
        self.driver
            .wait_for_network_idle(self.config.default_timeout())
            .await
    }

    /// All elements currently matching `selector`, without waiting
    pub async fn query_all(&self, selector: &str) -> SaucerResult<Vec<ElementHandle>> {
        self.driver.query_selector_all(selector).await
    }

    /// First element currently matching `selector`, without waiting
    pub async fn query_first(&self, selector: &str) -> SaucerResult<Option<ElementHandle>> {
        self.driver.query_selector(selector).await
    }

    /// Number of elements currently matching `selector`
    pub async fn count(&self, selector: &str) -> SaucerResult<usize> {
        Ok(self.query_all(selector).await?.len())
    }

    /// Text of every element matching `selector`, in DOM order
    pub async fn texts(&self, selector: &str) -> SaucerResult<Vec<String>> {
        let mut texts = Vec::new();
        for element in self.query_all(selector).await? {
            texts.push(self.driver.text_content(&element).await?);
        }
        Ok(texts)
    }

    /// Click the first match if there is one; no-op otherwise
    pub async fn click_first(&self, selector: &str) -> SaucerResult<bool> {
        match self.query_first(selector).await? {
            Some(element) => {
                debug!(selector, "click first");
                self.driver.click(&element).await?;
                self.pace().await;
                Ok(true)
            }
            None => {
                debug!(selector, "nothing to click");
                Ok(false)
            }
        }
    }

    /// Join a path onto the configured base URL
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.is_empty() {
            return self.config.base_url.clone();
        }
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn pace(&self) {
        if self.config.slow_mo > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.slow_mo)).await;
        }
    }
}

/// Trait for page objects representing one screen of the shop.
///
/// # Example
///
/// ```ignore
/// struct CheckoutPage {
///     base: BasePage,
/// }
///
/// #[async_trait]
/// impl PageObject for CheckoutPage {
///     fn base(&self) -> &BasePage {
///         &self.base
///     }
///
///     fn path(&self) -> &str {
///         "checkout-step-one.html"
///     }
///
///     async fn is_loaded(&self) -> SaucerResult<bool> {
///         self.base.is_element_visible("[data-test=\"firstName\"]", None).await
///     }
/// }
/// ```
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Shared capability set
    fn base(&self) -> &BasePage;

    /// Path of the screen relative to the base URL
    fn path(&self) -> &str;

    /// Check if the screen is showing and ready for interaction
    async fn is_loaded(&self) -> SaucerResult<bool>;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Absolute URL of the screen
    fn url(&self) -> String {
        self.base().url_for(self.path())
    }

    /// Navigate straight to the screen and wait for it to settle
    async fn open(&self) -> SaucerResult<()> {
        let url = self.url();
        self.base().navigate(Some(&url)).await?;
        self.base().wait_for_page_load().await
    }
}
