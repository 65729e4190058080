//! Real browser driver over the Chrome DevTools Protocol.
//!
//! Only compiled with the `browser` feature. Element handles are resolved in
//! page script (`querySelectorAll(selector)[index]`) on every call, so no
//! remote node ids are held between operations.

use crate::config::{BrowserKind, Config};
use crate::driver::{ElementHandle, PageDriver};
use crate::result::{SaucerError, SaucerResult};
use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const NETWORK_SETTLE: Duration = Duration::from_millis(500);

/// Chromium instance with a single page
#[derive(Debug)]
pub struct ChromiumDriver {
    browser: Mutex<CdpBrowser>,
    page: Mutex<CdpPage>,
    #[allow(dead_code)]
    handle: tokio::task::JoinHandle<()>,
    closed: AtomicBool,
}

impl ChromiumDriver {
    /// Launch a browser per `config` and open a blank page
    ///
    /// # Errors
    ///
    /// [`SaucerError::UnsupportedBrowser`] for anything but chromium,
    /// [`SaucerError::BrowserLaunchError`] when the process cannot start.
    pub async fn launch(config: &Config) -> SaucerResult<Self> {
        if config.browser != BrowserKind::Chromium {
            return Err(SaucerError::UnsupportedBrowser {
                browser: config.browser.to_string(),
            });
        }

        let mut builder =
            CdpConfig::builder().window_size(config.viewport.width, config.viewport.height);
        if !config.headless {
            builder = builder.with_head();
        }
        let cdp_config = builder
            .build()
            .map_err(|e| SaucerError::BrowserLaunchError { message: e })?;

        let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
            SaucerError::BrowserLaunchError {
                message: e.to_string(),
            }
        })?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SaucerError::BrowserLaunchError {
                message: e.to_string(),
            })?;

        info!(
            headless = config.headless,
            width = config.viewport.width,
            height = config.viewport.height,
            "chromium launched"
        );

        Ok(Self {
            browser: Mutex::new(browser),
            page: Mutex::new(page),
            handle,
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> SaucerResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(SaucerError::SessionClosed)
        } else {
            Ok(())
        }
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> SaucerResult<T> {
        self.ensure_open()?;
        let page = self.page.lock().await;
        let result = page
            .evaluate(script)
            .await
            .map_err(|e| SaucerError::driver(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| SaucerError::driver(e.to_string()))
    }

    /// Run `body` against the resolved element `el`; the script yields
    /// `false` when the handle no longer resolves.
    async fn with_element(&self, element: &ElementHandle, body: &str) -> SaucerResult<()> {
        let script = format!(
            "(() => {{ const el = document.querySelectorAll({sel})[{idx}]; \
             if (!el) {{ return false; }} {body} return true; }})()",
            sel = js_string(&element.selector)?,
            idx = element.index,
        );
        if self.eval::<bool>(script).await? {
            Ok(())
        } else {
            Err(SaucerError::ElementNotFound {
                selector: element.selector.clone(),
            })
        }
    }
}

fn js_string(value: &str) -> SaucerResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn visible_index_script(selector: &str) -> SaucerResult<String> {
    Ok(format!(
        "Array.from(document.querySelectorAll({})).findIndex(e => {{ \
         const r = e.getBoundingClientRect(); const s = getComputedStyle(e); \
         return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; }})",
        js_string(selector)?
    ))
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> SaucerResult<()> {
        self.ensure_open()?;
        let page = self.page.lock().await;
        page.goto(url)
            .await
            .map_err(|e| SaucerError::NavigationError {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> SaucerResult<ElementHandle> {
        let script = visible_index_script(selector)?;
        let deadline = Instant::now() + timeout;
        loop {
            let index: i64 = self.eval(script.clone()).await?;
            if let Ok(index) = usize::try_from(index) {
                return Ok(ElementHandle::new(selector, index));
            }
            if Instant::now() >= deadline {
                return Err(SaucerError::timeout(selector, timeout));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn query_selector_all(&self, selector: &str) -> SaucerResult<Vec<ElementHandle>> {
        let script = format!("document.querySelectorAll({}).length", js_string(selector)?);
        let count: usize = self.eval(script).await?;
        Ok(ElementHandle::all(selector, count))
    }

    async fn click(&self, element: &ElementHandle) -> SaucerResult<()> {
        self.with_element(element, "el.click();").await
    }

    async fn fill(&self, element: &ElementHandle, text: &str) -> SaucerResult<()> {
        // React inputs only notice values written through the native setter.
        let body = format!(
            "const setter = Object.getOwnPropertyDescriptor(HTMLInputElement.prototype, 'value').set; \
             el.focus(); setter.call(el, {}); \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }}));",
            js_string(text)?
        );
        self.with_element(element, &body).await
    }

    async fn text_content(&self, element: &ElementHandle) -> SaucerResult<String> {
        let script = format!(
            "(() => {{ const el = document.querySelectorAll({})[{}]; \
             return el ? (el.textContent || '') : null; }})()",
            js_string(&element.selector)?,
            element.index
        );
        self.eval::<Option<String>>(script)
            .await?
            .ok_or_else(|| SaucerError::ElementNotFound {
                selector: element.selector.clone(),
            })
    }

    async fn select_option(&self, selector: &str, value: &str) -> SaucerResult<()> {
        let body = format!(
            "const setter = Object.getOwnPropertyDescriptor(HTMLSelectElement.prototype, 'value').set; \
             setter.call(el, {v}); if (el.value !== {v}) {{ return false; }} \
             el.dispatchEvent(new Event('change', {{ bubbles: true }}));",
            v = js_string(value)?
        );
        debug!(selector, value, "select option");
        self.with_element(&ElementHandle::new(selector, 0), &body)
            .await
            .map_err(|e| match e {
                SaucerError::ElementNotFound { .. } => SaucerError::driver(format!(
                    "'{selector}' has no option with value '{value}'"
                )),
                other => other,
            })
    }

    async fn content(&self) -> SaucerResult<String> {
        self.ensure_open()?;
        let page = self.page.lock().await;
        page.content()
            .await
            .map_err(|e| SaucerError::driver(e.to_string()))
    }

    async fn title(&self) -> SaucerResult<String> {
        self.ensure_open()?;
        let page = self.page.lock().await;
        let title = page
            .get_title()
            .await
            .map_err(|e| SaucerError::driver(e.to_string()))?;
        Ok(title.unwrap_or_default())
    }

    async fn screenshot(&self) -> SaucerResult<Vec<u8>> {
        self.ensure_open()?;
        let page = self.page.lock().await;
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();

        let screenshot = page
            .execute(params)
            .await
            .map_err(|e| SaucerError::ScreenshotError {
                message: e.to_string(),
            })?;

        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| SaucerError::ScreenshotError {
                message: e.to_string(),
            })
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> SaucerResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let complete: bool = self
                .eval("document.readyState === 'complete'".to_string())
                .await?;
            if complete {
                break;
            }
            if Instant::now() >= deadline {
                return Err(SaucerError::timeout("document.readyState", timeout));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        tokio::time::sleep(NETWORK_SETTLE).await;
        Ok(())
    }

    async fn close(&self) -> SaucerResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map_err(|e| SaucerError::driver(e.to_string()))?;
        info!("chromium closed");
        Ok(())
    }
}
