//! One browser session per test.
//!
//! A [`Session`] owns a driver handle and a configuration snapshot for the
//! whole duration of one test and hands out page objects bound to them.
//! [`Session::run`] is the scoped-resource wrapper: whatever way the test
//! body ends, a failure screenshot is attempted when it did not succeed and
//! the driver is closed.

use crate::config::Config;
use crate::driver::PageDriver;
use crate::pages::{CartPage, LoginPage, ProductsPage};
use crate::result::SaucerResult;
use crate::screenshot::ScreenshotStore;
use crate::storefront::Storefront;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Which driver backs a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// In-process replica of the shop
    #[default]
    Offline,
    /// Real Chromium over CDP (feature `browser`)
    Chromium,
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Offline => "offline",
            Self::Chromium => "chromium",
        })
    }
}

/// Driver handle plus configuration for one test
#[derive(Debug, Clone)]
pub struct Session {
    driver: Arc<dyn PageDriver>,
    config: Arc<Config>,
    screenshots: ScreenshotStore,
}

impl Session {
    /// Wrap an existing driver
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, config: Arc<Config>) -> Self {
        let screenshots = ScreenshotStore::new(config.screenshots_dir.clone());
        Self {
            driver,
            config,
            screenshots,
        }
    }

    /// Start a fresh driver of the given kind
    ///
    /// # Errors
    ///
    /// Launch failures, or [`crate::SaucerError::BrowserNotAvailable`] when asking
    /// for Chromium in a build without the `browser` feature.
    pub async fn launch(kind: DriverKind, config: Arc<Config>) -> SaucerResult<Self> {
        let driver: Arc<dyn PageDriver> = match kind {
            DriverKind::Offline => Arc::new(Storefront::new(&config.base_url)),
            DriverKind::Chromium => launch_chromium(&config).await?,
        };
        if config.video_on_failure {
            warn!("video recording is not supported by any driver; video_on_failure ignored");
        }
        info!(driver = %kind, base_url = %config.base_url, "session started");
        Ok(Self::new(driver, config))
    }

    /// The driver handle
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn PageDriver> {
        &self.driver
    }

    /// The configuration snapshot
    #[must_use]
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Login page bound to this session
    #[must_use]
    pub fn login_page(&self) -> LoginPage {
        LoginPage::new(self.driver.clone(), self.config.clone())
    }

    /// Inventory page bound to this session
    #[must_use]
    pub fn products_page(&self) -> ProductsPage {
        ProductsPage::new(self.driver.clone(), self.config.clone())
    }

    /// Cart page bound to this session
    #[must_use]
    pub fn cart_page(&self) -> CartPage {
        CartPage::new(self.driver.clone(), self.config.clone())
    }

    /// Save `failure_<test>_<timestamp>.png`
    pub async fn capture_failure(&self, test_name: &str) -> SaucerResult<PathBuf> {
        let png = self.driver.screenshot().await?;
        let path = self.screenshots.failure_path(test_name);
        self.screenshots.write(&path, &png)?;
        Ok(path)
    }

    /// Close the driver
    pub async fn close(&self) -> SaucerResult<()> {
        self.driver.close().await
    }

    /// Teardown for a test that ran outside [`Session::run`]
    ///
    /// Takes the failure screenshot when `failed` (problems are only logged),
    /// then closes the driver and returns the close result.
    pub async fn finish(&self, test_name: &str, failed: bool) -> SaucerResult<()> {
        if failed {
            match self.capture_failure(test_name).await {
                Ok(path) => info!(test = test_name, path = %path.display(), "failure screenshot saved"),
                Err(e) => warn!(test = test_name, "failed to take screenshot: {e}"),
            }
        }
        self.close().await
    }

    /// Run a test body with guaranteed teardown
    ///
    /// On error or panic a failure screenshot is attempted; problems taking
    /// it are logged and never replace the body's outcome. The driver is
    /// closed on every path. A panic is resumed after teardown. A close
    /// error is only returned when the body itself succeeded.
    pub async fn run<F, Fut, T>(self, test_name: &str, body: F) -> SaucerResult<T>
    where
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = SaucerResult<T>>,
    {
        let outcome = AssertUnwindSafe(body(self.clone())).catch_unwind().await;
        let closed = self.finish(test_name, !matches!(outcome, Ok(Ok(_)))).await;
        match outcome {
            Ok(Ok(value)) => {
                info!(test = test_name, "session finished");
                closed.map(|()| value)
            }
            Ok(Err(e)) => {
                if let Err(close_err) = closed {
                    warn!(test = test_name, "close after failure: {close_err}");
                }
                Err(e)
            }
            Err(panic) => {
                if let Err(close_err) = closed {
                    warn!(test = test_name, "close after panic: {close_err}");
                }
                std::panic::resume_unwind(panic)
            }
        }
    }
}

#[cfg(feature = "browser")]
async fn launch_chromium(config: &Config) -> SaucerResult<Arc<dyn PageDriver>> {
    let driver = crate::browser::ChromiumDriver::launch(config).await?;
    Ok(Arc::new(driver))
}

#[cfg(not(feature = "browser"))]
#[allow(clippy::unused_async)]
async fn launch_chromium(_config: &Config) -> SaucerResult<Arc<dyn PageDriver>> {
    Err(crate::result::SaucerError::BrowserNotAvailable)
}
