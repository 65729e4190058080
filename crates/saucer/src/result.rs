//! Result and error types for Saucer.

use std::time::Duration;
use thiserror::Error;

/// Result type for Saucer operations
pub type SaucerResult<T> = Result<T, SaucerError>;

/// Errors that can occur in Saucer
#[derive(Debug, Error)]
pub enum SaucerError {
    /// Crate was built without the `browser` feature
    #[error("Real browser control not available. Rebuild with --features browser")]
    BrowserNotAvailable,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Browser kind configured but not drivable
    #[error("Browser '{browser}' is not supported by this driver")]
    UnsupportedBrowser {
        /// Configured browser name
        browser: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Element did not become visible in time
    #[error("Timed out after {ms}ms waiting for '{selector}'")]
    Timeout {
        /// Selector that was waited on
        selector: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Element handle no longer resolves on the page
    #[error("No element matches '{selector}'")]
    ElementNotFound {
        /// Selector that matched nothing
        selector: String,
    },

    /// Driver-level failure unrelated to element presence
    #[error("Driver error: {message}")]
    DriverError {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    ScreenshotError {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Scenario assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Operation attempted after the session was closed
    #[error("Browser session already closed")]
    SessionClosed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SaucerError {
    /// Build a timeout error for a selector
    #[must_use]
    pub fn timeout(selector: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            selector: selector.into(),
            ms: timeout.as_millis() as u64,
        }
    }

    /// Build a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::DriverError {
            message: message.into(),
        }
    }

    /// Build a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True when the error only means "the element is not there".
    ///
    /// This is the one condition a visibility check may turn into `false`.
    #[must_use]
    pub const fn is_absence(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::ElementNotFound { .. })
    }
}
