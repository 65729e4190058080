//! Run configuration.
//!
//! Loaded once per run from a YAML document and shared read-only (behind an
//! `Arc`) by every page object of every test. Only `base_url` is required;
//! everything else falls back to the documented defaults.
//!
//! ```yaml
//! base_url: "https://www.saucedemo.com/"
//! browser: chromium
//! headless: true
//! timeout: 30000      # milliseconds
//! wait_time: 5        # seconds
//! test_users:
//!   valid_user:
//!     username: standard_user
//!     password: secret_sauce
//! ```

use crate::result::{SaucerError, SaucerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default element timeout (30 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default visibility check budget (5 seconds)
pub const DEFAULT_WAIT_TIME_SECS: u64 = 5;

/// Public Swag Labs demo shop
pub const DEMO_BASE_URL: &str = "https://www.saucedemo.com/";

/// Browser engine to launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Chromium / Chrome
    #[default]
    Chromium,
    /// Firefox
    Firefox,
    /// WebKit
    Webkit,
}

impl BrowserKind {
    /// Lowercase name as written in the config file
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Firefox => "firefox",
            Self::Webkit => "webkit",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Username/password pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login name
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create a credential pair
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Named credential sets used by the login shortcuts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestUsers {
    /// Account that can log in
    #[serde(default = "default_valid_user")]
    pub valid_user: Credentials,
    /// Account that must be rejected
    #[serde(default = "default_invalid_user")]
    pub invalid_user: Credentials,
}

impl Default for TestUsers {
    fn default() -> Self {
        Self {
            valid_user: default_valid_user(),
            invalid_user: default_invalid_user(),
        }
    }
}

fn default_valid_user() -> Credentials {
    Credentials::new("standard_user", "secret_sauce")
}

fn default_invalid_user() -> Credentials {
    Credentials::new("standard_use", "secret_sauce")
}

/// Browser window size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Immutable configuration snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Landing URL of the shop under test
    pub base_url: String,
    /// Browser engine
    #[serde(default)]
    pub browser: BrowserKind,
    /// Run without a visible window
    #[serde(default)]
    pub headless: bool,
    /// Element timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Visibility check budget in seconds
    #[serde(default = "default_wait_time")]
    pub wait_time: u64,
    /// Keep a video of failing tests
    #[serde(default)]
    pub video_on_failure: bool,
    /// Credential sets
    #[serde(default)]
    pub test_users: TestUsers,
    /// Browser window size
    #[serde(default)]
    pub viewport: Viewport,
    /// Delay between driver operations in milliseconds
    #[serde(default)]
    pub slow_mo: u64,
    /// Where screenshots are written
    #[serde(default = "default_screenshots_dir")]
    pub screenshots_dir: PathBuf,
    /// Where failure videos are written
    #[serde(default = "default_videos_dir")]
    pub videos_dir: PathBuf,
}

const fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

const fn default_wait_time() -> u64 {
    DEFAULT_WAIT_TIME_SECS
}

fn default_screenshots_dir() -> PathBuf {
    PathBuf::from("screenshots")
}

fn default_videos_dir() -> PathBuf {
    PathBuf::from("videos")
}

impl Config {
    /// Configuration with defaults for everything but the base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            browser: BrowserKind::default(),
            headless: false,
            timeout: DEFAULT_TIMEOUT_MS,
            wait_time: DEFAULT_WAIT_TIME_SECS,
            video_on_failure: false,
            test_users: TestUsers::default(),
            viewport: Viewport::default(),
            slow_mo: 0,
            screenshots_dir: default_screenshots_dir(),
            videos_dir: default_videos_dir(),
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> SaucerResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| SaucerError::config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    pub fn load(path: impl AsRef<Path>) -> SaucerResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            SaucerError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&yaml)
    }

    /// Render back to YAML
    pub fn to_yaml(&self) -> SaucerResult<String> {
        serde_yaml_ng::to_string(self).map_err(|e| SaucerError::config(e.to_string()))
    }

    fn validate(&self) -> SaucerResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(SaucerError::config("base_url must not be empty"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SaucerError::config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.timeout == 0 {
            return Err(SaucerError::config("timeout must be positive"));
        }
        Ok(())
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the element timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = timeout_ms;
        self
    }

    /// Set the visibility check budget in seconds
    #[must_use]
    pub const fn with_wait_time(mut self, seconds: u64) -> Self {
        self.wait_time = seconds;
        self
    }

    /// Set the screenshot directory
    #[must_use]
    pub fn with_screenshots_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshots_dir = dir.into();
        self
    }

    /// Timeout for waits that must succeed
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Budget for visibility checks
    #[must_use]
    pub const fn visibility_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_time)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_minimal_document_gets_defaults() {
            let config = Config::from_yaml("base_url: https://www.saucedemo.com/").unwrap();

            assert_eq!(config.base_url, "https://www.saucedemo.com/");
            assert_eq!(config.browser, BrowserKind::Chromium);
            assert!(!config.headless);
            assert_eq!(config.timeout, 30_000);
            assert_eq!(config.wait_time, 5);
            assert!(!config.video_on_failure);
            assert_eq!(config.test_users.valid_user.username, "standard_user");
            assert_eq!(config.test_users.invalid_user.username, "standard_use");
            assert_eq!(config.viewport, Viewport::default());
        }

        #[test]
        fn test_full_document() {
            let yaml = r#"
base_url: "http://localhost:3000/"
browser: firefox
headless: true
timeout: 10000
wait_time: 2
video_on_failure: true
test_users:
  valid_user:
    username: problem_user
    password: secret_sauce
  invalid_user:
    username: nobody
    password: nothing
viewport:
  width: 800
  height: 600
"#;
            let config = Config::from_yaml(yaml).unwrap();

            assert_eq!(config.browser, BrowserKind::Firefox);
            assert!(config.headless);
            assert_eq!(config.default_timeout(), Duration::from_millis(10_000));
            assert_eq!(config.visibility_timeout(), Duration::from_secs(2));
            assert_eq!(
                config.test_users.invalid_user,
                Credentials::new("nobody", "nothing")
            );
            assert_eq!(config.viewport.width, 800);
        }

        #[test]
        fn test_partial_test_users() {
            let yaml = "base_url: https://x.test/\ntest_users:\n  valid_user:\n    username: a\n    password: b\n";
            let config = Config::from_yaml(yaml).unwrap();
            assert_eq!(config.test_users.valid_user, Credentials::new("a", "b"));
            assert_eq!(config.test_users.invalid_user.username, "standard_use");
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn test_missing_base_url_rejected() {
            let err = Config::from_yaml("headless: true").unwrap_err();
            assert!(matches!(err, SaucerError::Config { .. }));
        }

        #[test]
        fn test_empty_base_url_rejected() {
            assert!(Config::from_yaml("base_url: ''").is_err());
        }

        #[test]
        fn test_non_http_base_url_rejected() {
            let err = Config::from_yaml("base_url: ftp://example.com").unwrap_err();
            assert!(err.to_string().contains("http"));
        }

        #[test]
        fn test_unknown_browser_rejected() {
            assert!(Config::from_yaml("base_url: https://x.test/\nbrowser: netscape").is_err());
        }
    }

    mod file_tests {
        use super::*;

        #[test]
        fn test_load_from_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.yaml");
            std::fs::write(&path, "base_url: https://www.saucedemo.com/\nwait_time: 1\n").unwrap();

            let config = Config::load(&path).unwrap();
            assert_eq!(config.wait_time, 1);
        }

        #[test]
        fn test_load_missing_file() {
            let err = Config::load("/definitely/not/here.yaml").unwrap_err();
            assert!(err.to_string().contains("cannot read"));
        }

        #[test]
        fn test_yaml_roundtrip_preserves_values() {
            let config = Config::new(DEMO_BASE_URL).with_headless(true).with_wait_time(3);
            let reparsed = Config::from_yaml(&config.to_yaml().unwrap()).unwrap();
            assert_eq!(reparsed, config);
        }
    }

    #[test]
    fn test_browser_kind_display() {
        assert_eq!(BrowserKind::Webkit.to_string(), "webkit");
        assert_eq!(BrowserKind::default().as_str(), "chromium");
    }
}
