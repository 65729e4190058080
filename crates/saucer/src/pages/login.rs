//! Login screen.
//!
//! Submitting valid credentials leaves the screen for the inventory; invalid
//! ones keep the login button on screen and show an error banner. Either
//! signal is a valid way to detect a failed login.

use crate::config::{Config, Credentials};
use crate::driver::PageDriver;
use crate::page_object::{BasePage, PageObject};
use crate::result::SaucerResult;
use async_trait::async_trait;
use std::sync::Arc;

const USERNAME_INPUT: &str = r#"[data-test="username"]"#;
const PASSWORD_INPUT: &str = r#"[data-test="password"]"#;
const LOGIN_BUTTON: &str = r#"[data-test="login-button"]"#;
const ERROR_MESSAGE: &str = r#"[data-test="error"]"#;
const LOGO: &str = ".login_logo";

/// Login screen page object
#[derive(Debug, Clone)]
pub struct LoginPage {
    base: BasePage,
}

impl LoginPage {
    /// Bind to a driver and configuration
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, config: Arc<Config>) -> Self {
        Self::from_base(BasePage::new(driver, config))
    }

    /// Wrap an existing capability set
    #[must_use]
    pub const fn from_base(base: BasePage) -> Self {
        Self { base }
    }

    /// Open the base URL and wait for it to settle
    pub async fn navigate_to_login_page(&self) -> SaucerResult<()> {
        self.base.navigate(None).await?;
        self.base.wait_for_page_load().await
    }

    /// Type into the username field
    pub async fn enter_username(&self, username: &str) -> SaucerResult<()> {
        self.base.fill_element(USERNAME_INPUT, username).await
    }

    /// Type into the password field
    pub async fn enter_password(&self, password: &str) -> SaucerResult<()> {
        self.base.fill_element(PASSWORD_INPUT, password).await
    }

    /// Submit the form
    pub async fn click_login_button(&self) -> SaucerResult<()> {
        self.base.click_element(LOGIN_BUTTON).await
    }

    /// Fill both fields and submit
    pub async fn login_with_credentials(&self, username: &str, password: &str) -> SaucerResult<()> {
        self.enter_username(username).await?;
        self.enter_password(password).await?;
        self.click_login_button().await
    }

    /// Log in as the configured `valid_user`
    pub async fn login_with_valid_credentials(&self) -> SaucerResult<()> {
        let Credentials { username, password } = self.base.config().test_users.valid_user.clone();
        self.login_with_credentials(&username, &password).await
    }

    /// Log in as the configured `invalid_user`
    pub async fn login_with_invalid_credentials(&self) -> SaucerResult<()> {
        let Credentials { username, password } =
            self.base.config().test_users.invalid_user.clone();
        self.login_with_credentials(&username, &password).await
    }

    /// Whether the login button is on screen
    pub async fn is_login_button_visible(&self) -> SaucerResult<bool> {
        self.base.is_element_visible(LOGIN_BUTTON, None).await
    }

    /// Whether the error banner is on screen
    pub async fn is_error_message_displayed(&self) -> SaucerResult<bool> {
        self.base.is_element_visible(ERROR_MESSAGE, None).await
    }

    /// Text of the error banner (waits for it)
    pub async fn get_error_message(&self) -> SaucerResult<String> {
        self.base.get_text(ERROR_MESSAGE).await
    }

    /// Logo and login button are both visible
    pub async fn verify_login_page_loaded(&self) -> SaucerResult<bool> {
        Ok(self.base.is_element_visible(LOGO, None).await?
            && self.base.is_element_visible(LOGIN_BUTTON, None).await?)
    }
}

#[async_trait]
impl PageObject for LoginPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn path(&self) -> &str {
        ""
    }

    async fn is_loaded(&self) -> SaucerResult<bool> {
        self.verify_login_page_loaded().await
    }
}
