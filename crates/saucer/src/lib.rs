//! Saucer: Page Objects and Scenarios for the Swag Labs Demo Shop
//!
//! Saucer drives the shop's login, inventory and cart screens through page
//! objects that sit on top of an abstract [`PageDriver`]. The same page
//! objects run against a real Chromium (feature `browser`) or against the
//! in-process [`Storefront`] replica.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    SAUCER Architecture                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │    │ Page       │    │ PageDriver │            │
//! │   │ Catalog /  │───►│ Objects    │───►│ chromium / │            │
//! │   │ Features   │    │ (BasePage) │    │ storefront │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use saucer::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn demo() -> SaucerResult<()> {
//! let config = Arc::new(Config::new(DEMO_BASE_URL));
//! let session = Session::launch(DriverKind::Offline, config).await?;
//! session
//!     .run("valid_login", |s| async move {
//!         let login = s.login_page();
//!         login.navigate_to_login_page().await?;
//!         login.login_with_valid_credentials().await?;
//!         ensure(s.products_page().verify_products_page_loaded().await?, "not on inventory")
//!     })
//!     .await
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc)]
pub mod browser;
pub mod config;
#[allow(clippy::missing_errors_doc)]
pub mod driver;
pub mod locator;
#[allow(clippy::missing_errors_doc)]
pub mod page_object;
#[allow(clippy::missing_errors_doc)]
pub mod pages;
mod result;
#[allow(clippy::missing_errors_doc)]
pub mod scenario;
pub mod screenshot;
#[allow(clippy::missing_errors_doc)]
pub mod session;
#[allow(clippy::missing_errors_doc)]
pub mod storefront;
pub mod tracing_support;

#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use config::{BrowserKind, Config, Credentials, TestUsers, Viewport, DEMO_BASE_URL};
pub use driver::{ElementHandle, MockDriver, MockElement, PageDriver};
pub use locator::{add_to_cart_button, remove_button, slugify, Selector};
pub use page_object::{BasePage, PageObject};
pub use pages::{CartPage, LoginPage, ProductsPage, SortOrder};
pub use result::{SaucerError, SaucerResult};
pub use scenario::{
    catalog, ensure, run_catalog, CatalogResults, Scenario, ScenarioFilter, ScenarioOutcome, Tag,
};
pub use screenshot::ScreenshotStore;
pub use session::{DriverKind, Session};
pub use storefront::Storefront;
pub use tracing_support::{init_test_tracing, init_tracing};

/// Prelude for convenient imports
pub mod prelude {
    #[cfg(feature = "browser")]
    pub use super::browser::*;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::locator::*;
    pub use super::page_object::*;
    pub use super::pages::*;
    pub use super::result::*;
    pub use super::scenario::*;
    pub use super::screenshot::*;
    pub use super::session::*;
    pub use super::storefront::{Storefront, ACCEPTED_USERS, CATALOG, DEMO_PASSWORD};
    pub use super::tracing_support::*;
}
