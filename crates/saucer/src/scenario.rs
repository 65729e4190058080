//! Built-in scenario catalog.
//!
//! Six end-to-end checks of the shop, each identified by a test-case id
//! (`TC_AUTH_01`, ...). Tags are derived from the id the same way for every
//! scenario, so selecting `--tag cart` or `--tag smoke` needs no bookkeeping.
//!
//! Verifications return `bool`; [`ensure`] turns a `false` into
//! [`SaucerError::AssertionFailed`] so a scenario body reads as a list of
//! `?`-chained steps.

use crate::config::Config;
use crate::page_object::PageObject;
use crate::result::{SaucerError, SaucerResult};
use crate::session::{DriverKind, Session};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Scenario ids that make up the smoke suite
const SMOKE_IDS: [&str; 4] = ["tc_auth_01", "tc_auth_02", "tc_inv_01", "tc_cart_01"];

/// Scenario category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    /// Authentication related
    Auth,
    /// Inventory related
    Inventory,
    /// Cart related
    Cart,
    /// Part of the smoke suite
    Smoke,
}

impl Tag {
    /// Every tag
    pub const ALL: [Self; 4] = [Self::Auth, Self::Inventory, Self::Cart, Self::Smoke];

    /// Lowercase tag name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Inventory => "inventory",
            Self::Cart => "cart",
            Self::Smoke => "smoke",
        }
    }

    /// Tags implied by a scenario id (case-insensitive substring rules)
    #[must_use]
    pub fn infer(id: &str) -> Vec<Self> {
        let id = id.to_lowercase();
        let mut tags = Vec::new();
        if id.contains("auth") {
            tags.push(Self::Auth);
        }
        if id.contains("inventory") || id.contains("inv") {
            tags.push(Self::Inventory);
        }
        if id.contains("cart") {
            tags.push(Self::Cart);
        }
        if SMOKE_IDS.iter().any(|smoke| id.contains(smoke)) {
            tags.push(Self::Smoke);
        }
        tags
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = SaucerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SaucerError::config(format!("unknown tag '{s}'")))
    }
}

/// Turn a failed verification into an assertion error
pub fn ensure(condition: bool, message: impl Into<String>) -> SaucerResult<()> {
    if condition {
        Ok(())
    } else {
        Err(SaucerError::AssertionFailed {
            message: message.into(),
        })
    }
}

/// Boxed scenario body
pub type ScenarioFuture = Pin<Box<dyn Future<Output = SaucerResult<()>> + Send>>;

/// One catalog entry
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Test-case id, e.g. `TC_AUTH_01`
    pub id: &'static str,
    /// Human-readable title
    pub title: &'static str,
    body: fn(Session) -> ScenarioFuture,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("id", &self.id)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    /// Tags derived from the id
    #[must_use]
    pub fn tags(&self) -> Vec<Tag> {
        Tag::infer(self.id)
    }

    /// Run the body against `session` (no teardown; see [`Session::run`])
    pub async fn execute(&self, session: Session) -> SaucerResult<()> {
        (self.body)(session).await
    }
}

static CATALOG: [Scenario; 6] = [
    Scenario {
        id: "TC_AUTH_01",
        title: "Login with valid credentials",
        body: |s| Box::pin(valid_login(s)),
    },
    Scenario {
        id: "TC_AUTH_02",
        title: "Login with invalid credentials",
        body: |s| Box::pin(invalid_login(s)),
    },
    Scenario {
        id: "TC_INV_01",
        title: "Product listing is displayed",
        body: |s| Box::pin(product_listing(s)),
    },
    Scenario {
        id: "TC_INV_02",
        title: "Sort products by name (A to Z)",
        body: |s| Box::pin(sort_a_to_z(s)),
    },
    Scenario {
        id: "TC_CART_01",
        title: "Add a product and view the cart",
        body: |s| Box::pin(view_cart(s)),
    },
    Scenario {
        id: "TC_CART_02",
        title: "Removing the only item empties the cart",
        body: |s| Box::pin(remove_item(s)),
    },
];

/// Every built-in scenario, in id order
#[must_use]
pub fn catalog() -> &'static [Scenario] {
    &CATALOG
}

async fn logged_in(session: &Session) -> SaucerResult<()> {
    let login = session.login_page();
    login.navigate_to_login_page().await?;
    ensure(login.verify_login_page_loaded().await?, "Login page did not load properly")?;
    login.login_with_valid_credentials().await
}

async fn valid_login(session: Session) -> SaucerResult<()> {
    logged_in(&session).await?;
    ensure(
        session.login_page().base().verify_page_contains_text("Products").await?,
        "Page does not contain text: Products",
    )
}

async fn invalid_login(session: Session) -> SaucerResult<()> {
    let login = session.login_page();
    login.navigate_to_login_page().await?;
    login.login_with_invalid_credentials().await?;
    ensure(
        login.is_login_button_visible().await?,
        "Login button is not displayed",
    )?;
    ensure(
        login.base().verify_page_contains_text("Login").await?,
        "Page does not contain text: Login",
    )
}

async fn product_listing(session: Session) -> SaucerResult<()> {
    logged_in(&session).await?;
    let products = session.products_page();
    ensure(
        products.verify_products_page_loaded().await?,
        "Products page did not load",
    )?;
    ensure(
        products.get_product_count().await? > 0,
        "No products are listed",
    )?;
    ensure(
        products.verify_add_to_cart_text_displayed().await?,
        "Page does not contain text: Add to cart",
    )
}

async fn sort_a_to_z(session: Session) -> SaucerResult<()> {
    logged_in(&session).await?;
    let products = session.products_page();
    products.open_sort_dropdown().await?;
    products.sort_products_by_name_a_to_z().await?;
    ensure(
        products.verify_products_sorted_a_to_z().await?,
        "Products are not sorted from A to Z",
    )
}

async fn view_cart(session: Session) -> SaucerResult<()> {
    logged_in(&session).await?;
    let products = session.products_page();
    products.add_first_product_to_cart().await?;
    products.click_cart_icon().await?;

    let cart = session.cart_page();
    ensure(
        cart.verify_your_cart_text_displayed().await?,
        "Page does not contain text: Your Cart",
    )?;
    let count = cart.get_cart_items_count().await?;
    ensure(count == 1, format!("expected 1 item in cart, found {count}"))
}

async fn remove_item(session: Session) -> SaucerResult<()> {
    logged_in(&session).await?;
    let products = session.products_page();
    products.add_first_product_to_cart().await?;
    products.click_cart_icon().await?;

    let cart = session.cart_page();
    ensure(!cart.is_cart_empty().await?, "Cart is empty before removal")?;
    cart.remove_first_item_from_cart().await?;
    ensure(cart.is_cart_empty().await?, "Cart is not empty after removal")?;
    ensure(
        products.get_cart_badge_count().await? == "0",
        "Cart badge still shown",
    )
}

/// Which scenarios to run; empty lists match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioFilter {
    /// Match scenarios carrying any of these tags
    pub tags: Vec<Tag>,
    /// Match scenarios with one of these ids (case-insensitive)
    pub ids: Vec<String>,
}

impl ScenarioFilter {
    /// Filter on a single tag
    #[must_use]
    pub fn tag(tag: Tag) -> Self {
        Self {
            tags: vec![tag],
            ids: Vec::new(),
        }
    }

    /// Whether `scenario` passes the filter
    #[must_use]
    pub fn matches(&self, scenario: &Scenario) -> bool {
        let tag_ok =
            self.tags.is_empty() || scenario.tags().iter().any(|t| self.tags.contains(t));
        let id_ok = self.ids.is_empty()
            || self
                .ids
                .iter()
                .any(|id| id.eq_ignore_ascii_case(scenario.id));
        tag_ok && id_ok
    }

    /// Catalog entries passing the filter, in catalog order
    #[must_use]
    pub fn select(&self) -> Vec<&'static Scenario> {
        catalog().iter().filter(|s| self.matches(s)).collect()
    }
}

/// Result of one scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Scenario id
    pub id: String,
    /// Scenario title
    pub title: String,
    /// Derived tags
    pub tags: Vec<Tag>,
    /// Whether it passed
    pub passed: bool,
    /// Failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl ScenarioOutcome {
    fn new(scenario: &Scenario, error: Option<String>, duration: Duration) -> Self {
        Self {
            id: scenario.id.to_string(),
            title: scenario.title.to_string(),
            tags: scenario.tags(),
            passed: error.is_none(),
            error,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Results of a catalog run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogResults {
    /// Per-scenario outcomes, in run order
    pub outcomes: Vec<ScenarioOutcome>,
    /// Total wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl CatalogResults {
    /// Check if all scenarios passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed).count()
    }

    /// Get total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Get failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioOutcome> {
        self.outcomes.iter().filter(|o| !o.passed).collect()
    }
}

/// Run every matching scenario in its own session, one after another
///
/// Launch failures and panics are recorded as failed outcomes; the run
/// never stops early.
pub async fn run_catalog(
    kind: DriverKind,
    config: Arc<Config>,
    filter: &ScenarioFilter,
) -> CatalogResults {
    let start = Instant::now();
    let mut outcomes = Vec::new();

    for scenario in filter.select() {
        let started = Instant::now();
        info!(id = scenario.id, "scenario started");

        let error = match Session::launch(kind, config.clone()).await {
            Ok(session) => {
                let run = session.run(scenario.id, |s| scenario.execute(s));
                match AssertUnwindSafe(run).catch_unwind().await {
                    Ok(Ok(())) => None,
                    Ok(Err(e)) => Some(e.to_string()),
                    Err(panic) => Some(panic_message(panic.as_ref())),
                }
            }
            Err(e) => Some(e.to_string()),
        };

        match error {
            None => info!(id = scenario.id, "scenario passed"),
            Some(ref message) => warn!(id = scenario.id, "scenario failed: {message}"),
        }
        outcomes.push(ScenarioOutcome::new(scenario, error, started.elapsed()));
    }

    CatalogResults {
        outcomes,
        duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .map_or_else(|| "scenario panicked".to_string(), |m| format!("panicked: {m}"))
}
