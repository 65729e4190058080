//! BDD runner for the shop's Gherkin features.
//!
//! Runs every `.feature` file under `tests/features/` against the offline
//! storefront. Each scenario gets a fresh `ShopWorld`, which owns one session
//! for the whole scenario. The after hook saves a failure screenshot when a
//! step failed and always closes the session.
//!
//! ```bash
//! cargo test --test bdd
//! ```

#![allow(clippy::expect_used, clippy::panic, clippy::unwrap_used)]

use cucumber::event::ScenarioFinished;
use cucumber::{given, then, when, World};
use saucer::prelude::*;
use std::sync::Arc;

/// Per-scenario state: one session bound to a fresh storefront
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct ShopWorld {
    session: Session,
}

impl ShopWorld {
    fn new() -> Self {
        let config = Arc::new(
            Config::new(DEMO_BASE_URL)
                .with_wait_time(1)
                .with_timeout(2000)
                .with_screenshots_dir(std::env::temp_dir().join("saucer-bdd")),
        );
        let store = Arc::new(Storefront::new(&config.base_url));
        Self {
            session: Session::new(store, config),
        }
    }
}

// ============================================================================
// Authentication steps
// ============================================================================

#[given("user is on Login Page")]
async fn user_is_on_login_page(world: &mut ShopWorld) -> SaucerResult<()> {
    let login = world.session.login_page();
    login.navigate_to_login_page().await?;
    ensure(
        login.verify_login_page_loaded().await?,
        "Login page did not load properly",
    )
}

#[given(regex = r#"^user is logged in as "([^"]*)"$"#)]
async fn user_is_logged_in_as(world: &mut ShopWorld, username: String) -> SaucerResult<()> {
    let login = world.session.login_page();
    login.navigate_to_login_page().await?;
    login.login_with_credentials(&username, DEMO_PASSWORD).await?;
    ensure(
        world
            .session
            .products_page()
            .verify_products_page_loaded()
            .await?,
        format!("{username} did not reach the inventory"),
    )
}

#[when(regex = r#"^user enters user name as "([^"]*)" and password as "([^"]*)"$"#)]
async fn user_enters_credentials(
    world: &mut ShopWorld,
    username: String,
    password: String,
) -> SaucerResult<()> {
    let login = world.session.login_page();
    login.enter_username(&username).await?;
    login.enter_password(&password).await
}

#[when("user clicks Login Button")]
async fn user_clicks_login_button(world: &mut ShopWorld) -> SaucerResult<()> {
    world.session.login_page().click_login_button().await
}

#[then("Login Button should be still displayed")]
async fn login_button_still_displayed(world: &mut ShopWorld) -> SaucerResult<()> {
    ensure(
        world.session.login_page().is_login_button_visible().await?,
        "Login button is not displayed",
    )
}

#[then(regex = r#"^the error message should contain "([^"]*)"$"#)]
async fn error_message_contains(world: &mut ShopWorld, text: String) -> SaucerResult<()> {
    let message = world.session.login_page().get_error_message().await?;
    ensure(
        message.contains(&text),
        format!("error message '{message}' does not contain '{text}'"),
    )
}

#[then(regex = r#"^verify page has text "([^"]*)"$"#)]
async fn verify_page_has_text(world: &mut ShopWorld, text: String) -> SaucerResult<()> {
    let page = world.session.login_page();
    ensure(
        page.base().verify_page_contains_text(&text).await?,
        format!("Page does not contain text: {text}"),
    )
}

// ============================================================================
// Inventory steps
// ============================================================================

#[when("user clicks Sort Icon")]
async fn user_clicks_sort_icon(world: &mut ShopWorld) -> SaucerResult<()> {
    world.session.products_page().open_sort_dropdown().await
}

#[when(regex = r"^user clicks Sort the Products by Name \(A–Z\)$")]
async fn user_sorts_products_a_to_z(world: &mut ShopWorld) -> SaucerResult<()> {
    world.session.products_page().sort_products_by_name_a_to_z().await
}

#[when(regex = r"^user clicks Sort the Products by Name \(Z–A\)$")]
async fn user_sorts_products_z_to_a(world: &mut ShopWorld) -> SaucerResult<()> {
    world.session.products_page().sort_products_by_name_z_to_a().await
}

#[then("all the products must be sorted from A to Z")]
async fn products_sorted_a_to_z(world: &mut ShopWorld) -> SaucerResult<()> {
    ensure(
        world
            .session
            .products_page()
            .verify_products_sorted_a_to_z()
            .await?,
        "Products are not sorted from A to Z",
    )
}

#[then("all the products must be sorted from Z to A")]
async fn products_sorted_z_to_a(world: &mut ShopWorld) -> SaucerResult<()> {
    ensure(
        world
            .session
            .products_page()
            .verify_products_sorted_z_to_a()
            .await?,
        "Products are not sorted from Z to A",
    )
}

#[then(regex = r"^(\d+) products should be listed$")]
async fn products_listed(world: &mut ShopWorld, expected: usize) -> SaucerResult<()> {
    let count = world.session.products_page().get_product_count().await?;
    ensure(
        count == expected,
        format!("expected {expected} products, found {count}"),
    )
}

// ============================================================================
// Cart steps
// ============================================================================

#[when("user clicks Add to cart")]
async fn user_clicks_add_to_cart(world: &mut ShopWorld) -> SaucerResult<()> {
    world.session.products_page().add_first_product_to_cart().await
}

#[when("user clicks cart icon")]
async fn user_clicks_cart_icon(world: &mut ShopWorld) -> SaucerResult<()> {
    world.session.products_page().click_cart_icon().await
}

#[when("user removes the first item from the cart")]
async fn user_removes_first_item(world: &mut ShopWorld) -> SaucerResult<()> {
    world.session.cart_page().remove_first_item_from_cart().await
}

#[then(regex = r"^the cart should contain (\d+) items?$")]
async fn cart_contains(world: &mut ShopWorld, expected: usize) -> SaucerResult<()> {
    let count = world.session.cart_page().get_cart_items_count().await?;
    ensure(
        count == expected,
        format!("expected {expected} items in cart, found {count}"),
    )
}

#[then("the cart should be empty")]
async fn cart_is_empty(world: &mut ShopWorld) -> SaucerResult<()> {
    ensure(
        world.session.cart_page().is_cart_empty().await?,
        "Cart is not empty",
    )
}

#[tokio::main]
async fn main() {
    init_test_tracing();

    ShopWorld::cucumber()
        .max_concurrent_scenarios(1)
        .after(|_feature, _rule, scenario, ev, world| {
            Box::pin(async move {
                let failed = matches!(
                    ev,
                    ScenarioFinished::StepFailed(..) | ScenarioFinished::BeforeHookFailed(..)
                );
                if let Some(world) = world {
                    if let Err(e) = world.session.finish(&scenario.name, failed).await {
                        tracing::warn!("closing session of '{}' failed: {e}", scenario.name);
                    }
                }
            })
        })
        .fail_on_skipped()
        .run_and_exit(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/features"))
        .await;
}
