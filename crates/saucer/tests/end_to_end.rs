//! End-to-end tests against the offline storefront.
//!
//! Every test owns one session for its full duration, exactly like a run
//! against the live shop would.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use saucer::prelude::*;
use std::sync::Arc;

fn config() -> Config {
    Config::new(DEMO_BASE_URL)
        .with_wait_time(1)
        .with_timeout(2000)
        .with_screenshots_dir(std::env::temp_dir().join("saucer-e2e"))
}

fn session() -> (Arc<Storefront>, Session) {
    let config = Arc::new(config());
    let store = Arc::new(Storefront::new(&config.base_url));
    (store.clone(), Session::new(store, config))
}

async fn logged_in() -> (Arc<Storefront>, Session) {
    let (store, session) = session();
    let login = session.login_page();
    login.navigate_to_login_page().await.unwrap();
    login.login_with_valid_credentials().await.unwrap();
    (store, session)
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn valid_login_lands_on_products() {
    let (_, session) = session();
    let login = session.login_page();
    login.navigate_to_login_page().await.unwrap();
    login.enter_username("standard_user").await.unwrap();
    login.enter_password("secret_sauce").await.unwrap();
    login.click_login_button().await.unwrap();

    assert!(login
        .base()
        .verify_page_contains_text("Products")
        .await
        .unwrap());
}

#[tokio::test]
async fn invalid_login_stays_on_login_page() {
    let (_, session) = session();
    let login = session.login_page();
    login.navigate_to_login_page().await.unwrap();
    login.enter_username("standard_use").await.unwrap();
    login.enter_password("secret_sauce").await.unwrap();
    login.click_login_button().await.unwrap();

    assert!(login.is_login_button_visible().await.unwrap());
    assert!(login.base().verify_page_contains_text("Login").await.unwrap());
}

#[tokio::test]
async fn every_accepted_user_can_log_in() {
    for user in ACCEPTED_USERS {
        let (store, session) = session();
        let login = session.login_page();
        login.navigate_to_login_page().await.unwrap();
        login
            .login_with_credentials(user, DEMO_PASSWORD)
            .await
            .unwrap();
        assert!(store.is_logged_in(), "{user} should be accepted");
    }
}

#[tokio::test]
async fn deep_link_without_login_shows_error() {
    let (_, session) = session();
    let cart = session.cart_page();
    cart.open().await.unwrap();

    assert!(!cart.is_loaded().await.unwrap());
    let error = session.login_page().get_error_message().await.unwrap();
    assert!(error.contains("when you are logged in"));
}

// ============================================================================
// Inventory
// ============================================================================

#[tokio::test]
async fn add_by_name_targets_slugged_control() {
    let (store, session) = logged_in().await;
    session
        .products_page()
        .add_product_to_cart_by_name("Sauce Labs Backpack")
        .await
        .unwrap();

    assert!(store
        .history()
        .contains(&r#"click:[data-test="add-to-cart-sauce-labs-backpack"]"#.to_string()));
}

#[tokio::test]
async fn badge_reflects_cart_size() {
    let (_, session) = logged_in().await;
    let products = session.products_page();
    assert_eq!(products.get_cart_badge_count().await.unwrap(), "0");

    for name in CATALOG.iter().take(3).map(|p| p.name) {
        products.add_product_to_cart_by_name(name).await.unwrap();
    }
    assert_eq!(products.get_cart_badge_count().await.unwrap(), "3");
}

#[tokio::test]
async fn sort_checks_agree_with_sorted_copy() {
    let (_, session) = logged_in().await;
    let products = session.products_page();

    for order in SortOrder::ALL {
        products.sort_products(order).await.unwrap();
        let names = products.get_product_names().await.unwrap();
        let mut ascending = names.clone();
        ascending.sort();
        let mut descending = ascending.clone();
        descending.reverse();

        assert_eq!(
            products.verify_products_sorted_a_to_z().await.unwrap(),
            names == ascending,
            "{order}"
        );
        assert_eq!(
            products.verify_products_sorted_z_to_a().await.unwrap(),
            names == descending,
            "{order}"
        );
    }
}

#[tokio::test]
async fn checks_leave_state_unchanged() {
    let (store, session) = logged_in().await;
    let products = session.products_page();
    products.add_first_product_to_cart().await.unwrap();
    products.click_cart_icon().await.unwrap();

    let cart = session.cart_page();
    let before = store.history().len();
    let first = cart.get_cart_items_count().await.unwrap();
    let second = cart.get_cart_items_count().await.unwrap();
    assert!(cart.verify_cart_page_loaded().await.unwrap());
    assert!(!cart.is_cart_empty().await.unwrap());

    assert_eq!(first, second);
    assert!(store.history()[before..]
        .iter()
        .all(|call| !call.starts_with("click:") && !call.starts_with("navigate:")));
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn add_first_then_view_cart() {
    let (_, session) = logged_in().await;
    let products = session.products_page();
    products.add_first_product_to_cart().await.unwrap();
    products.click_cart_icon().await.unwrap();

    let cart = session.cart_page();
    assert!(cart.verify_your_cart_text_displayed().await.unwrap());
    assert_eq!(cart.get_cart_items_count().await.unwrap(), 1);
    assert!(cart
        .verify_item_in_cart("Sauce Labs Backpack")
        .await
        .unwrap());
}

#[tokio::test]
async fn cart_survives_navigation() {
    let (_, session) = logged_in().await;
    let products = session.products_page();
    products
        .add_product_to_cart_by_name("Sauce Labs Onesie")
        .await
        .unwrap();

    let cart = session.cart_page();
    cart.open().await.unwrap();
    assert!(cart.is_loaded().await.unwrap());
    assert_eq!(
        cart.get_cart_item_names().await.unwrap(),
        vec!["Sauce Labs Onesie"]
    );

    products.open().await.unwrap();
    assert_eq!(products.get_cart_badge_count().await.unwrap(), "1");
}

// ============================================================================
// Session lifecycle and catalog
// ============================================================================

#[tokio::test]
async fn session_run_closes_driver() {
    let (store, session) = session();
    session
        .run("closes_driver", |s| async move {
            s.login_page().navigate_to_login_page().await
        })
        .await
        .unwrap();
    assert!(store.is_closed());
}

#[tokio::test]
async fn failed_scenario_teardown_saves_screenshot() {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(config().with_screenshots_dir(dir.path()));
    let store = Arc::new(Storefront::new(&config.base_url));
    let session = Session::new(store.clone(), config);

    let login = session.login_page();
    login.navigate_to_login_page().await.unwrap();
    login.login_with_invalid_credentials().await.unwrap();
    assert!(!session
        .products_page()
        .verify_products_page_loaded()
        .await
        .unwrap());

    session
        .finish("Login with invalid credentials", true)
        .await
        .unwrap();

    let shots: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(shots.len(), 1);
    assert!(shots[0].starts_with("failure_Login_with_invalid_credentials_"));
    assert!(shots[0].ends_with(".png"));
    assert!(store.is_closed());
}

#[tokio::test]
async fn offline_catalog_is_green() {
    let results = run_catalog(
        DriverKind::Offline,
        Arc::new(config()),
        &ScenarioFilter::default(),
    )
    .await;

    assert_eq!(results.total(), catalog().len());
    assert_eq!(results.passed_count(), results.total(), "{:?}", results.failures());
}
