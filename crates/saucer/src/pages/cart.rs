//! Cart screen.

use crate::config::Config;
use crate::driver::PageDriver;
use crate::locator::{self, Selector, REMOVE_PREFIX};
use crate::page_object::{BasePage, PageObject};
use crate::result::SaucerResult;
use async_trait::async_trait;
use std::sync::Arc;

const CART_TITLE: &str = ".title";
const CART_ITEMS: &str = ".cart_item";
const CART_ITEM_NAMES: &str = ".inventory_item_name";
const CONTINUE_SHOPPING_BUTTON: &str = r#"[data-test="continue-shopping"]"#;
const CHECKOUT_BUTTON: &str = r#"[data-test="checkout"]"#;

/// Cart screen page object
#[derive(Debug, Clone)]
pub struct CartPage {
    base: BasePage,
}

impl CartPage {
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

    /// Title is visible and reads "Your Cart"
    pub async fn verify_cart_page_loaded(&self) -> SaucerResult<bool> {
        Ok(self.base.is_element_visible(CART_TITLE, None).await?
            && self.base.get_text(CART_TITLE).await?.contains("Your Cart"))
    }

    /// "Your Cart" appears anywhere on the page
    pub async fn verify_your_cart_text_displayed(&self) -> SaucerResult<bool> {
        self.base.verify_page_contains_text("Your Cart").await
    }

    /// Number of line items
    pub async fn get_cart_items_count(&self) -> SaucerResult<usize> {
        self.base.count(CART_ITEMS).await
    }

    /// Line item names in display order
    pub async fn get_cart_item_names(&self) -> SaucerResult<Vec<String>> {
        self.base.texts(CART_ITEM_NAMES).await
    }

    /// Whether a product with exactly this name is in the cart
    pub async fn verify_item_in_cart(&self, item_name: &str) -> SaucerResult<bool> {
        Ok(self
            .get_cart_item_names()
            .await?
            .iter()
            .any(|name| name == item_name))
    }

    /// Click the `remove-<slug>` control of one product
    pub async fn remove_item_from_cart(&self, item_name: &str) -> SaucerResult<()> {
        let selector = locator::remove_button(item_name);
        self.base.click_element(selector.as_str()).await
    }

    /// Remove whichever line item comes first; does nothing on an empty cart
    pub async fn remove_first_item_from_cart(&self) -> SaucerResult<()> {
        let selector = Selector::test_id_prefix(REMOVE_PREFIX);
        self.base.click_first(selector.as_str()).await.map(|_| ())
    }

    /// Back to the inventory
    pub async fn click_continue_shopping(&self) -> SaucerResult<()> {
        self.base.click_element(CONTINUE_SHOPPING_BUTTON).await
    }

    /// On to checkout
    pub async fn click_checkout(&self) -> SaucerResult<()> {
        self.base.click_element(CHECKOUT_BUTTON).await
    }

    /// No line items
    pub async fn is_cart_empty(&self) -> SaucerResult<bool> {
        Ok(self.get_cart_items_count().await? == 0)
    }
}

#[async_trait]
impl PageObject for CartPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn path(&self) -> &str {
        "cart.html"
    }

    async fn is_loaded(&self) -> SaucerResult<bool> {
        self.verify_cart_page_loaded().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::DEMO_BASE_URL;
    use crate::pages::{LoginPage, ProductsPage};
    use crate::storefront::Storefront;

    struct Shop {
        products: ProductsPage,
        cart: CartPage,
    }

    async fn shop_with(items: &[&str]) -> Shop {
        let config = Arc::new(Config::new(DEMO_BASE_URL).with_wait_time(1));
        let store: Arc<dyn PageDriver> = Arc::new(Storefront::new(&config.base_url));
        let login = LoginPage::new(store.clone(), config.clone());
        login.navigate_to_login_page().await.unwrap();
        login.login_with_valid_credentials().await.unwrap();

        let products = ProductsPage::new(store.clone(), config.clone());
        for item in items {
            products.add_product_to_cart_by_name(item).await.unwrap();
        }
        products.click_cart_icon().await.unwrap();
        Shop {
            products,
            cart: CartPage::new(store, config),
        }
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let shop = shop_with(&[]).await;
        assert!(shop.cart.verify_cart_page_loaded().await.unwrap());
        assert!(shop.cart.is_cart_empty().await.unwrap());
        shop.cart.remove_first_item_from_cart().await.unwrap();
        assert!(shop.cart.is_cart_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_items_in_add_order() {
        let shop = shop_with(&["Sauce Labs Onesie", "Sauce Labs Backpack"]).await;
        assert_eq!(shop.cart.get_cart_items_count().await.unwrap(), 2);
        assert_eq!(
            shop.cart.get_cart_item_names().await.unwrap(),
            vec!["Sauce Labs Onesie", "Sauce Labs Backpack"]
        );
        assert!(shop.cart.verify_item_in_cart("Sauce Labs Backpack").await.unwrap());
        assert!(!shop.cart.verify_item_in_cart("Sauce Labs").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_by_name_and_first() {
        let shop = shop_with(&[
            "Sauce Labs Backpack",
            "Sauce Labs Bike Light",
            "Sauce Labs Bolt T-Shirt",
        ])
        .await;

        shop.cart
            .remove_item_from_cart("Sauce Labs Bike Light")
            .await
            .unwrap();
        assert_eq!(
            shop.cart.get_cart_item_names().await.unwrap(),
            vec!["Sauce Labs Backpack", "Sauce Labs Bolt T-Shirt"]
        );

        shop.cart.remove_first_item_from_cart().await.unwrap();
        assert_eq!(
            shop.cart.get_cart_item_names().await.unwrap(),
            vec!["Sauce Labs Bolt T-Shirt"]
        );
    }

    #[tokio::test]
    async fn test_continue_shopping_and_checkout() {
        let shop = shop_with(&["Sauce Labs Backpack"]).await;
        shop.cart.click_continue_shopping().await.unwrap();
        assert!(shop.products.verify_products_page_loaded().await.unwrap());
        assert_eq!(shop.products.get_cart_badge_count().await.unwrap(), "1");

        shop.products.click_cart_icon().await.unwrap();
        shop.cart.click_checkout().await.unwrap();
        assert!(shop
            .cart
            .base()
            .verify_page_contains_text("Checkout: Your Information")
            .await
            .unwrap());
        assert!(!shop.cart.verify_cart_page_loaded().await.unwrap());
    }

    #[tokio::test]
    async fn test_count_is_stable_between_reads() {
        let shop = shop_with(&["Sauce Labs Backpack"]).await;
        let first = shop.cart.get_cart_items_count().await.unwrap();
        let second = shop.cart.get_cart_items_count().await.unwrap();
        assert_eq!(first, second);
    }
}
