//! Inventory screen: product listing, cart controls and sorting.

use crate::config::Config;
use crate::driver::PageDriver;
use crate::locator::{self, Selector, ADD_TO_CART_PREFIX};
use crate::page_object::{BasePage, PageObject};
use crate::result::{SaucerError, SaucerResult};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

const PRODUCTS_TITLE: &str = ".title";
const PRODUCT_ITEMS: &str = ".inventory_item";
const CART_ICON: &str = ".shopping_cart_link";
const CART_BADGE: &str = ".shopping_cart_badge";
const SORT_DROPDOWN: &str = r#"[data-test="product_sort_container"]"#;
const PRODUCT_NAMES: &str = ".inventory_item_name";
const PRODUCT_PRICES: &str = ".inventory_item_price";

/// Options of the sort widget.
///
/// The option values are fixed by the shop: `az`, `za`, `lohi`, `hilo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Name (A to Z)
    #[default]
    NameAscending,
    /// Name (Z to A)
    NameDescending,
    /// Price (low to high)
    PriceAscending,
    /// Price (high to low)
    PriceDescending,
}

impl SortOrder {
    /// Every option, in widget order
    pub const ALL: [Self; 4] = [
        Self::NameAscending,
        Self::NameDescending,
        Self::PriceAscending,
        Self::PriceDescending,
    ];

    /// `value` attribute of the `<option>`
    #[must_use]
    pub const fn option_value(self) -> &'static str {
        match self {
            Self::NameAscending => "az",
            Self::NameDescending => "za",
            Self::PriceAscending => "lohi",
            Self::PriceDescending => "hilo",
        }
    }

    /// Visible label of the `<option>`
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NameAscending => "Name (A to Z)",
            Self::NameDescending => "Name (Z to A)",
            Self::PriceAscending => "Price (low to high)",
            Self::PriceDescending => "Price (high to low)",
        }
    }

    /// Parse an option value
    #[must_use]
    pub fn from_option_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.option_value() == value)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inventory screen page object
#[derive(Debug, Clone)]
pub struct ProductsPage {
    base: BasePage,
}

impl ProductsPage {
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

    /// Title is visible and reads "Products"
    pub async fn verify_products_page_loaded(&self) -> SaucerResult<bool> {
        Ok(self.base.is_element_visible(PRODUCTS_TITLE, None).await?
            && self.base.get_text(PRODUCTS_TITLE).await?.contains("Products"))
    }

    /// "Products" appears anywhere on the page
    pub async fn verify_products_text_displayed(&self) -> SaucerResult<bool> {
        self.base.verify_page_contains_text("Products").await
    }

    /// "Add to cart" appears anywhere on the page
    pub async fn verify_add_to_cart_text_displayed(&self) -> SaucerResult<bool> {
        self.base.verify_page_contains_text("Add to cart").await
    }

    /// Number of product cards
    pub async fn get_product_count(&self) -> SaucerResult<usize> {
        self.base.count(PRODUCT_ITEMS).await
    }

    /// Click the first "add to cart" control; does nothing when there is none
    pub async fn add_first_product_to_cart(&self) -> SaucerResult<()> {
        let selector = Selector::test_id_prefix(ADD_TO_CART_PREFIX);
        self.base.click_first(selector.as_str()).await.map(|_| ())
    }

    /// Click the `add-to-cart-<slug>` control of one product
    pub async fn add_product_to_cart_by_name(&self, product_name: &str) -> SaucerResult<()> {
        let selector = locator::add_to_cart_button(product_name);
        self.base.click_element(selector.as_str()).await
    }

    /// Open the cart screen
    pub async fn click_cart_icon(&self) -> SaucerResult<()> {
        self.base.click_element(CART_ICON).await
    }

    /// Badge text, or `"0"` when no badge is shown
    pub async fn get_cart_badge_count(&self) -> SaucerResult<String> {
        if self.base.is_element_visible(CART_BADGE, None).await? {
            self.base.get_text(CART_BADGE).await
        } else {
            Ok("0".to_string())
        }
    }

    /// Click the sort widget
    pub async fn open_sort_dropdown(&self) -> SaucerResult<()> {
        self.base.click_element(SORT_DROPDOWN).await
    }

    /// Open the sort widget and pick `order`
    pub async fn sort_products(&self, order: SortOrder) -> SaucerResult<()> {
        self.open_sort_dropdown().await?;
        tracing::debug!(order = order.option_value(), "sort products");
        self.base
            .driver()
            .select_option(SORT_DROPDOWN, order.option_value())
            .await
    }

    /// Sort by name, A to Z
    pub async fn sort_products_by_name_a_to_z(&self) -> SaucerResult<()> {
        self.sort_products(SortOrder::NameAscending).await
    }

    /// Sort by name, Z to A
    pub async fn sort_products_by_name_z_to_a(&self) -> SaucerResult<()> {
        self.sort_products(SortOrder::NameDescending).await
    }

    /// Sort by price, low to high
    pub async fn sort_products_by_price_low_to_high(&self) -> SaucerResult<()> {
        self.sort_products(SortOrder::PriceAscending).await
    }

    /// Sort by price, high to low
    pub async fn sort_products_by_price_high_to_low(&self) -> SaucerResult<()> {
        self.sort_products(SortOrder::PriceDescending).await
    }

    /// Product names in display order
    pub async fn get_product_names(&self) -> SaucerResult<Vec<String>> {
        self.base.texts(PRODUCT_NAMES).await
    }

    /// Product prices in cents, in display order
    pub async fn get_product_prices(&self) -> SaucerResult<Vec<u32>> {
        self.base
            .texts(PRODUCT_PRICES)
            .await?
            .iter()
            .map(|text| parse_price(text))
            .collect()
    }

    /// Names equal their ascending sort
    pub async fn verify_products_sorted_a_to_z(&self) -> SaucerResult<bool> {
        let names = self.get_product_names().await?;
        Ok(is_sorted_by(&names, |a, b| a.cmp(b)))
    }

    /// Names equal their descending sort
    pub async fn verify_products_sorted_z_to_a(&self) -> SaucerResult<bool> {
        let names = self.get_product_names().await?;
        Ok(is_sorted_by(&names, |a, b| b.cmp(a)))
    }

    /// Prices never decrease
    pub async fn verify_products_sorted_by_price_low_to_high(&self) -> SaucerResult<bool> {
        let prices = self.get_product_prices().await?;
        Ok(is_sorted_by(&prices, u32::cmp))
    }

    /// Prices never increase
    pub async fn verify_products_sorted_by_price_high_to_low(&self) -> SaucerResult<bool> {
        let prices = self.get_product_prices().await?;
        Ok(is_sorted_by(&prices, |a, b| b.cmp(a)))
    }
}

#[async_trait]
impl PageObject for ProductsPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn path(&self) -> &str {
        "inventory.html"
    }

    async fn is_loaded(&self) -> SaucerResult<bool> {
        self.verify_products_page_loaded().await
    }
}

/// `values` equals its own sorted copy under `compare`
fn is_sorted_by<T: Clone>(values: &[T], compare: impl Fn(&T, &T) -> Ordering) -> bool {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| compare(a, b));
    sorted
        .iter()
        .zip(values)
        .all(|(a, b)| compare(a, b) == Ordering::Equal)
}

/// `$29.99` to `2999`
fn parse_price(text: &str) -> SaucerResult<u32> {
    let unreadable = || SaucerError::driver(format!("unreadable price '{text}'"));
    let amount = text.trim().trim_start_matches('$');
    let (dollars, cents) = amount.split_once('.').unwrap_or((amount, "00"));
    if cents.len() != 2 || !cents.bytes().all(|b| b.is_ascii_digit()) {
        return Err(unreadable());
    }
    let dollars: u32 = dollars.parse().map_err(|_| unreadable())?;
    let cents: u32 = cents.parse().map_err(|_| unreadable())?;
    dollars
        .checked_mul(100)
        .and_then(|d| d.checked_add(cents))
        .ok_or_else(unreadable)
}
