//! Offline replica of the Swag Labs demo shop.
//!
//! [`Storefront`] implements [`PageDriver`] over an in-process state machine
//! that renders the same screens, selectors, texts and error messages as the
//! real shop: login, inventory (with sorting), cart and the first checkout
//! step. Page objects and scenarios run against it unchanged, without a
//! browser or network.
//!
//! Waits resolve on a simulated clock: an element that is not on the current
//! screen times out immediately instead of after the real timeout.
//!
//! Supported selector syntax is what the page objects use: `.class`,
//! `[data-test="id"]` and `[data-test^="prefix"]`. Anything else is a driver
//! error, not an absence.

use crate::driver::{ElementHandle, PageDriver};
use crate::locator::{slugify, ADD_TO_CART_PREFIX, REMOVE_PREFIX};
use crate::pages::SortOrder;
use crate::result::{SaucerError, SaucerResult};
use async_trait::async_trait;
use regex::Regex;
use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::Duration;

/// Password shared by every demo account
pub const DEMO_PASSWORD: &str = "secret_sauce";

/// Accounts that can log in with [`DEMO_PASSWORD`]
pub const ACCEPTED_USERS: [&str; 5] = [
    "standard_user",
    "problem_user",
    "performance_glitch_user",
    "error_user",
    "visual_user",
];

/// Account that exists but is refused
pub const LOCKED_OUT_USER: &str = "locked_out_user";

const DOCUMENT_TITLE: &str = "Swag Labs";

// 1x1 transparent PNG; there is no renderer behind the replica.
const PLACEHOLDER_PNG: [u8; 67] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// One item of the shop's inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    /// Display name
    pub name: &'static str,
    /// Price in cents
    pub price_cents: u32,
}

impl Product {
    /// Price as shown on the card, e.g. `$29.99`
    #[must_use]
    pub fn price_label(&self) -> String {
        format!("${}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }
}

/// The six products of the demo inventory
pub const CATALOG: [Product; 6] = [
    Product {
        name: "Sauce Labs Backpack",
        price_cents: 2999,
    },
    Product {
        name: "Sauce Labs Bike Light",
        price_cents: 999,
    },
    Product {
        name: "Sauce Labs Bolt T-Shirt",
        price_cents: 1599,
    },
    Product {
        name: "Sauce Labs Fleece Jacket",
        price_cents: 4999,
    },
    Product {
        name: "Sauce Labs Onesie",
        price_cents: 799,
    },
    Product {
        name: "Test.allTheThings() T-Shirt (Red)",
        price_cents: 1599,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Login,
    Inventory,
    Cart,
    CheckoutInfo,
}

impl Screen {
    const fn path(self) -> &'static str {
        match self {
            Self::Login => "",
            Self::Inventory => "inventory.html",
            Self::Cart => "cart.html",
            Self::CheckoutInfo => "checkout-step-one.html",
        }
    }

    fn from_path(path: &str) -> Option<Self> {
        match path {
            "" | "index.html" => Some(Self::Login),
            "inventory.html" => Some(Self::Inventory),
            "cart.html" => Some(Self::Cart),
            "checkout-step-one.html" => Some(Self::CheckoutInfo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    UsernameField,
    PasswordField,
    TextField,
    Login,
    AddToCart(usize),
    Remove(usize),
    OpenCart,
    SortMenu,
    ContinueShopping,
    Checkout,
    CancelCheckout,
}

#[derive(Debug, Clone)]
struct Node {
    classes: Vec<&'static str>,
    data_test: Option<String>,
    text: String,
    value: Option<String>,
    action: Action,
}

impl Node {
    fn class(class: &'static str, text: impl Into<String>) -> Self {
        Self {
            classes: vec![class],
            data_test: None,
            text: text.into(),
            value: None,
            action: Action::None,
        }
    }

    fn test_id(data_test: impl Into<String>, text: impl Into<String>, action: Action) -> Self {
        Self {
            classes: Vec::new(),
            data_test: Some(data_test.into()),
            text: text.into(),
            value: None,
            action,
        }
    }

    fn with_class(mut self, class: &'static str) -> Self {
        self.classes.push(class);
        self
    }

    const fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    fn render(&self, out: &mut String) {
        out.push_str("<div");
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", self.classes.join(" "));
        }
        if let Some(ref id) = self.data_test {
            let _ = write!(out, " data-test=\"{id}\"");
        }
        if let Some(ref value) = self.value {
            let _ = write!(out, " value=\"{value}\"");
        }
        let _ = writeln!(out, ">{}</div>", self.text);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Query {
    Class(String),
    TestId(String),
    TestIdPrefix(String),
}

impl Query {
    fn parse(selector: &str) -> SaucerResult<Self> {
        static CLASS: OnceLock<Regex> = OnceLock::new();
        static TEST_ID: OnceLock<Regex> = OnceLock::new();
        let class = CLASS.get_or_init(|| Regex::new(r"^\.([A-Za-z0-9_-]+)$").expect("valid regex"));
        let test_id = TEST_ID
            .get_or_init(|| Regex::new(r#"^\[data-test(\^?)="([^"]*)"\]$"#).expect("valid regex"));

        let selector = selector.trim();
        if let Some(caps) = class.captures(selector) {
            return Ok(Self::Class(caps[1].to_string()));
        }
        if let Some(caps) = test_id.captures(selector) {
            let value = caps[2].to_string();
            return Ok(if caps[1].is_empty() {
                Self::TestId(value)
            } else {
                Self::TestIdPrefix(value)
            });
        }
        Err(SaucerError::driver(format!(
            "unsupported selector '{selector}'"
        )))
    }

    fn matches(&self, node: &Node) -> bool {
        match self {
            Self::Class(class) => node.classes.iter().any(|c| c == class),
            Self::TestId(id) => node.data_test.as_deref() == Some(id.as_str()),
            Self::TestIdPrefix(prefix) => node
                .data_test
                .as_deref()
                .is_some_and(|id| id.starts_with(prefix.as_str())),
        }
    }
}

#[derive(Debug)]
struct ShopState {
    screen: Screen,
    user: Option<String>,
    username: String,
    password: String,
    error: Option<String>,
    cart: Vec<usize>,
    sort: SortOrder,
    closed: bool,
    history: Vec<String>,
}

impl ShopState {
    fn new() -> Self {
        Self {
            screen: Screen::Login,
            user: None,
            username: String::new(),
            password: String::new(),
            error: None,
            cart: Vec::new(),
            sort: SortOrder::default(),
            closed: false,
            history: Vec::new(),
        }
    }

    fn render(&self) -> Vec<Node> {
        match self.screen {
            Screen::Login => self.render_login(),
            Screen::Inventory => self.render_inventory(),
            Screen::Cart => self.render_cart(),
            Screen::CheckoutInfo => self.render_checkout(),
        }
    }

    fn render_login(&self) -> Vec<Node> {
        let mut nodes = vec![
            Node::class("login_logo", DOCUMENT_TITLE),
            Node::test_id("username", "", Action::UsernameField).with_value(self.username.clone()),
            Node::test_id("password", "", Action::PasswordField).with_value(self.password.clone()),
        ];
        if let Some(ref error) = self.error {
            nodes.push(Node::test_id("error", error.clone(), Action::None));
        }
        nodes.push(
            Node::test_id("login-button", "", Action::Login)
                .with_class("submit-button")
                .with_value("Login"),
        );
        nodes
    }

    fn header(&self, title: &str) -> Vec<Node> {
        let mut nodes = vec![
            Node::class("app_logo", DOCUMENT_TITLE),
            Node::class("shopping_cart_link", "").with_action(Action::OpenCart),
        ];
        if !self.cart.is_empty() {
            nodes.push(Node::class("shopping_cart_badge", self.cart.len().to_string()));
        }
        nodes.push(Node::class("title", title));
        nodes
    }

    fn render_inventory(&self) -> Vec<Node> {
        let mut nodes = self.header("Products");
        let options: Vec<&str> = SortOrder::ALL.iter().map(|o| o.label()).collect();
        nodes.push(
            Node::test_id("product_sort_container", options.join(""), Action::SortMenu)
                .with_class("product_sort_container")
                .with_value(self.sort.option_value()),
        );
        for index in sorted_catalog(self.sort) {
            let product = &CATALOG[index];
            let slug = slugify(product.name);
            nodes.push(Node::class("inventory_item", ""));
            nodes.push(Node::class("inventory_item_name", product.name));
            nodes.push(Node::class("inventory_item_price", product.price_label()));
            nodes.push(if self.cart.contains(&index) {
                Node::test_id(format!("{REMOVE_PREFIX}-{slug}"), "Remove", Action::Remove(index))
            } else {
                Node::test_id(
                    format!("{ADD_TO_CART_PREFIX}-{slug}"),
                    "Add to cart",
                    Action::AddToCart(index),
                )
            });
        }
        nodes
    }

    fn render_cart(&self) -> Vec<Node> {
        let mut nodes = self.header("Your Cart");
        nodes.push(Node::class("cart_quantity_label", "QTY"));
        nodes.push(Node::class("cart_desc_label", "Description"));
        for &index in &self.cart {
            let product = &CATALOG[index];
            nodes.push(Node::class("cart_item", ""));
            nodes.push(Node::class("cart_quantity", "1"));
            nodes.push(Node::class("inventory_item_name", product.name));
            nodes.push(Node::class("inventory_item_price", product.price_label()));
            nodes.push(Node::test_id(
                format!("{REMOVE_PREFIX}-{}", slugify(product.name)),
                "Remove",
                Action::Remove(index),
            ));
        }
        nodes.push(Node::test_id(
            "continue-shopping",
            "Continue Shopping",
            Action::ContinueShopping,
        ));
        nodes.push(Node::test_id("checkout", "Checkout", Action::Checkout));
        nodes
    }

    fn render_checkout(&self) -> Vec<Node> {
        let mut nodes = self.header("Checkout: Your Information");
        nodes.push(Node::test_id("firstName", "", Action::TextField));
        nodes.push(Node::test_id("lastName", "", Action::TextField));
        nodes.push(Node::test_id("postalCode", "", Action::TextField));
        nodes.push(Node::test_id("cancel", "Cancel", Action::CancelCheckout));
        nodes.push(Node::test_id("continue", "", Action::None).with_value("Continue"));
        nodes
    }

    fn submit_login(&mut self) {
        let error = if self.username.is_empty() {
            Some("Epic sadface: Username is required")
        } else if self.password.is_empty() {
            Some("Epic sadface: Password is required")
        } else if self.password != DEMO_PASSWORD {
            Some("Epic sadface: Username and password do not match any user in this service")
        } else if self.username == LOCKED_OUT_USER {
            Some("Epic sadface: Sorry, this user has been locked out.")
        } else if ACCEPTED_USERS.contains(&self.username.as_str()) {
            None
        } else {
            Some("Epic sadface: Username and password do not match any user in this service")
        };

        match error {
            Some(message) => self.error = Some(message.to_string()),
            None => {
                self.user = Some(std::mem::take(&mut self.username));
                self.password.clear();
                self.error = None;
                self.screen = Screen::Inventory;
            }
        }
    }

    fn show(&mut self, screen: Screen) {
        if screen == Screen::Login {
            self.error = None;
            self.username.clear();
            self.password.clear();
        } else if self.user.is_none() {
            self.error = Some(format!(
                "Epic sadface: You can only access '/{}' when you are logged in.",
                screen.path()
            ));
            self.screen = Screen::Login;
            return;
        }
        self.screen = screen;
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Login => self.submit_login(),
            Action::AddToCart(index) => {
                if !self.cart.contains(&index) {
                    self.cart.push(index);
                }
            }
            Action::Remove(index) => self.cart.retain(|&i| i != index),
            Action::OpenCart | Action::CancelCheckout => self.show(Screen::Cart),
            Action::ContinueShopping => self.show(Screen::Inventory),
            Action::Checkout => self.show(Screen::CheckoutInfo),
            Action::None
            | Action::SortMenu
            | Action::UsernameField
            | Action::PasswordField
            | Action::TextField => {}
        }
    }
}

fn sorted_catalog(order: SortOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..CATALOG.len()).collect();
    match order {
        SortOrder::NameAscending => indices.sort_by(|&a, &b| CATALOG[a].name.cmp(CATALOG[b].name)),
        SortOrder::NameDescending => {
            indices.sort_by(|&a, &b| CATALOG[b].name.cmp(CATALOG[a].name));
        }
        SortOrder::PriceAscending => indices.sort_by_key(|&i| CATALOG[i].price_cents),
        SortOrder::PriceDescending => {
            indices.sort_by(|&a, &b| CATALOG[b].price_cents.cmp(&CATALOG[a].price_cents));
        }
    }
    indices
}

/// In-process demo shop driven through [`PageDriver`]
#[derive(Debug)]
pub struct Storefront {
    origin: String,
    state: Mutex<ShopState>,
}

impl Storefront {
    /// Shop served under `base_url`, showing the login screen
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            origin: base_url.trim_end_matches('/').to_string(),
            state: Mutex::new(ShopState::new()),
        }
    }

    /// Driver calls received so far
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.history.clone())
            .unwrap_or_default()
    }

    /// Whether a user is authenticated
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.state.lock().map(|s| s.user.is_some()).unwrap_or(false)
    }

    /// Whether the session was closed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().map(|s| s.closed).unwrap_or(true)
    }

    fn open_state(&self) -> SaucerResult<MutexGuard<'_, ShopState>> {
        let state = self
            .state
            .lock()
            .map_err(|_| SaucerError::driver("storefront state poisoned"))?;
        if state.closed {
            return Err(SaucerError::SessionClosed);
        }
        Ok(state)
    }

    fn resolve(state: &ShopState, element: &ElementHandle) -> SaucerResult<Node> {
        let query = Query::parse(&element.selector)?;
        state
            .render()
            .into_iter()
            .filter(|n| query.matches(n))
            .nth(element.index)
            .ok_or_else(|| SaucerError::ElementNotFound {
                selector: element.selector.clone(),
            })
    }
}

#[async_trait]
impl PageDriver for Storefront {
    async fn navigate(&self, url: &str) -> SaucerResult<()> {
        let mut state = self.open_state()?;
        state.history.push(format!("navigate:{url}"));

        let path = url
            .strip_prefix(&self.origin)
            .map(|rest| rest.trim_start_matches('/'))
            .ok_or_else(|| SaucerError::NavigationError {
                url: url.to_string(),
                message: format!("outside of {}", self.origin),
            })?;
        let screen = Screen::from_path(path).ok_or_else(|| SaucerError::NavigationError {
            url: url.to_string(),
            message: "404 Not Found".to_string(),
        })?;
        state.show(screen);
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> SaucerResult<ElementHandle> {
        let query = Query::parse(selector)?;
        let state = self.open_state()?;
        state
            .render()
            .iter()
            .position(|n| query.matches(n))
            .map(|_| ElementHandle::new(selector, 0))
            .ok_or_else(|| SaucerError::timeout(selector, timeout))
    }

    async fn query_selector_all(&self, selector: &str) -> SaucerResult<Vec<ElementHandle>> {
        let query = Query::parse(selector)?;
        let state = self.open_state()?;
        let count = state.render().iter().filter(|n| query.matches(n)).count();
        Ok(ElementHandle::all(selector, count))
    }

    async fn click(&self, element: &ElementHandle) -> SaucerResult<()> {
        let mut state = self.open_state()?;
        let node = Self::resolve(&state, element)?;
        state.history.push(format!("click:{}", element.selector));
        state.apply(node.action);
        Ok(())
    }

    async fn fill(&self, element: &ElementHandle, text: &str) -> SaucerResult<()> {
        let mut state = self.open_state()?;
        let node = Self::resolve(&state, element)?;
        state.history.push(format!("fill:{}", element.selector));
        match node.action {
            Action::UsernameField => state.username = text.to_string(),
            Action::PasswordField => state.password = text.to_string(),
            Action::TextField => {}
            _ => {
                return Err(SaucerError::driver(format!(
                    "'{}' is not an input",
                    element.selector
                )))
            }
        }
        Ok(())
    }

    async fn text_content(&self, element: &ElementHandle) -> SaucerResult<String> {
        let state = self.open_state()?;
        Ok(Self::resolve(&state, element)?.text)
    }

    async fn select_option(&self, selector: &str, value: &str) -> SaucerResult<()> {
        let mut state = self.open_state()?;
        let node = Self::resolve(&state, &ElementHandle::new(selector, 0))?;
        if node.action != Action::SortMenu {
            return Err(SaucerError::driver(format!(
                "'{selector}' is not a <select>"
            )));
        }
        let order = SortOrder::from_option_value(value)
            .ok_or_else(|| SaucerError::driver(format!("no option with value '{value}'")))?;
        state.history.push(format!("select:{value}"));
        state.sort = order;
        Ok(())
    }

    async fn content(&self) -> SaucerResult<String> {
        let state = self.open_state()?;
        let mut html = format!("<html><head><title>{DOCUMENT_TITLE}</title></head><body>\n");
        for node in state.render() {
            node.render(&mut html);
        }
        html.push_str("</body></html>");
        Ok(html)
    }

    async fn title(&self) -> SaucerResult<String> {
        let _state = self.open_state()?;
        Ok(DOCUMENT_TITLE.to_string())
    }

    async fn screenshot(&self) -> SaucerResult<Vec<u8>> {
        let mut state = self.open_state()?;
        state.history.push("screenshot".to_string());
        Ok(PLACEHOLDER_PNG.to_vec())
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> SaucerResult<()> {
        let _state = self.open_state()?;
        Ok(())
    }

    async fn close(&self) -> SaucerResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| SaucerError::driver("storefront state poisoned"))?;
        state.history.push("close".to_string());
        state.closed = true;
        Ok(())
    }
}
