//! Selectors and the per-product naming convention.
//!
//! Every page object owns its own selector constants, even when two pages
//! point at visually identical elements. Per-product controls are addressed
//! through a slug of the product's display name.

use std::fmt;

/// Prefix shared by every per-product "add to cart" control
pub const ADD_TO_CART_PREFIX: &str = "add-to-cart";

/// Prefix shared by every per-product "remove" control
pub const REMOVE_PREFIX: &str = "remove";

/// A CSS selector string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector(String);

impl Selector {
    /// Wrap a raw CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    /// Exact `data-test` attribute match
    #[must_use]
    pub fn test_id(id: &str) -> Self {
        Self(format!("[data-test=\"{id}\"]"))
    }

    /// `data-test` attribute prefix match
    #[must_use]
    pub fn test_id_prefix(prefix: &str) -> Self {
        Self(format!("[data-test^=\"{prefix}\"]"))
    }

    /// The selector text handed to the driver
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Selector {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lowercase the name and replace every space with a hyphen.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Selector of the "add to cart" control for one product
#[must_use]
pub fn add_to_cart_button(product_name: &str) -> Selector {
    Selector::test_id(&format!("{ADD_TO_CART_PREFIX}-{}", slugify(product_name)))
}

/// Selector of the "remove" control for one product
#[must_use]
pub fn remove_button(product_name: &str) -> Selector {
    Selector::test_id(&format!("{REMOVE_PREFIX}-{}", slugify(product_name)))
}
