//! Screen-specific page objects.

mod cart;
mod login;
mod products;

pub use cart::CartPage;
pub use login::LoginPage;
pub use products::{ProductsPage, SortOrder};
