//! Aggregates module
pub mod cart;
pub mod order;
pub mod product;
pub mod session;
pub mod wishlist;

pub use cart::{Cart, CartEntry};
pub use order::{OrderBook, OrderLine, StoredOrder};
pub use product::{Catalog, Product, ProductQuery, SortField};
pub use session::{Auth, LoginForm, SignupForm, UserSession};
pub use wishlist::Wishlist;
