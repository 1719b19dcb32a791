//! Zentek Storefront
//!
//! Client-side storefront state: the catalog, cart, wishlist, mock auth and
//! order recording, each write-through to a key-value store.
//!
//! ## Features
//! - Static product catalog with discount and price formatting helpers
//! - Cart with derived totals and delivery charge
//! - Wishlist with toggle semantics
//! - Single-account mock sign up / login
//! - Checkout that records orders locally and optionally with a remote service

pub mod api;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod remote;
pub mod storage;
pub mod storefront;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use checkout::{AddressForm, CheckoutOutcome, LocalReason, PaymentMethod, PriceSummary, Recording};
pub use domain::aggregates::{
    Auth, Cart, CartEntry, Catalog, OrderBook, OrderLine, Product, ProductQuery, SortField, StoredOrder,
    UserSession, Wishlist,
};
pub use domain::value_objects::Money;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use storefront::Storefront;

// =============================================================================
// Error Types
// =============================================================================

/// Field-level validation messages, keyed by form field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::default();
        for (field, list) in errors.field_errors() {
            let message = list
                .iter()
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| format!("{field} is invalid"));
            out.insert(field.to_string(), message);
        }
        out
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote order service error: {0}")]
    Remote(String),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
