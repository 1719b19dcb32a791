//! Persistence port.
//!
//! Every stateful container hydrates from a [`KeyValueStore`] once and writes
//! its whole state back after each mutation. Values are JSON strings, the same
//! shape a browser keeps in `localStorage`.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::Result;

/// Fixed storage keys, one per container.
pub mod keys {
    pub const CART: &str = "zentek_cart";
    pub const WISHLIST: &str = "zentek_wishlist";
    pub const USER: &str = "zentek_user";
    pub const AUTH_TOKEN: &str = "zentek_auth_token";
    pub const ORDERS: &str = "zentek_orders";
}

/// Synchronous string key-value store.
///
/// Methods take `&self`; implementations use interior mutability.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Returns `Ok(())` even if the key did not exist.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Reads and decodes a JSON value. Missing keys, read failures and malformed
/// JSON all come back as `None`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read persisted state");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring malformed persisted state");
            None
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
