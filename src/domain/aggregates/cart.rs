//! Cart Aggregate

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::product::{Catalog, Product};
use crate::domain::value_objects::Money;
use crate::storage::{keys, load_json, save_json, KeyValueStore};
use crate::Result;

/// A cart line: the product joined from the catalog plus a quantity of at least one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub product_id: String,
    pub quantity: u32,
    pub product: Product,
}

impl CartEntry {
    pub fn line_total(&self) -> Money { self.product.price.multiply(self.quantity) }
}

/// Persisted form of an entry; the product snapshot is never stored.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    product_id: String,
    quantity: u32,
}

#[derive(Debug)]
pub struct Cart {
    catalog: Arc<Catalog>,
    store: Arc<dyn KeyValueStore>,
    items: Vec<CartEntry>,
}

impl Cart {
    /// Loads the stored pairs and re-joins them against the catalog, dropping
    /// pairs whose product is gone.
    pub fn hydrate(catalog: Arc<Catalog>, store: Arc<dyn KeyValueStore>) -> Self {
        let stored: Vec<StoredEntry> = load_json(store.as_ref(), keys::CART).unwrap_or_default();
        let mut items: Vec<CartEntry> = Vec::with_capacity(stored.len());
        for entry in stored {
            if entry.quantity == 0 || items.iter().any(|i| i.product_id == entry.product_id) {
                continue;
            }
            match catalog.get(&entry.product_id) {
                Some(product) => items.push(CartEntry {
                    product_id: entry.product_id,
                    quantity: entry.quantity,
                    product: product.clone(),
                }),
                None => tracing::debug!(product_id = %entry.product_id, "dropping cart entry for unknown product"),
            }
        }
        Self { catalog, store, items }
    }

    pub fn items(&self) -> &[CartEntry] { &self.items }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn quantity_of(&self, product_id: &str) -> Option<u32> {
        self.items.iter().find(|i| i.product_id == product_id).map(|i| i.quantity)
    }

    /// Sum of quantities across all entries. Widened so that lines clamped
    /// at `u32::MAX` cannot overflow the total.
    pub fn total_items(&self) -> u64 { self.items.iter().map(|i| u64::from(i.quantity)).sum() }

    /// Σ price × quantity, computed on every call.
    pub fn subtotal(&self) -> Money { self.items.iter().map(CartEntry::line_total).sum() }

    /// Unknown product ids are ignored.
    pub fn add_to_cart(&mut self, product_id: &str) -> Result<()> {
        let Some(product) = self.catalog.get(product_id) else {
            tracing::debug!(product_id, "add_to_cart ignored unknown product");
            return Ok(());
        };
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            existing.quantity = existing.quantity.saturating_add(1);
        } else {
            self.items.push(CartEntry { product_id: product_id.to_owned(), quantity: 1, product: product.clone() });
        }
        self.persist()
    }

    /// Sets the quantity exactly; zero or negative removes the entry.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> Result<()> {
        if quantity <= 0 {
            return self.remove_from_cart(product_id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            existing.quantity = quantity;
        }
        self.persist()
    }

    pub fn remove_from_cart(&mut self, product_id: &str) -> Result<()> {
        self.items.retain(|i| i.product_id != product_id);
        self.persist()
    }

    /// Empties the cart and deletes its stored representation.
    pub fn clear_cart(&mut self) -> Result<()> {
        self.items.clear();
        tracing::debug!("cart cleared");
        self.store.remove(keys::CART)
    }

    fn persist(&self) -> Result<()> {
        let stored: Vec<StoredEntry> = self
            .items
            .iter()
            .map(|i| StoredEntry { product_id: i.product_id.clone(), quantity: i.quantity })
            .collect();
        save_json(self.store.as_ref(), keys::CART, &stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn fresh() -> (Arc<MemoryStore>, Cart) {
        let store = Arc::new(MemoryStore::new());
        let cart = Cart::hydrate(Arc::new(Catalog::builtin()), store.clone());
        (store, cart)
    }

    #[test]
    fn test_repeated_adds_accumulate() {
        let (_, mut cart) = fresh();
        for _ in 0..5 {
            cart.add_to_cart("2").unwrap();
        }
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of("2"), Some(5));
        assert_eq!(cart.total_items(), 5);
    }

    #[test]
    fn test_unknown_product_is_noop() {
        let (store, mut cart) = fresh();
        cart.add_to_cart("nonexistent").unwrap();
        assert_eq!(cart.total_items(), 0);
        assert!(cart.is_empty());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_update_quantity_sets_and_removes() {
        let (_, mut cart) = fresh();
        cart.add_to_cart("1").unwrap();
        cart.add_to_cart("3").unwrap();
        cart.update_quantity("1", 4).unwrap();
        assert_eq!(cart.quantity_of("1"), Some(4));

        cart.update_quantity("1", 0).unwrap();
        assert_eq!(cart.quantity_of("1"), None);
        cart.update_quantity("3", -2).unwrap();
        assert!(cart.is_empty());

        cart.update_quantity("4", 3).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_items_with_huge_quantities() {
        let (_, mut cart) = fresh();
        cart.add_to_cart("1").unwrap();
        cart.update_quantity("1", 3_000_000_000).unwrap();
        cart.add_to_cart("3").unwrap();
        cart.update_quantity("3", 3_000_000_000).unwrap();
        assert_eq!(cart.total_items(), 6_000_000_000);

        cart.update_quantity("3", i64::MAX).unwrap();
        assert_eq!(cart.quantity_of("3"), Some(u32::MAX));
        assert_eq!(cart.total_items(), 3_000_000_000 + u64::from(u32::MAX));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let (_, mut cart) = fresh();
        cart.add_to_cart("5").unwrap();
        cart.remove_from_cart("1").unwrap();
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn test_subtotal_tracks_mutations() {
        let (_, mut cart) = fresh();
        cart.add_to_cart("1").unwrap();
        cart.add_to_cart("1").unwrap();
        cart.add_to_cart("3").unwrap();
        assert_eq!(cart.subtotal().amount(), 4997);

        cart.update_quantity("3", 3).unwrap();
        assert_eq!(cart.subtotal().amount(), 2 * 1999 + 3 * 999);
        cart.remove_from_cart("1").unwrap();
        assert_eq!(cart.subtotal().amount(), 2997);
    }

    #[test]
    fn test_persists_pairs_without_snapshot() {
        let (store, mut cart) = fresh();
        cart.add_to_cart("1").unwrap();
        cart.add_to_cart("1").unwrap();
        let raw = store.get(keys::CART).unwrap().unwrap();
        assert_eq!(raw, r#"[{"productId":"1","quantity":2}]"#);

        cart.clear_cart().unwrap();
        assert!(cart.is_empty());
        assert_eq!(store.get(keys::CART).unwrap(), None);
    }

    #[test]
    fn test_hydrate_rejoins_against_catalog() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(keys::CART, r#"[{"productId":"1","quantity":2},{"productId":"gone","quantity":1},{"productId":"3","quantity":1}]"#)
            .unwrap();
        let cart = Cart::hydrate(Arc::new(Catalog::builtin()), store);
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].product.name, "AuraBuds Pro");
        assert_eq!(cart.subtotal().amount(), 4997);
    }

    #[test]
    fn test_hydrate_malformed_is_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::CART, "[{\"productId\":").unwrap();
        let cart = Cart::hydrate(Arc::new(Catalog::builtin()), store);
        assert!(cart.is_empty());
    }
}
