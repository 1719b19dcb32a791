//! Wishlist Aggregate

use std::sync::Arc;

use crate::domain::aggregates::product::Catalog;
use crate::storage::{keys, load_json, save_json, KeyValueStore};
use crate::Result;

/// Ordered set of catalog product ids.
#[derive(Debug)]
pub struct Wishlist {
    catalog: Arc<Catalog>,
    store: Arc<dyn KeyValueStore>,
    ids: Vec<String>,
}

impl Wishlist {
    /// Loads the stored ids, dropping duplicates and ids the catalog no longer has.
    pub fn hydrate(catalog: Arc<Catalog>, store: Arc<dyn KeyValueStore>) -> Self {
        let stored: Vec<String> = load_json(store.as_ref(), keys::WISHLIST).unwrap_or_default();
        let mut ids: Vec<String> = Vec::with_capacity(stored.len());
        for id in stored {
            if !catalog.contains(&id) {
                tracing::debug!(product_id = %id, "dropping wishlist id for unknown product");
                continue;
            }
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Self { catalog, store, ids }
    }

    pub fn ids(&self) -> &[String] { &self.ids }
    pub fn len(&self) -> usize { self.ids.len() }
    pub fn is_empty(&self) -> bool { self.ids.is_empty() }
    pub fn is_in_wishlist(&self, product_id: &str) -> bool { self.ids.iter().any(|id| id == product_id) }

    /// Unknown product ids are ignored.
    pub fn add_to_wishlist(&mut self, product_id: &str) -> Result<()> {
        if !self.catalog.contains(product_id) {
            tracing::debug!(product_id, "add_to_wishlist ignored unknown product");
            return Ok(());
        }
        if !self.is_in_wishlist(product_id) {
            self.ids.push(product_id.to_owned());
        }
        self.persist()
    }

    pub fn remove_from_wishlist(&mut self, product_id: &str) -> Result<()> {
        self.ids.retain(|id| id != product_id);
        self.persist()
    }

    /// Flips membership and returns whether the id is now present. An unknown
    /// id is left out and reported as absent.
    pub fn toggle_wishlist(&mut self, product_id: &str) -> Result<bool> {
        if !self.catalog.contains(product_id) {
            tracing::debug!(product_id, "toggle_wishlist ignored unknown product");
            return Ok(false);
        }
        let now_present = if self.is_in_wishlist(product_id) {
            self.ids.retain(|id| id != product_id);
            false
        } else {
            self.ids.push(product_id.to_owned());
            true
        };
        self.persist()?;
        Ok(now_present)
    }

    fn persist(&self) -> Result<()> {
        tracing::debug!(count = self.ids.len(), "saving wishlist");
        save_json(self.store.as_ref(), keys::WISHLIST, &self.ids)
    }
}
