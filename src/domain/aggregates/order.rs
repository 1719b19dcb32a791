//! Order Aggregate: the append-only local order history

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::cart::CartEntry;
use crate::domain::value_objects::Money;
use crate::storage::{keys, load_json, save_json, KeyValueStore};
use crate::Result;

/// Line snapshot taken at checkout; later catalog changes do not touch it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub quantity: u32,
    pub price: Money,
}

impl From<&CartEntry> for OrderLine {
    fn from(entry: &CartEntry) -> Self {
        Self { name: entry.product.name.clone(), quantity: entry.quantity, price: entry.product.price }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredOrder {
    pub order_id: String,
    pub date: DateTime<Utc>,
    pub items: Vec<OrderLine>,
    pub total_amount: Money,
    pub payment_method: String,
    #[serde(default)]
    pub recorded_remotely: bool,
}

/// Persisted order list, newest first. Entries are never edited.
#[derive(Debug)]
pub struct OrderBook {
    store: Arc<dyn KeyValueStore>,
}

impl OrderBook {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self { Self { store } }

    /// Reads the list fresh from storage; a malformed list reads as empty.
    pub fn list(&self) -> Vec<StoredOrder> { load_json(self.store.as_ref(), keys::ORDERS).unwrap_or_default() }

    pub fn get(&self, order_id: &str) -> Option<StoredOrder> {
        self.list().into_iter().find(|o| o.order_id == order_id)
    }

    pub fn record(&self, order: StoredOrder) -> Result<()> {
        let mut orders = self.list();
        tracing::info!(order_id = %order.order_id, total = order.total_amount.amount(), "recording order");
        orders.insert(0, order);
        save_json(self.store.as_ref(), keys::ORDERS, &orders)
    }
}
