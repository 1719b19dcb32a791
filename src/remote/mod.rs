//! Remote order service port.
//!
//! The remote service is the system of record for orders when the shopper has
//! a remote identity. The storefront only ever calls `create_order` during
//! checkout; the other calls exist for order history and catalog lookups.

mod http;

pub use http::HttpOrderService;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{Product, ProductQuery};
use crate::domain::value_objects::Money;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteOrderItem {
    pub product_id: String,
    pub quantity: u32,
}

/// An order as the remote service stores it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteOrder {
    pub id: String,
    pub payment_method: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub total_amount: Money,
    pub address: String,
    pub timestamp: DateTime<Utc>,
    pub items: Vec<RemoteOrderItem>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<RemoteOrderItem>,
    pub payment_method: String,
    pub address: String,
}

#[async_trait]
pub trait OrderService: Send + Sync {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<RemoteOrder>;
    async fn get_my_orders(&self) -> Result<Vec<RemoteOrder>>;
    async fn get_product(&self, id: &str) -> Result<Product>;
    async fn get_products(&self, query: &ProductQuery) -> Result<Vec<Product>>;
}
