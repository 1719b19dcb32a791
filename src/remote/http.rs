use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::{CreateOrderRequest, OrderService, RemoteOrder};
use crate::domain::aggregates::{Product, ProductQuery, SortField};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON-over-HTTP client for the remote order service.
///
/// Every request carries the shopper's remote identity as a bearer token.
pub struct HttpOrderService {
    endpoint: String,
    token: String,
    http: reqwest::Client,
}

impl HttpOrderService {
    pub fn new(endpoint: &str, token: &str) -> Result<Self> { Self::with_timeout(endpoint, token, REQUEST_TIMEOUT) }

    /// Same as [`HttpOrderService::new`] with a custom per-request timeout.
    pub fn with_timeout(endpoint: &str, token: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building order service client")?;
        Ok(Self { endpoint: endpoint.trim_end_matches('/').to_string(), token: token.to_owned(), http })
    }

    async fn read<T: DeserializeOwned>(response: reqwest::Response, op: &str) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("order service {op} HTTP {status}: {text}");
        }
        response.json().await.with_context(|| format!("order service {op} parse"))
    }
}

#[async_trait]
impl OrderService for HttpOrderService {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<RemoteOrder> {
        let response = self
            .http
            .post(format!("{}/orders", self.endpoint))
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .context("order service create_order transport")?;
        Self::read(response, "create_order").await
    }

    async fn get_my_orders(&self) -> Result<Vec<RemoteOrder>> {
        let response = self
            .http
            .get(format!("{}/orders/mine", self.endpoint))
            .bearer_auth(&self.token)
            .send()
            .await
            .context("order service get_my_orders transport")?;
        Self::read(response, "get_my_orders").await
    }

    async fn get_product(&self, id: &str) -> Result<Product> {
        let response = self
            .http
            .get(format!("{}/products/{id}", self.endpoint))
            .bearer_auth(&self.token)
            .send()
            .await
            .context("order service get_product transport")?;
        Self::read(response, "get_product").await
    }

    async fn get_products(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(offset) = query.offset {
            params.push(("offset", offset.to_string()));
        }
        if let Some(sort) = query.sort {
            let value = match sort {
                SortField::PriceAscending => "priceAscending",
                SortField::PriceDescending => "priceDescending",
            };
            params.push(("sort", value.to_string()));
        }
        let response = self
            .http
            .get(format!("{}/products", self.endpoint))
            .bearer_auth(&self.token)
            .query(&params)
            .send()
            .await
            .context("order service get_products transport")?;
        Self::read(response, "get_products").await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::extract::{Path, Query};
    use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::checkout::{AddressForm, LocalReason, PaymentMethod, Recording};
    use crate::domain::aggregates::Catalog;
    use crate::remote::RemoteOrderItem;
    use crate::storage::MemoryStore;
    use crate::Storefront;

    const TOKEN: &str = "shopper-token";

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some("Bearer shopper-token")
    }

    async fn create_order(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if !authorized(&headers) {
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": "missing token"})));
        }
        let order = json!({
            "id": "ord-1",
            "paymentMethod": body["paymentMethod"],
            "totalAmount": 1999,
            "address": body["address"],
            "timestamp": "2026-01-01T00:00:00Z",
            "items": body["items"],
        });
        (StatusCode::CREATED, Json(order))
    }

    async fn list_products(Query(params): Query<HashMap<String, String>>) -> Result<Json<Vec<Product>>, StatusCode> {
        let sort = match params.get("sort").map(String::as_str) {
            None => None,
            Some("priceAscending") => Some(SortField::PriceAscending),
            Some("priceDescending") => Some(SortField::PriceDescending),
            Some(_) => return Err(StatusCode::BAD_REQUEST),
        };
        let query = ProductQuery {
            search: params.get("search").cloned(),
            sort,
            limit: params.get("limit").and_then(|v| v.parse().ok()),
            offset: params.get("offset").and_then(|v| v.parse().ok()),
        };
        Ok(Json(Catalog::builtin().query(&query)))
    }

    async fn get_product(Path(id): Path<String>) -> Result<Json<Product>, StatusCode> {
        Catalog::builtin().get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
    }

    fn request() -> CreateOrderRequest {
        CreateOrderRequest {
            items: vec![RemoteOrderItem { product_id: "1".into(), quantity: 1 }],
            payment_method: "Razorpay".into(),
            address: "Rahul Sharma, 9876543210, 12 MG Road, Mumbai, Maharashtra - 400001".into(),
        }
    }

    #[tokio::test]
    async fn test_create_order_sends_bearer_token() {
        let url = serve(Router::new().route("/orders", post(create_order))).await;

        let client = HttpOrderService::new(&format!("{url}/"), TOKEN).unwrap();
        let order = client.create_order(request()).await.unwrap();
        assert_eq!(order.id, "ord-1");
        assert_eq!(order.payment_method, "Razorpay");
        assert_eq!(order.items, request().items);
        assert_eq!(order.user_id, None);

        let anonymous = HttpOrderService::new(&url, "wrong").unwrap();
        let err = anonymous.create_order(request()).await.unwrap_err();
        assert!(err.to_string().contains("HTTP 401"), "{err}");
    }

    #[tokio::test]
    async fn test_server_error_and_bad_body_are_errors() {
        let app = Router::new()
            .route("/orders", post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }))
            .route("/orders/mine", get(|| async { Json(json!({"unexpected": true})) }));
        let client = HttpOrderService::new(&serve(app).await, TOKEN).unwrap();

        let err = client.create_order(request()).await.unwrap_err();
        assert!(err.to_string().contains("HTTP 500"), "{err}");
        assert!(err.to_string().contains("boom"), "{err}");

        let err = client.get_my_orders().await.unwrap_err();
        assert!(err.to_string().contains("get_my_orders parse"), "{err}");
    }

    #[tokio::test]
    async fn test_product_lookups_encode_query() {
        let app = Router::new()
            .route("/products", get(list_products))
            .route("/products/:id", get(get_product));
        let client = HttpOrderService::new(&serve(app).await, TOKEN).unwrap();

        let query = ProductQuery {
            search: Some("charg".into()),
            sort: Some(SortField::PriceAscending),
            limit: Some(2),
            offset: None,
        };
        let products = client.get_products(&query).await.unwrap();
        assert_eq!(products.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["5", "4"]);

        assert_eq!(client.get_product("3").await.unwrap().name, "SnapGrip");
        assert!(client.get_product("99").await.is_err());
    }

    #[tokio::test]
    async fn test_slow_service_times_out_into_local_order() {
        let slow = post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            StatusCode::CREATED
        });
        let url = serve(Router::new().route("/orders", slow)).await;
        let client = HttpOrderService::with_timeout(&url, TOKEN, Duration::from_millis(100)).unwrap();

        assert!(client.create_order(request()).await.is_err());

        let mut shop = Storefront::hydrate(Arc::new(Catalog::builtin()), Arc::new(MemoryStore::new()))
            .with_remote(Arc::new(client));
        shop.cart.add_to_cart("1").unwrap();
        let address = AddressForm {
            name: "Rahul Sharma".into(),
            phone: "9876543210".into(),
            address1: "12 MG Road".into(),
            address2: String::new(),
            city: "Mumbai".into(),
            state: "Maharashtra".into(),
            pincode: "400001".into(),
        };
        let outcome = shop.checkout(&address, PaymentMethod::CashOnDelivery).await.unwrap();
        assert!(outcome.order_id.starts_with("ZTK"));
        assert!(matches!(outcome.recording, Recording::LocalOnly { reason: LocalReason::RemoteFailed(_) }));
        assert!(shop.cart.is_empty());
    }
}
