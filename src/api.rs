//! JSON API over a single [`Storefront`].
//!
//! The storefront models one shopper's browser, so the server holds exactly
//! one instance behind a mutex. Checkout keeps the lock across the payment
//! delay and the remote call, so a second submission waits for the first.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::checkout::{AddressForm, CheckoutOutcome, PaymentMethod, PriceSummary};
use crate::domain::aggregates::{CartEntry, LoginForm, Product, ProductQuery, SignupForm, StoredOrder, UserSession};
use crate::{Storefront, StorefrontError};

pub type AppState = Arc<Mutex<Storefront>>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "zentek-storefront"})) }))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/:id", get(get_product))
        .route("/api/v1/cart", get(get_cart).delete(clear_cart))
        .route("/api/v1/cart/items", post(add_cart_item))
        .route("/api/v1/cart/items/:id", put(update_cart_item).delete(remove_cart_item))
        .route("/api/v1/wishlist", get(get_wishlist))
        .route("/api/v1/wishlist/:id", put(add_wishlist_item).delete(remove_wishlist_item))
        .route("/api/v1/wishlist/:id/toggle", post(toggle_wishlist_item))
        .route("/api/v1/auth/signup", post(signup))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/auth/me", get(me))
        .route("/api/v1/checkout", post(checkout))
        .route("/api/v1/orders", get(list_orders))
        .with_state(state)
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    Storefront(StorefrontError),
    NotFound(String),
    Unauthorized(String),
    BadRequest(String),
}

impl From<StorefrontError> for ApiError {
    fn from(e: StorefrontError) -> Self { Self::Storefront(e) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            Self::NotFound(msg) => return (StatusCode::NOT_FOUND, msg).into_response(),
            Self::Unauthorized(msg) => return (StatusCode::UNAUTHORIZED, msg).into_response(),
            Self::BadRequest(msg) => return (StatusCode::BAD_REQUEST, msg).into_response(),
            Self::Storefront(err) => err,
        };
        match err {
            StorefrontError::Validation(fields) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(serde_json::json!({ "errors": fields }))).into_response()
            }
            StorefrontError::ProductNotFound => (StatusCode::NOT_FOUND, err.to_string()).into_response(),
            StorefrontError::EmptyCart => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
            StorefrontError::NotAuthenticated => (StatusCode::UNAUTHORIZED, err.to_string()).into_response(),
            StorefrontError::Remote(_) => {
                tracing::error!(error = %err, "remote order service error");
                (StatusCode::BAD_GATEWAY, "External service error".to_string()).into_response()
            }
            StorefrontError::Storage(_) | StorefrontError::Serialization(_) => {
                tracing::error!(error = %err, "request error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string()).into_response()
            }
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Views
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub discount_percent: i64,
    pub display_price: String,
    pub display_mrp: String,
}

impl From<&Product> for ProductView {
    fn from(p: &Product) -> Self {
        Self { discount_percent: p.discount_percent(), display_price: p.price.display(), display_mrp: p.mrp.display(), product: p.clone() }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartEntry>,
    pub total_items: u64,
    #[serde(flatten)]
    pub summary: PriceSummary,
}

impl From<&Storefront> for CartView {
    fn from(shop: &Storefront) -> Self {
        Self { items: shop.cart.items().to_vec(), total_items: shop.cart.total_items(), summary: shop.price_summary() }
    }
}

#[derive(Debug, Serialize)]
pub struct WishlistView {
    pub ids: Vec<String>,
    pub products: Vec<ProductView>,
}

impl From<&Storefront> for WishlistView {
    fn from(shop: &Storefront) -> Self {
        let ids = shop.wishlist.ids().to_vec();
        let products = ids.iter().filter_map(|id| shop.catalog().get(id)).map(ProductView::from).collect();
        Self { ids, products }
    }
}

// =============================================================================
// Catalog
// =============================================================================

async fn list_products(State(s): State<AppState>, Query(q): Query<ProductQuery>) -> Json<Vec<ProductView>> {
    let shop = s.lock().await;
    Json(shop.catalog().query(&q).iter().map(ProductView::from).collect())
}

async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<ProductView>> {
    let shop = s.lock().await;
    shop.catalog().get(&id).map(|p| Json(ProductView::from(p))).ok_or(ApiError::Storefront(StorefrontError::ProductNotFound))
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest { pub product_id: String }

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest { pub quantity: i64 }

async fn get_cart(State(s): State<AppState>) -> Json<CartView> {
    let shop = s.lock().await;
    Json(CartView::from(&*shop))
}

async fn add_cart_item(State(s): State<AppState>, Json(r): Json<AddItemRequest>) -> ApiResult<Json<CartView>> {
    let mut shop = s.lock().await;
    shop.cart.add_to_cart(&r.product_id)?;
    Ok(Json(CartView::from(&*shop)))
}

async fn update_cart_item(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<UpdateQuantityRequest>) -> ApiResult<Json<CartView>> {
    let mut shop = s.lock().await;
    shop.cart.update_quantity(&id, r.quantity)?;
    Ok(Json(CartView::from(&*shop)))
}

async fn remove_cart_item(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<CartView>> {
    let mut shop = s.lock().await;
    shop.cart.remove_from_cart(&id)?;
    Ok(Json(CartView::from(&*shop)))
}

async fn clear_cart(State(s): State<AppState>) -> ApiResult<StatusCode> {
    s.lock().await.cart.clear_cart()?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Wishlist
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse { pub in_wishlist: bool }

async fn get_wishlist(State(s): State<AppState>) -> Json<WishlistView> {
    let shop = s.lock().await;
    Json(WishlistView::from(&*shop))
}

async fn add_wishlist_item(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<WishlistView>> {
    let mut shop = s.lock().await;
    shop.wishlist.add_to_wishlist(&id)?;
    Ok(Json(WishlistView::from(&*shop)))
}

async fn remove_wishlist_item(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<WishlistView>> {
    let mut shop = s.lock().await;
    shop.wishlist.remove_from_wishlist(&id)?;
    Ok(Json(WishlistView::from(&*shop)))
}

async fn toggle_wishlist_item(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<ToggleResponse>> {
    let in_wishlist = s.lock().await.wishlist.toggle_wishlist(&id)?;
    Ok(Json(ToggleResponse { in_wishlist }))
}

// =============================================================================
// Auth
// =============================================================================

async fn signup(State(s): State<AppState>, Json(form): Json<SignupForm>) -> ApiResult<(StatusCode, Json<UserSession>)> {
    form.check().map_err(StorefrontError::Validation)?;
    let mut shop = s.lock().await;
    if !shop.auth.signup(form.name.trim(), form.email.trim(), &form.password)? {
        return Err(ApiError::BadRequest("Something went wrong. Please try again.".into()));
    }
    let user = shop.auth.user().cloned().ok_or(StorefrontError::NotAuthenticated)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(State(s): State<AppState>, Json(form): Json<LoginForm>) -> ApiResult<Json<UserSession>> {
    let mut shop = s.lock().await;
    if !shop.auth.login(form.email.trim(), &form.password)? {
        return Err(ApiError::Unauthorized("Invalid email or password".into()));
    }
    shop.auth.user().cloned().map(Json).ok_or(ApiError::Storefront(StorefrontError::NotAuthenticated))
}

async fn logout(State(s): State<AppState>) -> ApiResult<StatusCode> {
    s.lock().await.auth.logout()?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me(State(s): State<AppState>) -> ApiResult<Json<UserSession>> {
    let shop = s.lock().await;
    shop.auth.user().cloned().map(Json).ok_or(ApiError::Storefront(StorefrontError::NotAuthenticated))
}

// =============================================================================
// Checkout & orders
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub address: AddressForm,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

async fn checkout(State(s): State<AppState>, Json(r): Json<CheckoutRequest>) -> ApiResult<(StatusCode, Json<CheckoutOutcome>)> {
    let mut shop = s.lock().await;
    let outcome = shop.checkout(&r.address, r.payment_method).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn list_orders(State(s): State<AppState>) -> ApiResult<Json<Vec<StoredOrder>>> {
    let shop = s.lock().await;
    Ok(Json(shop.order_history()?))
}
