//! The storefront context: one catalog, one store, the three state containers
//! and the order book, plus the optional remote order service.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::checkout::{fallback_order_id, AddressForm, CheckoutOutcome, LocalReason, PaymentMethod, PriceSummary, Recording};
use crate::domain::aggregates::{Auth, Cart, Catalog, OrderBook, OrderLine, StoredOrder, Wishlist};
use crate::remote::{CreateOrderRequest, OrderService, RemoteOrder, RemoteOrderItem};
use crate::storage::KeyValueStore;
use crate::{Result, StorefrontError};

pub struct Storefront {
    catalog: Arc<Catalog>,
    pub cart: Cart,
    pub wishlist: Wishlist,
    pub auth: Auth,
    orders: OrderBook,
    remote: Option<Arc<dyn OrderService>>,
    payment_delay: Duration,
}

impl Storefront {
    /// Hydrates every container from `store`.
    pub fn hydrate(catalog: Arc<Catalog>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            cart: Cart::hydrate(catalog.clone(), store.clone()),
            wishlist: Wishlist::hydrate(catalog.clone(), store.clone()),
            auth: Auth::hydrate(store.clone()),
            orders: OrderBook::new(store),
            catalog,
            remote: None,
            payment_delay: Duration::ZERO,
        }
    }

    pub fn with_remote(mut self, remote: Arc<dyn OrderService>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Simulated gateway time for online payments.
    pub fn with_payment_delay(mut self, delay: Duration) -> Self {
        self.payment_delay = delay;
        self
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }
    pub fn has_remote(&self) -> bool { self.remote.is_some() }

    pub fn price_summary(&self) -> PriceSummary { PriceSummary::for_subtotal(self.cart.subtotal()) }

    /// Validates the address, takes payment, records the order and empties
    /// the cart.
    ///
    /// A failing remote service does not fail checkout: the order is kept
    /// locally under the fallback id and the outcome says so. Once the remote
    /// service has accepted the order, local write failures are only logged.
    pub async fn checkout(&mut self, address: &AddressForm, payment: PaymentMethod) -> Result<CheckoutOutcome> {
        address.check().map_err(StorefrontError::Validation)?;
        if self.cart.is_empty() {
            return Err(StorefrontError::EmptyCart);
        }

        if payment == PaymentMethod::Online && !self.payment_delay.is_zero() {
            tracing::debug!(delay_ms = self.payment_delay.as_millis() as u64, "processing payment");
            tokio::time::sleep(self.payment_delay).await;
        }

        let summary = self.price_summary();
        let fallback_id = fallback_order_id();
        let (order_id, recording) = match self.create_remote(address, payment).await {
            Ok(Some(remote)) => (remote.id, Recording::Remote),
            Ok(None) => (fallback_id, Recording::LocalOnly { reason: LocalReason::NoRemoteIdentity }),
            Err(e) => {
                tracing::warn!(error = %e, order_id = %fallback_id, "remote order failed, recording locally");
                (fallback_id, Recording::LocalOnly { reason: LocalReason::RemoteFailed(e.to_string()) })
            }
        };

        let recorded_remotely = matches!(recording, Recording::Remote);
        let saved = self
            .orders
            .record(StoredOrder {
                order_id: order_id.clone(),
                date: Utc::now(),
                items: self.cart.items().iter().map(OrderLine::from).collect(),
                total_amount: summary.grand_total,
                payment_method: payment.label().to_string(),
                recorded_remotely,
            })
            .and_then(|()| self.cart.clear_cart());

        // The remote service already holds the order: the cart must not stay full.
        if let Err(e) = saved {
            if !recorded_remotely {
                return Err(e);
            }
            tracing::error!(error = %e, order_id = %order_id, "remote order placed but local bookkeeping failed");
            if !self.cart.is_empty() {
                if let Err(e) = self.cart.clear_cart() {
                    tracing::error!(error = %e, order_id = %order_id, "could not clear cart after remote order");
                }
            }
        }

        Ok(CheckoutOutcome { order_id, total_amount: summary.grand_total, recording })
    }

    async fn create_remote(&self, address: &AddressForm, payment: PaymentMethod) -> anyhow::Result<Option<RemoteOrder>> {
        let Some(remote) = &self.remote else {
            return Ok(None);
        };
        let request = CreateOrderRequest {
            items: self
                .cart
                .items()
                .iter()
                .map(|i| RemoteOrderItem { product_id: i.product_id.clone(), quantity: i.quantity })
                .collect(),
            payment_method: payment.label().to_string(),
            address: address.summary(),
        };
        remote.create_order(request).await.map(Some)
    }

    /// Local order history, newest first. Only visible when signed in.
    pub fn order_history(&self) -> Result<Vec<StoredOrder>> {
        if !self.auth.is_authenticated() {
            return Err(StorefrontError::NotAuthenticated);
        }
        Ok(self.orders.list())
    }

    pub fn order(&self, order_id: &str) -> Option<StoredOrder> { self.orders.get(order_id) }

    /// Orders held by the remote service; empty when none is configured.
    pub async fn remote_orders(&self) -> Result<Vec<RemoteOrder>> {
        match &self.remote {
            Some(remote) => remote.get_my_orders().await.map_err(|e| StorefrontError::Remote(e.to_string())),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::testing::ScriptedOrderService;
    use crate::storage::{keys, MemoryStore};

    fn address() -> AddressForm {
        AddressForm {
            name: "Rahul Sharma".into(),
            phone: "9876543210".into(),
            address1: "12 MG Road".into(),
            address2: String::new(),
            city: "Mumbai".into(),
            state: "Maharashtra".into(),
            pincode: "400001".into(),
        }
    }

    fn storefront() -> (Arc<MemoryStore>, Storefront) {
        let store = Arc::new(MemoryStore::new());
        let shop = Storefront::hydrate(Arc::new(Catalog::builtin()), store.clone());
        (store, shop)
    }

    #[test]
    fn test_price_summary_scenarios() {
        let (_, mut shop) = storefront();
        let empty = shop.price_summary();
        assert_eq!(empty.subtotal.amount(), 0);
        assert_eq!(empty.delivery_charge.amount(), 99);

        shop.cart.add_to_cart("1").unwrap();
        shop.cart.add_to_cart("1").unwrap();
        shop.cart.add_to_cart("3").unwrap();
        let summary = shop.price_summary();
        assert_eq!(summary.subtotal.amount(), 4997);
        assert_eq!(summary.delivery_charge.amount(), 0);
        assert_eq!(summary.grand_total.amount(), 4997);
    }

    #[tokio::test]
    async fn test_local_checkout_records_and_clears() {
        let (store, mut shop) = storefront();
        shop.cart.add_to_cart("5").unwrap();

        let outcome = shop.checkout(&address(), PaymentMethod::CashOnDelivery).await.unwrap();
        assert!(outcome.order_id.starts_with("ZTK"));
        assert_eq!(outcome.total_amount.amount(), 799 + 99);
        assert_eq!(outcome.recording, Recording::LocalOnly { reason: LocalReason::NoRemoteIdentity });
        assert!(shop.cart.is_empty());
        assert_eq!(store.get(keys::CART).unwrap(), None);

        let order = shop.order(&outcome.order_id).unwrap();
        assert_eq!(order.payment_method, "Cash on Delivery");
        assert_eq!(order.items, vec![OrderLine { name: "LumiCam".into(), quantity: 1, price: crate::Money::new(799) }]);
        assert!(!order.recorded_remotely);
    }

    #[tokio::test]
    async fn test_remote_checkout_uses_remote_id() {
        let remote = Arc::new(ScriptedOrderService::accepting());
        let (_, shop) = storefront();
        let mut shop = shop.with_remote(remote.clone());
        shop.cart.add_to_cart("2").unwrap();
        shop.cart.add_to_cart("2").unwrap();

        let outcome = shop.checkout(&address(), PaymentMethod::Online).await.unwrap();
        assert_eq!(outcome.order_id, "remote-1");
        assert!(outcome.recorded_remotely());
        assert_eq!(remote.calls(), 1);

        let created = remote.created.lock().unwrap();
        let sent = &created[0];
        assert_eq!(sent.payment_method, "Razorpay");
        assert_eq!(sent.items, vec![RemoteOrderItem { product_id: "2".into(), quantity: 2 }]);
        assert_eq!(sent.address, address().summary());
        drop(created);
        assert!(shop.order("remote-1").unwrap().recorded_remotely);
    }

    /// Fails every write to the order list.
    #[derive(Debug, Default)]
    struct BrokenOrdersStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for BrokenOrdersStore {
        fn get(&self, key: &str) -> Result<Option<String>> { self.inner.get(key) }
        fn set(&self, key: &str, value: &str) -> Result<()> {
            if key == keys::ORDERS {
                return Err(StorefrontError::Storage("disk full".into()));
            }
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<()> { self.inner.remove(key) }
    }

    #[tokio::test]
    async fn test_remote_order_is_not_repeated_after_local_write_failure() {
        let remote = Arc::new(ScriptedOrderService::accepting());
        let store = Arc::new(BrokenOrdersStore::default());
        let mut shop = Storefront::hydrate(Arc::new(Catalog::builtin()), store.clone()).with_remote(remote.clone());
        shop.cart.add_to_cart("1").unwrap();

        let outcome = shop.checkout(&address(), PaymentMethod::CashOnDelivery).await.unwrap();
        assert_eq!(outcome.order_id, "remote-1");
        assert!(shop.cart.is_empty());
        assert_eq!(store.get(keys::CART).unwrap(), None);
        assert!(shop.order("remote-1").is_none());

        let err = shop.checkout(&address(), PaymentMethod::CashOnDelivery).await.unwrap_err();
        assert!(matches!(err, StorefrontError::EmptyCart));
        assert_eq!(remote.calls(), 1);
    }

    #[tokio::test]
    async fn test_local_write_failure_keeps_cart() {
        let mut shop = Storefront::hydrate(Arc::new(Catalog::builtin()), Arc::new(BrokenOrdersStore::default()));
        shop.cart.add_to_cart("1").unwrap();

        let err = shop.checkout(&address(), PaymentMethod::CashOnDelivery).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Storage(_)));
        assert_eq!(shop.cart.quantity_of("1"), Some(1));
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_local() {
        let (_, shop) = storefront();
        let mut shop = shop.with_remote(Arc::new(ScriptedOrderService::failing()));
        shop.cart.add_to_cart("3").unwrap();

        let outcome = shop.checkout(&address(), PaymentMethod::CashOnDelivery).await.unwrap();
        assert!(outcome.order_id.starts_with("ZTK"));
        match &outcome.recording {
            Recording::LocalOnly { reason: LocalReason::RemoteFailed(msg) } => assert!(msg.contains("unavailable")),
            other => panic!("unexpected recording {other:?}"),
        }
        assert!(shop.cart.is_empty());
        assert!(shop.order(&outcome.order_id).is_some());
    }

    #[tokio::test]
    async fn test_checkout_rejects_empty_cart_and_bad_address() {
        let (_, mut shop) = storefront();
        let err = shop.checkout(&address(), PaymentMethod::Online).await.unwrap_err();
        assert!(matches!(err, StorefrontError::EmptyCart));

        shop.cart.add_to_cart("1").unwrap();
        let bad = AddressForm { pincode: "12".into(), ..address() };
        let err = shop.checkout(&bad, PaymentMethod::Online).await.unwrap_err();
        match err {
            StorefrontError::Validation(fields) => assert!(fields.get("pincode").is_some()),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(shop.cart.total_items(), 1);
    }

    #[tokio::test]
    async fn test_online_payment_waits_for_gateway() {
        let (_, shop) = storefront();
        let mut shop = shop.with_payment_delay(Duration::from_millis(20));
        shop.cart.add_to_cart("4").unwrap();
        let started = std::time::Instant::now();
        shop.checkout(&address(), PaymentMethod::Online).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_order_history_requires_session() {
        let (_, mut shop) = storefront();
        shop.cart.add_to_cart("1").unwrap();
        shop.checkout(&address(), PaymentMethod::CashOnDelivery).await.unwrap();
        shop.cart.add_to_cart("3").unwrap();
        let second = shop.checkout(&address(), PaymentMethod::CashOnDelivery).await.unwrap();

        assert!(matches!(shop.order_history(), Err(StorefrontError::NotAuthenticated)));
        shop.auth.signup("Rahul", "rahul@example.com", "secret1").unwrap();
        let history = shop.order_history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].order_id, second.order_id);
    }

    #[tokio::test]
    async fn test_state_survives_rehydration() {
        let (store, mut shop) = storefront();
        shop.cart.add_to_cart("1").unwrap();
        shop.wishlist.toggle_wishlist("4").unwrap();
        shop.auth.signup("Rahul", "rahul@example.com", "secret1").unwrap();

        let again = Storefront::hydrate(Arc::new(Catalog::builtin()), store);
        assert_eq!(again.cart.quantity_of("1"), Some(1));
        assert!(again.wishlist.is_in_wishlist("4"));
        assert_eq!(again.auth.user().unwrap().email, "rahul@example.com");
        assert!(again.remote_orders().await.unwrap().is_empty());
    }
}
