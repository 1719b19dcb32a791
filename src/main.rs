//! Zentek Storefront - headless storefront server

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zentek_storefront::config::StorefrontConfig;
use zentek_storefront::remote::HttpOrderService;
use zentek_storefront::{api, Catalog, FileStore, Storefront};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StorefrontConfig::from_env()?;
    let store = Arc::new(FileStore::open(&config.data_dir)?);
    let mut shop = Storefront::hydrate(Arc::new(Catalog::builtin()), store).with_payment_delay(config.payment_delay);
    if let Some(remote) = &config.remote {
        shop = shop.with_remote(Arc::new(HttpOrderService::new(&remote.url, &remote.token)?));
        tracing::info!(url = %remote.url, "remote order recording enabled");
    }
    tracing::info!(
        data_dir = %config.data_dir.display(),
        cart_items = shop.cart.total_items(),
        signed_in = shop.auth.is_authenticated(),
        "storefront state hydrated"
    );

    let app = api::router(Arc::new(Mutex::new(shop)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.socket_addr();
    tracing::info!("🚀 Zentek Storefront listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
