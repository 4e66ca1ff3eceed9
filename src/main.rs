//! OpenSASE Storefront - Self-hosted storefront and admin API

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use opensase_storefront::store::{
    CatalogStore, InMemoryCatalogStore, InMemoryVariantStore, PgCatalogStore, PgVariantStore, VariantStore,
};
use opensase_storefront::{routes, CatalogService, Config, Reconciler, UuidGenerator};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = Config::from_env()?;

    let (catalog, variants): (Arc<dyn CatalogStore>, Arc<dyn VariantStore>) = match &config.database_url {
        Some(url) => {
            let db = PgPoolOptions::new().max_connections(config.max_connections).connect(url).await?;
            sqlx::migrate!("./migrations").run(&db).await?;
            (Arc::new(PgCatalogStore::new(db.clone())), Arc::new(PgVariantStore::new(db)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores, data is lost on exit");
            (Arc::new(InMemoryCatalogStore::new()), Arc::new(InMemoryVariantStore::new()))
        }
    };

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => { tracing::warn!(error = %e, "NATS unavailable; product events will not be published"); None }
        },
        None => None,
    };

    let reconciler = Reconciler::new(Arc::new(UuidGenerator)).with_default_label(config.default_variant_label.clone());
    let service = CatalogService::new(catalog, variants, reconciler).with_nats(nats);
    let app = routes::router(service).layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive());

    let addr = config.bind_addr();
    tracing::info!("🚀 OpenSASE Storefront listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
