/// Point imagery service: per-point imagery catalog summaries over HTTP
mod clients;
mod config;
mod domain;
mod errors;
mod handlers;
mod normalizer;
mod parser;
mod routes;
mod serializer;
mod services;
mod utils;

use crate::clients::CatalogClient;
use crate::config::AppConfig;
use crate::handlers::AppState;
use crate::routes::build_router;
use crate::services::CatalogService;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    // Load configuration
    let config = AppConfig::from_env()?;
    info!(
        "Configuration loaded (catalog: {}, max concurrency: {})",
        config.catalog.api_url, config.catalog.max_concurrency
    );

    // Initialize catalog client and service
    let catalog_client = CatalogClient::new(&config.catalog)?;
    let catalog_service = Arc::new(CatalogService::new(
        catalog_client,
        config.catalog.max_concurrency,
    ));

    let state = AppState { catalog_service };

    // Build router
    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("point_imagery service listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
