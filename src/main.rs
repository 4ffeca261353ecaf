//! dealspot server entry point.
//!
//! Starts the Axum HTTP server over a PostgreSQL-backed store.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use dealspot::api;
use dealspot::app_state::AppState;
use dealspot::config::ServerConfig;
use dealspot::persistence::MarketStore;
use dealspot::persistence::postgres::PostgresStore;
use dealspot::service::{
    AnalyticsService, BusinessService, CatalogService, FavoriteService, RedemptionService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = ServerConfig::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!(addr = %config.listen_addr, "starting dealspot");

    // Connect to PostgreSQL and run pending migrations
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(std::time::Duration::from_secs(
            config.database_connect_timeout_secs,
        ))
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Build persistence and service layers
    let store: Arc<dyn MarketStore> = Arc::new(PostgresStore::new(pool));

    let app_state = AppState {
        catalog: Arc::new(CatalogService::new(Arc::clone(&store))),
        favorites: Arc::new(FavoriteService::new(Arc::clone(&store))),
        redemptions: Arc::new(RedemptionService::new(
            Arc::clone(&store),
            config.redemption_ttl_secs,
            config.qr_image_endpoint.clone(),
            config.qr_image_size,
        )),
        business: Arc::new(BusinessService::new(Arc::clone(&store))),
        analytics: Arc::new(AnalyticsService::new(
            Arc::clone(&store),
            config.analytics_recent_limit,
        )),
        store,
    };

    // Build router
    let app = api::build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
