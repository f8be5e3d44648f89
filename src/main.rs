use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use hnb_ipg::api::{self, AppState};
use hnb_ipg::config::Config;
use hnb_ipg::database::{self, order_repository::OrderRepository, PoolConfig};
use hnb_ipg::gateway::{IpgGateway, PaymentGateway};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting HNB IPG backend");
    tracing::info!("Environment: {}", config.server.environment);
    tracing::info!("Shop currency: {}", config.shop.currency);

    let pool = database::init_pool(
        &config.database.url,
        Some(PoolConfig {
            max_connections: config.database.max_connections,
            ..PoolConfig::default()
        }),
    )
    .await?;

    let orders = Arc::new(OrderRepository::new(pool.clone()));
    let gateway = Arc::new(IpgGateway::new(&config.gateway, &config.shop, orders));

    if !gateway.is_available() {
        tracing::warn!("Gateway is not available; checkout requests will be refused");
    }

    let state = AppState {
        config: config.clone(),
        gateway,
        pool,
    };

    // Build router
    let app = Router::new()
        .route("/health", get(api::health::health_check))
        .route("/pay/:order_id", get(api::checkout::receipt_page))
        .route(
            "/gateway/callback",
            get(api::callback::handle_get).post(api::callback::handle_post),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
