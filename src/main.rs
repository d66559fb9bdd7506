//! # Customer/Order API
//!
//! A token-authenticated CRUD service for customers and orders.
//!
//! ## Architecture
//!
//! - Axum handles HTTP routing and request/response lifecycle
//! - SQLx manages the PostgreSQL store (or an in-memory store for local runs)
//! - JWT bearer tokens gate every route except `/api/login` and `/api/register`

use customer_order_api::{create_app, AppConfig, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "customer_order_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    info!(storage = ?config.storage, "Starting customer/order API");

    let state = AppState::from_config(&config).await?;
    let app = create_app(state);

    // Bind and serve
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
