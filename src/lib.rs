//! # Customer/Order API Library
//!
//! Exposes the Axum router and modules so integration tests can create an
//! in-process server without requiring `cargo run` in another terminal.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::AppConfig;
pub use state::AppState;

/// Build the Axum router with all route modules and middleware.
///
/// The API is mounted under `/api`. This function does NOT bind a listener.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_router(&state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
