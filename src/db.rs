//! Database helpers.
//!
//! Builds the PostgreSQL pool used by the SQLx repositories and applies the
//! embedded migrations from `./migrations`.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::store::StoreError;

/// Type alias for the application database pool.
pub type AppDb = PgPool;

pub async fn connect(database_url: &str, max_connections: u32) -> Result<AppDb, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    info!("Connected to application database");
    Ok(pool)
}

pub async fn migrate(pool: &AppDb) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Application migrations complete");
    Ok(())
}
