//! Shared application state handed to the routers.

use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::{AppConfig, StorageKind};
use crate::db;
use crate::models::{Customer, Order};
use crate::store::{
    MemoryRepository, MemoryUserRepository, PgResourceRepository, PgUserRepository,
    ResourceRepository, StoreError, UserRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub customers: Arc<dyn ResourceRepository<Customer>>,
    pub orders: Arc<dyn ResourceRepository<Order>>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: TokenService,
    pub app_url: Arc<str>,
    pub page_size: u32,
}

impl AppState {
    /// State backed by PostgreSQL. Connects and runs migrations.
    pub async fn postgres(config: &AppConfig) -> Result<Self, StoreError> {
        let pool = db::connect(&config.database_url, config.db_max_connections).await?;
        db::migrate(&pool).await?;

        Ok(Self::with_repositories(
            config,
            Arc::new(PgResourceRepository::<Customer>::new(pool.clone())),
            Arc::new(PgResourceRepository::<Order>::new(pool.clone())),
            Arc::new(PgUserRepository::new(pool)),
        ))
    }

    /// State backed by in-process repositories.
    pub fn memory(config: &AppConfig) -> Self {
        Self::with_repositories(
            config,
            Arc::new(MemoryRepository::<Customer>::new()),
            Arc::new(MemoryRepository::<Order>::new()),
            Arc::new(MemoryUserRepository::new()),
        )
    }

    pub fn with_repositories(
        config: &AppConfig,
        customers: Arc<dyn ResourceRepository<Customer>>,
        orders: Arc<dyn ResourceRepository<Order>>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            customers,
            orders,
            users,
            tokens: TokenService::new(&config.jwt_secret, config.jwt_ttl_minutes),
            app_url: Arc::from(config.app_url.as_str()),
            page_size: config.page_size.max(1),
        }
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        match config.storage {
            StorageKind::Postgres => Self::postgres(config).await,
            StorageKind::Memory => Ok(Self::memory(config)),
        }
    }
}
