//! Data access for resources and accounts.
//!
//! Handlers only see the [`ResourceRepository`] and [`UserRepository`]
//! traits. `postgres` backs them with SQLx; `memory` keeps everything in
//! process for tests and database-less local runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewUser, Resource, User};
use crate::pagination::Page;

pub use memory::{MemoryRepository, MemoryUserRepository};
pub use postgres::{PgResourceRepository, PgUserRepository};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// CRUD, pagination and name search for one resource type.
#[async_trait]
pub trait ResourceRepository<R: Resource>: Send + Sync {
    /// Every row, ordered by id.
    async fn list(&self) -> Result<Vec<R>, StoreError>;

    /// One page of rows. Pages past the end come back empty.
    async fn paginate(&self, page: u32, per_page: u32) -> Result<Page<R>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<R>, StoreError>;

    /// Rows whose name contains `needle`, ignoring case.
    async fn search_by_name(&self, needle: &str) -> Result<Vec<R>, StoreError>;

    async fn create(&self, fields: R::Fields, owner_user_id: i64) -> Result<R, StoreError>;

    /// Apply `fields` to the stored row. `None` if the row is gone by the
    /// time the write lands.
    async fn update(&self, existing: R, fields: R::Fields) -> Result<Option<R>, StoreError>;

    async fn delete(&self, existing: &R) -> Result<(), StoreError>;
}

/// Accounts and the revoked-token list consulted by the token verifier.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), StoreError>;

    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, StoreError>;
}
