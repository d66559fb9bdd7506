//! PostgreSQL repositories.
//!
//! One generic repository serves both resource tables; the per-table column
//! list and bind order come from [`PgResource`].

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgPool, Postgres};
use tracing::debug;
use uuid::Uuid;

use super::{ResourceRepository, StoreError, UserRepository};
use crate::models::{Customer, CustomerFields, NewUser, Order, OrderFields, Resource, User};
use crate::pagination::Page;

type PgQueryAs<'q, O> = QueryAs<'q, Postgres, O, PgArguments>;

/// Table layout of a resource stored in PostgreSQL.
pub trait PgResource: Resource + for<'r> FromRow<'r, PgRow> {
    const TABLE: &'static str;
    /// Mutable columns, in the order [`PgResource::bind_fields`] binds them.
    const COLUMNS: &'static [&'static str];

    fn bind_fields<'q>(query: PgQueryAs<'q, Self>, fields: Self::Fields) -> PgQueryAs<'q, Self>;
}

impl PgResource for Customer {
    const TABLE: &'static str = "customers";
    const COLUMNS: &'static [&'static str] = &["name", "address", "phone"];

    fn bind_fields<'q>(query: PgQueryAs<'q, Self>, fields: CustomerFields) -> PgQueryAs<'q, Self> {
        query
            .bind(fields.name)
            .bind(fields.address)
            .bind(fields.phone)
    }
}

impl PgResource for Order {
    const TABLE: &'static str = "orders";
    const COLUMNS: &'static [&'static str] = &["name", "quantity", "price"];

    fn bind_fields<'q>(query: PgQueryAs<'q, Self>, fields: OrderFields) -> PgQueryAs<'q, Self> {
        query
            .bind(fields.name)
            .bind(fields.quantity)
            .bind(fields.price)
    }
}

/// SQL text for one table, rendered once at construction.
struct Statements {
    list: String,
    count: String,
    page: String,
    find: String,
    search: String,
    insert: String,
    update: String,
    delete: String,
}

impl Statements {
    fn render(table: &str, columns: &[&str]) -> Self {
        let n = columns.len();
        let placeholders: Vec<String> = (1..=n).map(|i| format!("${i}")).collect();
        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{col} = ${}", i + 1))
            .collect();

        Self {
            list: format!("SELECT * FROM {table} ORDER BY id"),
            count: format!("SELECT COUNT(*) FROM {table}"),
            page: format!("SELECT * FROM {table} ORDER BY id LIMIT $1 OFFSET $2"),
            find: format!("SELECT * FROM {table} WHERE id = $1"),
            search: format!("SELECT * FROM {table} WHERE name ILIKE $1 ORDER BY id"),
            insert: format!(
                "INSERT INTO {table} ({}, owner_user_id) VALUES ({}, ${}) RETURNING *",
                columns.join(", "),
                placeholders.join(", "),
                n + 1
            ),
            update: format!(
                "UPDATE {table} SET {}, updated_at = NOW() WHERE id = ${} RETURNING *",
                assignments.join(", "),
                n + 1
            ),
            delete: format!("DELETE FROM {table} WHERE id = $1"),
        }
    }
}

/// Escape LIKE metacharacters so the needle matches literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

pub struct PgResourceRepository<R> {
    pool: PgPool,
    sql: Statements,
    _resource: PhantomData<fn() -> R>,
}

impl<R: PgResource> PgResourceRepository<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            sql: Statements::render(R::TABLE, R::COLUMNS),
            _resource: PhantomData,
        }
    }
}

#[async_trait]
impl<R: PgResource> ResourceRepository<R> for PgResourceRepository<R> {
    async fn list(&self) -> Result<Vec<R>, StoreError> {
        Ok(sqlx::query_as::<Postgres, R>(&self.sql.list)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn paginate(&self, page: u32, per_page: u32) -> Result<Page<R>, StoreError> {
        let total: i64 = sqlx::query_scalar(&self.sql.count)
            .fetch_one(&self.pool)
            .await?;
        let offset = i64::try_from(Page::<R>::offset(page, per_page)).unwrap_or(i64::MAX);
        let items = sqlx::query_as::<Postgres, R>(&self.sql.page)
            .bind(i64::from(per_page.max(1)))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            items,
            total: u64::try_from(total).unwrap_or_default(),
            page,
            per_page,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<R>, StoreError> {
        Ok(sqlx::query_as::<Postgres, R>(&self.sql.find)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn search_by_name(&self, needle: &str) -> Result<Vec<R>, StoreError> {
        Ok(sqlx::query_as::<Postgres, R>(&self.sql.search)
            .bind(like_pattern(needle))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create(&self, fields: R::Fields, owner_user_id: i64) -> Result<R, StoreError> {
        let query = R::bind_fields(sqlx::query_as::<Postgres, R>(&self.sql.insert), fields);
        let row = query.bind(owner_user_id).fetch_one(&self.pool).await?;
        debug!(table = R::TABLE, id = row.id(), "row inserted");
        Ok(row)
    }

    async fn update(&self, existing: R, fields: R::Fields) -> Result<Option<R>, StoreError> {
        let query = R::bind_fields(sqlx::query_as::<Postgres, R>(&self.sql.update), fields);
        let row = query
            .bind(existing.id())
            .fetch_optional(&self.pool)
            .await?;
        debug!(table = R::TABLE, id = existing.id(), found = row.is_some(), "row updated");
        Ok(row)
    }

    async fn delete(&self, existing: &R) -> Result<(), StoreError> {
        sqlx::query(&self.sql.delete)
            .bind(existing.id())
            .execute(&self.pool)
            .await?;
        debug!(table = R::TABLE, id = existing.id(), "row deleted");
        Ok(())
    }
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        Ok(sqlx::query_as(
            r#"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user.name)
        .bind(user.email)
        .bind(user.password)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (jti, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, StoreError> {
        Ok(
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1)")
                .bind(jti)
                .fetch_one(&self.pool)
                .await?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statements_follow_column_order() {
        let sql = Statements::render("orders", Order::COLUMNS);
        assert_eq!(
            sql.insert,
            "INSERT INTO orders (name, quantity, price, owner_user_id) VALUES ($1, $2, $3, $4) RETURNING *"
        );
        assert_eq!(
            sql.update,
            "UPDATE orders SET name = $1, quantity = $2, price = $3, updated_at = NOW() WHERE id = $4 RETURNING *"
        );
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Acme"), "%Acme%");
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
    }
}
