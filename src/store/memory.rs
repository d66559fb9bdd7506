//! In-process repositories.
//!
//! Selected with `APP_STORAGE=memory`, and used by the integration tests so
//! they can drive the full router without a database.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{ResourceRepository, StoreError, UserRepository};
use crate::models::{NewUser, Resource, User};
use crate::pagination::Page;

struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

pub struct MemoryRepository<R> {
    table: RwLock<Table<R>>,
}

impl<R> MemoryRepository<R> {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::default()),
        }
    }
}

impl<R> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Resource> ResourceRepository<R> for MemoryRepository<R> {
    async fn list(&self) -> Result<Vec<R>, StoreError> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table.rows.values().cloned().collect())
    }

    async fn paginate(&self, page: u32, per_page: u32) -> Result<Page<R>, StoreError> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        let offset = usize::try_from(Page::<R>::offset(page, per_page)).unwrap_or(usize::MAX);
        let items = table
            .rows
            .values()
            .skip(offset)
            .take(per_page.max(1) as usize)
            .cloned()
            .collect();
        Ok(Page {
            items,
            total: table.rows.len() as u64,
            page,
            per_page,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<R>, StoreError> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table.rows.get(&id).cloned())
    }

    async fn search_by_name(&self, needle: &str) -> Result<Vec<R>, StoreError> {
        let needle = needle.to_lowercase();
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table
            .rows
            .values()
            .filter(|row| row.name().to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn create(&self, fields: R::Fields, owner_user_id: i64) -> Result<R, StoreError> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let id = table.allocate_id();
        let row = R::build(id, owner_user_id, fields, Utc::now());
        table.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update(&self, existing: R, fields: R::Fields) -> Result<Option<R>, StoreError> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        Ok(table.rows.get_mut(&existing.id()).map(|row| {
            row.apply(fields, Utc::now());
            row.clone()
        }))
    }

    async fn delete(&self, existing: &R) -> Result<(), StoreError> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        table.rows.remove(&existing.id());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<Table<User>>,
    revoked: RwLock<HashMap<Uuid, DateTime<Utc>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        let id = users.allocate_id();
        let now = Utc::now();
        let user = User {
            id,
            name: user.name,
            email: user.email,
            password: user.password,
            created_at: now,
            updated_at: now,
        };
        users.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users.rows.values().find(|u| u.email == email).cloned())
    }

    async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut revoked = self.revoked.write().unwrap_or_else(PoisonError::into_inner);
        let now = Utc::now();
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(jti, expires_at);
        Ok(())
    }

    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, StoreError> {
        let revoked = self.revoked.read().unwrap_or_else(PoisonError::into_inner);
        Ok(revoked.contains_key(&jti))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, CustomerFields};

    fn fields(name: &str) -> CustomerFields {
        CustomerFields {
            name: name.to_string(),
            address: "1 Main St".to_string(),
            phone: "555-1234".to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_ids_and_owner() {
        let repo = MemoryRepository::<Customer>::new();
        let first = repo.create(fields("Acme"), 7).await.unwrap();
        let second = repo.create(fields("Globex"), 7).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.owner_user_id, 7);
        assert_eq!(repo.find_by_id(1).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let repo = MemoryRepository::<Customer>::new();
        for name in ["Acme Corp", "Globex", "ACME West"] {
            repo.create(fields(name), 1).await.unwrap();
        }
        let hits = repo.search_by_name("acme").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(repo.search_by_name("initech").await.unwrap().is_empty());
        assert_eq!(repo.search_by_name("").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn paginate_slices_and_survives_out_of_range() {
        let repo = MemoryRepository::<Customer>::new();
        for i in 0..5 {
            repo.create(fields(&format!("c{i}")), 1).await.unwrap();
        }
        let page = repo.paginate(2, 2).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(
            page.items.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![3, 4]
        );

        let beyond = repo.paginate(10, 2).await.unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 5);
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let repo = MemoryRepository::<Customer>::new();
        let row = repo.create(fields("Acme"), 1).await.unwrap();
        repo.delete(&row).await.unwrap();
        assert!(repo.find_by_id(row.id).await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_changes_stored_row() {
        let repo = MemoryRepository::<Customer>::new();
        let row = repo.create(fields("Acme"), 1).await.unwrap();
        let updated = repo.update(row, fields("Acme Ltd")).await.unwrap().unwrap();
        assert_eq!(updated.name, "Acme Ltd");
        assert_eq!(repo.find_by_id(updated.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn update_after_delete_does_not_recreate_row() {
        let repo = MemoryRepository::<Customer>::new();
        let row = repo.create(fields("Acme"), 1).await.unwrap();
        let loaded = repo.find_by_id(row.id).await.unwrap().unwrap();
        repo.delete(&row).await.unwrap();

        assert!(repo.update(loaded, fields("Acme Ltd")).await.unwrap().is_none());
        assert!(repo.find_by_id(row.id).await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn revoked_tokens_are_remembered() {
        let users = MemoryUserRepository::new();
        let jti = Uuid::new_v4();
        assert!(!users.is_token_revoked(jti).await.unwrap());
        users
            .revoke_token(jti, Utc::now() + chrono::Duration::minutes(5))
            .await
            .unwrap();
        assert!(users.is_token_revoked(jti).await.unwrap());
    }
}
