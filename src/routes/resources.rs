//! The seven operations every resource exposes, written once over
//! [`Resource`].
//!
//! For a resource with slug `customer`:
//!
//! GET    /customer                - Index
//! GET    /customerWithPaginate    - Pagination (`?page=N`)
//! GET    /customerGetDetail/{id}  - Show
//! POST   /customer/insert         - Store
//! PUT    /customer/update/{id}    - Update
//! DELETE /customer/delete/{id}    - Destroy
//! POST   /customerSearchbyName    - SearchByName (`{ "name": "..." }`)

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post, put};
use axum::{Extension, Json, Router};
use serde_json::Value;
use tracing::info;

use super::{json_body, validated_into};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{ApiResponse, PageQuery, Resource};
use crate::pagination::Paginated;
use crate::store::ResourceRepository;

pub struct ResourceState<R> {
    pub repo: Arc<dyn ResourceRepository<R>>,
    /// Public base URL, without trailing slash.
    pub app_url: Arc<str>,
    pub page_size: u32,
}

impl<R> Clone for ResourceState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            app_url: Arc::clone(&self.app_url),
            page_size: self.page_size,
        }
    }
}

/// Build the router of one resource type.
pub fn router<R: Resource>(state: ResourceState<R>) -> Router {
    let slug = R::SLUG;
    Router::new()
        .route(&format!("/{slug}"), get(index::<R>))
        .route(&format!("/{slug}WithPaginate"), get(pagination::<R>))
        .route(&format!("/{slug}GetDetail/{{id}}"), get(show::<R>))
        .route(&format!("/{slug}/insert"), post(store::<R>))
        .route(&format!("/{slug}/update/{{id}}"), put(update::<R>))
        .route(&format!("/{slug}/delete/{{id}}"), delete(destroy::<R>))
        .route(&format!("/{slug}SearchbyName"), post(search_by_name::<R>))
        .with_state(state)
}

async fn index<R: Resource>(
    State(state): State<ResourceState<R>>,
) -> Result<Json<ApiResponse<Vec<R>>>, ApiError> {
    let rows = state.repo.list().await?;
    Ok(Json(ApiResponse::data(rows)))
}

async fn pagination<R: Resource>(
    State(state): State<ResourceState<R>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Paginated<R>>>, ApiError> {
    let page = state.repo.paginate(query.page(), state.page_size).await?;
    let path = format!("{}/api/{}WithPaginate", state.app_url, R::SLUG);
    Ok(Json(ApiResponse::data(Paginated::new(page, path))))
}

async fn store<R: Resource>(
    State(state): State<ResourceState<R>>,
    Extension(auth): Extension<AuthUser>,
    body: Bytes,
) -> Result<Json<ApiResponse<R>>, ApiError> {
    let fields: R::Fields = validated_into(&json_body(&body), R::RULES)?;
    let row = state.repo.create(fields, auth.user.id).await?;

    info!(resource = R::SLUG, id = row.id(), owner = auth.user.id, "created");

    Ok(Json(ApiResponse::with_message(
        format!("{} created successfully", R::LABEL),
        row,
    )))
}

/// Answers with the bare row, not the usual envelope.
async fn show<R: Resource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
) -> Result<Json<R>, ApiError> {
    let row = match parse_id(&id) {
        Some(id) => state.repo.find_by_id(id).await?,
        None => None,
    };
    row.map(Json).ok_or(ApiError::NotFound(R::SLUG))
}

async fn search_by_name<R: Resource>(
    State(state): State<ResourceState<R>>,
    body: Bytes,
) -> Result<Json<ApiResponse<Vec<R>>>, ApiError> {
    let needle = search_term(&json_body(&body));
    let rows = state.repo.search_by_name(&needle).await?;
    if rows.is_empty() {
        return Err(ApiError::NotFound(R::SLUG));
    }
    Ok(Json(ApiResponse::data(rows)))
}

async fn update<R: Resource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ApiResponse<R>>, ApiError> {
    let existing = load_or_fail(&state, &id).await?;
    let fields: R::Fields = validated_into(&json_body(&body), R::RULES)?;
    let row = state
        .repo
        .update(existing, fields)
        .await?
        .ok_or(ApiError::RecordMissing(R::SLUG))?;

    info!(resource = R::SLUG, id = row.id(), "updated");

    Ok(Json(ApiResponse::with_message(
        format!("{} updated successfully", R::LABEL),
        row,
    )))
}

async fn destroy<R: Resource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let existing = load_or_fail(&state, &id).await?;
    state.repo.delete(&existing).await?;

    info!(resource = R::SLUG, id = existing.id(), "deleted");

    Ok(Json(ApiResponse::message(format!(
        "{} deleted successfully",
        R::LABEL
    ))))
}

async fn load_or_fail<R: Resource>(state: &ResourceState<R>, id: &str) -> Result<R, ApiError> {
    let id = parse_id(id).ok_or(ApiError::RecordMissing(R::SLUG))?;
    state
        .repo
        .find_by_id(id)
        .await?
        .ok_or(ApiError::RecordMissing(R::SLUG))
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// The `name` of a search body. Anything missing or non-scalar searches for
/// the empty string, which matches every row.
fn search_term(input: &Value) -> String {
    match input.get("name") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, CustomerFields};
    use crate::pagination::Page;
    use crate::store::{MemoryRepository, StoreError};
    use async_trait::async_trait;
    use serde_json::json;

    /// Deletes each row right after handing it out, like a destroy that
    /// lands between the lookup and the write.
    struct Vanishing(MemoryRepository<Customer>);

    #[async_trait]
    impl ResourceRepository<Customer> for Vanishing {
        async fn list(&self) -> Result<Vec<Customer>, StoreError> {
            self.0.list().await
        }

        async fn paginate(&self, page: u32, per_page: u32) -> Result<Page<Customer>, StoreError> {
            self.0.paginate(page, per_page).await
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Customer>, StoreError> {
            let row = self.0.find_by_id(id).await?;
            if let Some(row) = &row {
                self.0.delete(row).await?;
            }
            Ok(row)
        }

        async fn search_by_name(&self, needle: &str) -> Result<Vec<Customer>, StoreError> {
            self.0.search_by_name(needle).await
        }

        async fn create(
            &self,
            fields: CustomerFields,
            owner_user_id: i64,
        ) -> Result<Customer, StoreError> {
            self.0.create(fields, owner_user_id).await
        }

        async fn update(
            &self,
            existing: Customer,
            fields: CustomerFields,
        ) -> Result<Option<Customer>, StoreError> {
            self.0.update(existing, fields).await
        }

        async fn delete(&self, existing: &Customer) -> Result<(), StoreError> {
            self.0.delete(existing).await
        }
    }

    #[tokio::test]
    async fn update_of_row_deleted_mid_request_is_record_missing() {
        let repo = Arc::new(Vanishing(MemoryRepository::new()));
        let fields = CustomerFields {
            name: "Acme".to_string(),
            address: "1 Main St".to_string(),
            phone: "555-1234".to_string(),
        };
        let row = repo.create(fields, 1).await.unwrap();
        let state = ResourceState::<Customer> {
            repo: repo.clone(),
            app_url: Arc::from("http://localhost"),
            page_size: 15,
        };
        let body = Bytes::from(
            json!({ "name": "Acme Ltd", "address": "2 High St", "phone": "555-9999" }).to_string(),
        );

        let result = update::<Customer>(State(state), Path(row.id.to_string()), body).await;
        assert!(matches!(result, Err(ApiError::RecordMissing("customer"))));
        assert!(repo.0.list().await.unwrap().is_empty());
    }

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("12"), Some(12));
        assert_eq!(parse_id(" 7 "), Some(7));
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("1.5"), None);
    }

    #[test]
    fn search_term_reads_name() {
        assert_eq!(search_term(&json!({ "name": "Ac" })), "Ac");
        assert_eq!(search_term(&json!({ "name": 42 })), "42");
        assert_eq!(search_term(&json!({})), "");
        assert_eq!(search_term(&Value::Null), "");
    }
}
