//! HTTP route modules.
//!
//! - `accounts`: register, login, logout and current user
//! - `customers`: customer CRUD, pagination and search
//! - `orders`: order CRUD, pagination and search
//! - `resources`: the generic handlers behind `customers` and `orders`
//!
//! Everything except `/login` and `/register` sits behind [`require_auth`].

pub mod accounts;
pub mod customers;
pub mod orders;
pub mod resources;

use axum::{middleware, Router};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::{require_auth, AuthState};
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{validate, FieldRules};

/// Build the API router (mounted under `/api` by [`crate::create_app`]).
pub fn api_router(state: &AppState) -> Router {
    let auth = AuthState {
        tokens: state.tokens.clone(),
        users: state.users.clone(),
    };

    let protected = Router::new()
        .merge(accounts::protected_router(state))
        .merge(customers::router(state))
        .merge(orders::router(state))
        .route_layer(middleware::from_fn_with_state(auth, require_auth));

    Router::new()
        .merge(accounts::public_router(state))
        .merge(protected)
}

/// Parse a request body as JSON; anything unparseable reads as `null`, which
/// validation then reports field by field.
pub(crate) fn json_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

/// Validate `input` and deserialize the accepted fields into `T`.
pub(crate) fn validated_into<T: DeserializeOwned>(
    input: &Value,
    rules: &[FieldRules],
) -> Result<T, ApiError> {
    let validated = validate(input, rules)?;
    serde_json::from_value(Value::Object(validated))
        .map_err(|e| ApiError::Internal(format!("validated fields did not deserialize: {e}")))
}
