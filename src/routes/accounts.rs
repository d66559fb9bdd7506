//! Account routes.
//!
//! POST /register - Create a user
//! POST /login    - Exchange email and password for a bearer token
//! GET  /logout   - Revoke the presented token (protected)
//! GET  /get_user - The authenticated user (protected)

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use tracing::info;

use super::{json_body, validated_into};
use crate::auth::{hash_password, verify_password, AuthUser, TokenService};
use crate::error::ApiError;
use crate::models::{
    ApiResponse, LoginRequest, NewUser, RegisterRequest, TokenResponse, User, UserResponse,
};
use crate::state::AppState;
use crate::store::UserRepository;
use crate::validation::{ValidationErrors, LOGIN_RULES, REGISTER_RULES};

#[derive(Clone)]
pub struct AccountState {
    users: Arc<dyn UserRepository>,
    tokens: TokenService,
}

impl AccountState {
    fn from_app(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
            tokens: state.tokens.clone(),
        }
    }
}

/// Routes reachable without a token.
pub fn public_router(state: &AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(AccountState::from_app(state))
}

/// Routes that require a token; the caller adds the auth layer.
pub fn protected_router(state: &AppState) -> Router {
    Router::new()
        .route("/logout", get(logout))
        .route("/get_user", get(get_user))
        .with_state(AccountState::from_app(state))
}

async fn register(
    State(state): State<AccountState>,
    body: Bytes,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let req: RegisterRequest = validated_into(&json_body(&body), REGISTER_RULES)?;
    let email = normalize_email(&req.email);

    if state.users.find_by_email(&email).await?.is_some() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "The email has already been taken.");
        return Err(errors.into());
    }

    let user = state
        .users
        .create(NewUser {
            name: req.name,
            email,
            password: hash_password(&req.password)?,
        })
        .await?;

    info!(user_id = user.id, "user registered");

    Ok(Json(ApiResponse::with_message(
        "User created successfully",
        user,
    )))
}

async fn login(
    State(state): State<AccountState>,
    body: Bytes,
) -> Result<Json<TokenResponse>, ApiError> {
    let req: LoginRequest = validated_into(&json_body(&body), LOGIN_RULES)?;

    let user = state
        .users
        .find_by_email(&normalize_email(&req.email))
        .await?
        .filter(|user| verify_password(&req.password, &user.password))
        .ok_or(ApiError::InvalidCredentials)?;

    let token = state.tokens.issue(user.id)?;
    info!(user_id = user.id, "token issued");

    Ok(Json(TokenResponse {
        success: true,
        token,
    }))
}

async fn logout(
    State(state): State<AccountState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .users
        .revoke_token(auth.claims.jti, auth.claims.expires_at())
        .await?;

    info!(user_id = auth.user.id, "token revoked");

    Ok(Json(ApiResponse::message("User has been logged out")))
}

async fn get_user(Extension(auth): Extension<AuthUser>) -> Json<UserResponse> {
    Json(UserResponse { user: auth.user })
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
