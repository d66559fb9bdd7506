//! The error type returned by every handler and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::AuthError;
use crate::models::ApiResponse;
use crate::store::StoreError;
use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Rejected input. Answered with 200 and `{ "error": {..} }`, which is
    /// what existing clients check for.
    #[error("validation failed")]
    Validation(ValidationErrors),

    /// Show or search found nothing.
    #[error("Sorry, {0} not found.")]
    NotFound(&'static str),

    /// Update or destroy addressed a row that does not exist.
    #[error("Sorry, {0} not found.")]
    RecordMissing(&'static str),

    #[error("Login credentials are invalid.")]
    InvalidCredentials,

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::Missing | AuthError::Invalid | AuthError::Expired) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::OK,
            Self::NotFound(_) | Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::RecordMissing(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation(errors) => (status, Json(json!({ "error": errors }))).into_response(),
            err if status.is_server_error() => {
                error!("request failed: {}", err);
                (status, Json(ApiResponse::failure("Server Error"))).into_response()
            }
            err => {
                if status == StatusCode::UNAUTHORIZED {
                    warn!("authentication rejected: {}", err);
                }
                (status, Json(ApiResponse::failure(err.to_string()))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_public_contract() {
        assert_eq!(
            ApiError::Validation(ValidationErrors::new()).status(),
            StatusCode::OK
        );
        assert_eq!(ApiError::NotFound("customer").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::RecordMissing("order").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(AuthError::Expired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::Hash("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_the_resource() {
        assert_eq!(
            ApiError::NotFound("customer").to_string(),
            "Sorry, customer not found."
        );
    }
}
