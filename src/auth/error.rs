// Authentication error types

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::db::StoreError;
use crate::error::ApiError;

/// Authentication failures
///
/// Credential and token failures all render as the same generic 401 so a
/// client cannot tell an unknown username from a wrong password, or an
/// expired token from a forged one.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token generation error: {0}")]
    TokenGeneration(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::ValidationError(errors) => ApiError::ValidationError(errors),
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::NotLoggedIn => {
                ApiError::Unauthorized("Authentication required".to_string())
            }
            AuthError::UsernameTaken => ApiError::Conflict {
                message: "Username already exists".to_string(),
            },
            AuthError::PasswordHash(msg) => {
                ApiError::InternalError(format!("password hashing: {}", msg))
            }
            AuthError::TokenGeneration(msg) => {
                ApiError::InternalError(format!("token generation: {}", msg))
            }
            AuthError::Store(e) => ApiError::from(e),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
