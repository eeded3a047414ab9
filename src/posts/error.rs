use axum::response::{IntoResponse, Response};
use thiserror::Error;
use uuid::Uuid;

use crate::db::StoreError;
use crate::error::ApiError;

/// Error types for post operations
#[derive(Debug, Error)]
pub enum PostError {
    /// The id is not in the store's id format
    #[error("Invalid post id: {0}")]
    InvalidId(String),

    #[error("Post {0} not found")]
    NotFound(Uuid),

    #[error("Post {0} is owned by another user")]
    NotOwner(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The request body is not a decodable post document
    #[error("Invalid body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PostError> for ApiError {
    fn from(error: PostError) -> Self {
        match error {
            PostError::InvalidId(id) => ApiError::BadRequest(format!("Invalid post id '{}'", id)),
            PostError::NotFound(id) => ApiError::NotFound {
                resource: "Post".to_string(),
                id: id.to_string(),
            },
            PostError::NotOwner(id) => {
                ApiError::Forbidden(format!("Post {} belongs to another user", id))
            }
            PostError::ValidationError(errors) => ApiError::ValidationError(errors),
            PostError::InvalidQuery(msg) | PostError::InvalidBody(msg) => {
                ApiError::BadRequest(msg)
            }
            PostError::Store(e) => ApiError::from(e),
        }
    }
}

impl IntoResponse for PostError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
