// Validation utilities module
// Custom field validators and a JSON extractor that validates before the handler runs

use axum::{
    async_trait,
    extract::{FromRequest, Json, Request},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::error::ApiError;

/// Usernames are ASCII letters and digits only
pub fn validate_username_chars(username: &str) -> Result<(), ValidationError> {
    if !username.is_empty() && username.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::new("username_not_alphanumeric"))
    }
}

/// Every tag must be a non-empty string
pub fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.iter().any(|tag| tag.trim().is_empty()) {
        Err(ValidationError::new("empty_tag"))
    } else {
        Ok(())
    }
}

/// JSON body extractor that runs `Validate` before the handler sees the value.
/// Undecodable bodies and field errors both become 400 responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
