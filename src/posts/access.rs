// Post access control: id guard, post resolution and ownership

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::models::Identity;
use crate::posts::{error::PostError, models::Post};
use crate::AppState;

/// Reject ids that are not UUIDs before any store access
pub fn parse_post_id(raw: &str) -> Result<Uuid, PostError> {
    Uuid::parse_str(raw).map_err(|_| PostError::InvalidId(raw.to_string()))
}

/// Only the post's author may mutate it
pub fn check_ownership(identity: Option<&Identity>, post: &Post) -> Result<(), PostError> {
    match identity {
        Some(identity) if identity.id == post.user.id => Ok(()),
        Some(identity) => {
            tracing::warn!(
                "User {} attempted to modify post {} owned by {}",
                identity.id,
                post.id,
                post.user.id
            );
            Err(PostError::NotOwner(post.id))
        }
        None => Err(PostError::NotOwner(post.id)),
    }
}

/// Route layer for `/api/posts/:id`: validates the id, loads the post and
/// stores it in the request extensions for the handler.
pub async fn resolve_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut request: Request,
    next: Next,
) -> Result<Response, PostError> {
    let post = state.post_service.resolve(&id).await?;
    request.extensions_mut().insert(post);
    Ok(next.run(request).await)
}
