// HTTP handlers for post endpoints

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Extension, Json,
};

use crate::auth::middleware::CurrentUser;
use crate::posts::{
    access::check_ownership,
    error::PostError,
    models::{CreatePostRequest, Post, UpdatePostRequest},
    query::{PostQuery, PostQueryValidator},
};
use crate::validation::ValidatedJson;
use crate::AppState;

/// Response header carrying the number of pages
pub const LAST_PAGE_HEADER: &str = "last-page";

/// List posts, newest first
/// GET /api/posts?page=&tag=&username=
#[utoipa::path(
    get,
    path = "/api/posts",
    params(PostQuery),
    responses(
        (status = 200, description = "One page of posts with bodies cut to excerpts", body = [Post],
            headers(("Last-Page" = u64, description = "ceil(matching posts / 10)"))),
        (status = 400, description = "Invalid page number")
    ),
    tag = "posts"
)]
pub async fn list_posts_handler(
    State(state): State<AppState>,
    Query(params): Query<PostQuery>,
) -> Result<impl IntoResponse, PostError> {
    let query = PostQueryValidator::validate(params)
        .map_err(|e| PostError::InvalidQuery(e.to_string()))?;
    tracing::debug!("Listing posts: {:?}", query);

    let page = state.post_service.list(query).await?;

    Ok((
        AppendHeaders([(
            HeaderName::from_static(LAST_PAGE_HEADER),
            HeaderValue::from(page.last_page),
        )]),
        Json(page.posts),
    ))
}

/// Create a post as the logged-in user
/// POST /api/posts
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Post created", body = Post),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Not logged in")
    ),
    tag = "posts"
)]
pub async fn create_post_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    ValidatedJson(request): ValidatedJson<CreatePostRequest>,
) -> Result<Json<Post>, PostError> {
    let post = state.post_service.create(&identity, request).await?;
    Ok(Json(post))
}

/// Read one post with its full body
/// GET /api/posts/:id
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post found", body = Post),
        (status = 400, description = "Malformed post id"),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn read_post_handler(Extension(post): Extension<Post>) -> Json<Post> {
    Json(post)
}

/// Partially update a post; only its author may do so
/// PATCH /api/posts/:id
#[utoipa::path(
    patch,
    path = "/api/posts/{id}",
    params(("id" = String, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = Post),
        (status = 400, description = "Malformed id or invalid fields"),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Post belongs to another user"),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn update_post_handler(
    State(state): State<AppState>,
    Extension(post): Extension<Post>,
    CurrentUser(identity): CurrentUser,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Result<Json<Post>, PostError> {
    // a non-owner gets 403 whatever the body holds
    check_ownership(Some(&identity), &post)?;
    let Json(request) =
        payload.map_err(|rejection| PostError::InvalidBody(rejection.body_text()))?;
    let updated = state.post_service.update(&post, &identity, request).await?;
    Ok(Json(updated))
}

/// Delete a post; only its author may do so
/// DELETE /api/posts/:id
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 400, description = "Malformed post id"),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Post belongs to another user"),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn delete_post_handler(
    State(state): State<AppState>,
    Extension(post): Extension<Post>,
    CurrentUser(identity): CurrentUser,
) -> Result<StatusCode, PostError> {
    state.post_service.delete(&post, &identity).await?;
    Ok(StatusCode::NO_CONTENT)
}
