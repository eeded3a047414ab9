// HTTP handlers for authentication endpoints

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};

use crate::auth::{
    cookie::{clear_session_cookie, session_cookie},
    error::AuthError,
    middleware::CurrentUser,
    models::{AuthSession, Identity, LoginRequest, RegisterRequest, UserResponse},
};
use crate::validation::ValidatedJson;
use crate::AppState;

/// Serialized user plus the Set-Cookie header carrying the token
fn session_response(
    state: &AppState,
    session: AuthSession,
) -> Result<impl IntoResponse, AuthError> {
    let cookie = session_cookie(&session.token, &state.session)?;
    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(session.user)))
}

/// Register a new user
/// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered, session cookie set", body = UserResponse),
        (status = 400, description = "Invalid username or password"),
        (status = 409, description = "Username already exists")
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    tracing::debug!("Registering user: {}", request.username);
    let session = state.auth_service.register(request).await?;
    session_response(&state, session)
}

/// Log a user in
/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = UserResponse),
        (status = 401, description = "Missing or wrong credentials")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    // an unreadable body is treated like missing credentials
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    let session = state.auth_service.login(request).await?;
    session_response(&state, session)
}

/// Report the identity attached by the session middleware
/// GET /api/auth/check
#[utoipa::path(
    get,
    path = "/api/auth/check",
    responses(
        (status = 200, description = "Current identity", body = Identity),
        (status = 401, description = "Not logged in")
    ),
    tag = "auth"
)]
pub async fn check_handler(CurrentUser(identity): CurrentUser) -> Json<Identity> {
    Json(identity)
}

/// Clear the session cookie; always succeeds
/// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Session cookie cleared")
    ),
    tag = "auth"
)]
pub async fn logout_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        AppendHeaders([(header::SET_COOKIE, clear_session_cookie(&state.session))]),
    )
}
