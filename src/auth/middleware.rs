// Session middleware and the authenticated-user extractor

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{debug, warn};

use crate::auth::{
    cookie::{read_cookie, session_cookie, sets_session_cookie, SESSION_COOKIE},
    error::AuthError,
    models::Identity,
};
use crate::AppState;

/// Recover the caller's identity from the session cookie.
///
/// Runs before every route. A missing or invalid cookie leaves the request
/// anonymous; it never fails the request. With sliding sessions enabled, a
/// valid token close to expiry is re-issued, unless the handler set the
/// session cookie itself (login, logout).
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut refreshed = None;

    if let Some(token) = read_cookie(request.headers(), SESSION_COOKIE) {
        match state.tokens.verify(&token) {
            Ok(claims) => {
                let identity = claims.identity();
                if state.session.should_refresh(claims.exp, Utc::now().timestamp()) {
                    match state.tokens.issue(&identity) {
                        Ok(fresh) => refreshed = Some(fresh),
                        Err(e) => warn!("Failed to refresh session token: {}", e),
                    }
                }
                request.extensions_mut().insert(identity);
            }
            Err(_) => {
                debug!("Ignoring invalid session cookie on {}", request.uri().path());
                request.extensions_mut().remove::<Identity>();
            }
        }
    }

    let mut response = next.run(request).await;

    if let Some(token) = refreshed {
        if !sets_session_cookie(response.headers()) {
            match session_cookie(&token, &state.session) {
                Ok(cookie) => {
                    response.headers_mut().append(header::SET_COOKIE, cookie);
                }
                Err(e) => warn!("Failed to build refreshed session cookie: {}", e),
            }
        }
    }

    response
}

/// Authenticated user extractor for routes that require a session
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AuthError::NotLoggedIn)
    }
}
