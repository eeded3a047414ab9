// HTTP tests for the Blog API
// Drive the full router (session middleware, post resolution, handlers)
// against the in-memory stores.

use super::*;
use auth::models::Identity;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
};
use axum_test::TestServer;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

// ============================================================================
// Test Helpers
// ============================================================================

const SECRET: &str = "test_secret_key_for_testing_purposes";

fn test_state() -> AppState {
    AppState::in_memory(SECRET, SessionConfig::default())
}

fn test_server(state: AppState) -> TestServer {
    TestServer::new(create_router(state)).unwrap()
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl TestResponse {
    fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    /// Token carried by the first session Set-Cookie header
    fn session_token(&self) -> Option<String> {
        self.set_cookies().iter().find_map(|cookie| {
            cookie
                .split(';')
                .next()
                .and_then(|pair| pair.strip_prefix("access_token="))
                .map(String::from)
        })
    }
}

/// One request through the router, optionally carrying a session cookie
async fn send(
    state: &AppState,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("access_token={}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = create_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Session token for a made-up user; posts only need a valid identity
fn token_for(state: &AppState, username: &str) -> (Identity, String) {
    let identity = Identity {
        id: Uuid::new_v4(),
        username: username.to_string(),
    };
    let token = state.tokens.issue(&identity).unwrap();
    (identity, token)
}

async fn create_post(state: &AppState, token: &str, title: &str, body: &str, tags: &[&str]) -> Value {
    let response = send(
        state,
        Method::POST,
        "/api/posts",
        Some(token),
        Some(json!({ "title": title, "body": body, "tags": tags })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK, "create failed: {}", response.body);
    response.body
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_register_sets_cookie_and_hides_password() {
    let state = test_state();

    let response = send(
        &state,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "juhee", "password": "mypass1234" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], "juhee");
    assert!(response.body.get("hashed_password").is_none());
    assert!(response.body.get("hashedPassword").is_none());

    let cookie = &response.set_cookies()[0];
    assert!(cookie.starts_with("access_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=604800"));

    let claims = state.tokens.verify(&response.session_token().unwrap()).unwrap();
    assert_eq!(claims.username, "juhee");
}

#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let server = test_server(test_state());
    let payload = json!({ "username": "juhee", "password": "mypass1234" });

    server.post("/api/auth/register").json(&payload).await.assert_status_ok();
    let response = server.post("/api/auth/register").json(&payload).await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error_code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let server = test_server(test_state());

    let payloads = vec![
        json!({ "username": "ab", "password": "pw" }),
        json!({ "username": "a".repeat(21), "password": "pw" }),
        json!({ "username": "bad name!", "password": "pw" }),
        json!({ "username": "juhee", "password": "" }),
        json!({ "username": "juhee" }),
        json!({}),
    ];

    for payload in payloads {
        let response = server.post("/api/auth/register").json(&payload).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error_code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_register_then_login() {
    let state = test_state();
    let server = test_server(state.clone());
    let credentials = json!({ "username": "juhee", "password": "mypass1234" });

    server.post("/api/auth/register").json(&credentials).await.assert_status_ok();

    let response = send(&state, Method::POST, "/api/auth/login", None, Some(credentials)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], "juhee");
    assert!(response.session_token().is_some());
}

#[tokio::test]
async fn test_login_failures_share_status() {
    let server = test_server(test_state());
    server
        .post("/api/auth/register")
        .json(&json!({ "username": "juhee", "password": "mypass1234" }))
        .await
        .assert_status_ok();

    let wrong_password = server
        .post("/api/auth/login")
        .json(&json!({ "username": "juhee", "password": "nope" }))
        .await;
    let unknown_user = server
        .post("/api/auth/login")
        .json(&json!({ "username": "nobody", "password": "mypass1234" }))
        .await;
    let missing_fields = server.post("/api/auth/login").json(&json!({})).await;

    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    unknown_user.assert_status(StatusCode::UNAUTHORIZED);
    missing_fields.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.json::<Value>()["message"],
        unknown_user.json::<Value>()["message"]
    );
}

#[tokio::test]
async fn test_check_requires_session() {
    let state = test_state();
    let (identity, token) = token_for(&state, "juhee");

    let anonymous = send(&state, Method::GET, "/api/auth/check", None, None).await;
    let forged = send(&state, Method::GET, "/api/auth/check", Some("garbage"), None).await;
    let logged_in = send(&state, Method::GET, "/api/auth/check", Some(&token), None).await;

    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
    assert_eq!(logged_in.status, StatusCode::OK);
    assert_eq!(logged_in.body["username"], "juhee");
    assert_eq!(logged_in.body["id"], identity.id.to_string());
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let state = test_state();
    let (_, token) = token_for(&state, "juhee");

    for token in [None, Some(token.as_str())] {
        let response = send(&state, Method::POST, "/api/auth/logout", token, None).await;

        assert_eq!(response.status, StatusCode::NO_CONTENT);
        let cookies = response.set_cookies();
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("access_token=;"));
        assert!(cookies[0].contains("Max-Age=0"));
    }
}

#[tokio::test]
async fn test_logout_wins_over_sliding_refresh() {
    let state = test_state();
    let identity = Identity {
        id: Uuid::new_v4(),
        username: "juhee".to_string(),
    };
    // six days old: inside the refresh window
    let old = state
        .tokens
        .issue_at(&identity, chrono::Utc::now().timestamp() - 6 * 86_400)
        .unwrap();

    let response = send(&state, Method::POST, "/api/auth/logout", Some(&old), None).await;

    let cookies = response.set_cookies();
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].contains("Max-Age=0"));
}

// ============================================================================
// Post Tests
// ============================================================================

#[tokio::test]
async fn test_create_post_sanitizes_body() {
    let state = test_state();
    let server = test_server(state.clone());
    let register = send(
        &state,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "juhee", "password": "mypass1234" })),
    )
    .await;
    let token = register.session_token().unwrap();

    let post = create_post(&state, &token, "t", "<script>x</script>hello", &["a"]).await;

    assert_eq!(post["body"], "hello");
    assert_eq!(post["tags"], json!(["a"]));
    assert_eq!(post["user"]["username"], "juhee");

    let stored = server.get(&format!("/api/posts/{}", post["id"].as_str().unwrap())).await;
    stored.assert_status_ok();
    assert_eq!(stored.json::<Value>()["body"], "hello");
}

#[tokio::test]
async fn test_create_post_requires_login() {
    let server = test_server(test_state());

    let response = server
        .post("/api/posts")
        .json(&json!({ "title": "t", "body": "b", "tags": [] }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_post_validates_fields() {
    let state = test_state();
    let (_, token) = token_for(&state, "juhee");

    let payloads = vec![
        json!({ "title": "", "body": "b", "tags": [] }),
        json!({ "title": "t", "body": "", "tags": [] }),
        json!({ "title": "t", "body": "b" }),
        json!({ "title": "t", "body": "b", "tags": "a" }),
        json!({ "title": "t", "body": "b", "tags": [""] }),
    ];

    for payload in payloads {
        let response = send(&state, Method::POST, "/api/posts", Some(&token), Some(payload)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_list_paginates_newest_first() {
    let state = test_state();
    let server = test_server(state.clone());
    let (_, token) = token_for(&state, "juhee");
    for i in 0..12 {
        create_post(&state, &token, &format!("post {}", i), "b", &[]).await;
    }

    let first = server.get("/api/posts").await;
    first.assert_status_ok();
    assert_eq!(first.header("last-page"), "2");
    let posts = first.json::<Vec<Value>>();
    assert_eq!(posts.len(), 10);
    assert_eq!(posts[0]["title"], "post 11");
    assert_eq!(posts[9]["title"], "post 2");

    let second = server.get("/api/posts").add_query_param("page", 2).await;
    let posts = second.json::<Vec<Value>>();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[1]["title"], "post 0");
}

#[tokio::test]
async fn test_list_rejects_bad_page() {
    let server = test_server(test_state());

    for page in ["0", "-1", "abc"] {
        let response = server.get("/api/posts").add_query_param("page", page).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_list_empty_store() {
    let server = test_server(test_state());

    let response = server.get("/api/posts").await;

    response.assert_status_ok();
    assert_eq!(response.header("last-page"), "0");
    assert_eq!(response.json::<Vec<Value>>().len(), 0);
}

#[tokio::test]
async fn test_list_filters_by_tag_and_username() {
    let state = test_state();
    let server = test_server(state.clone());
    let (_, juhee) = token_for(&state, "juhee");
    let (_, minsu) = token_for(&state, "minsu");
    create_post(&state, &juhee, "a", "b", &["rust"]).await;
    create_post(&state, &minsu, "b", "b", &["rust", "web"]).await;
    create_post(&state, &minsu, "c", "b", &["web"]).await;

    let by_tag = server.get("/api/posts").add_query_param("tag", "rust").await;
    let titles: Vec<_> = by_tag
        .json::<Vec<Value>>()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["b", "a"]);

    let by_user = server
        .get("/api/posts")
        .add_query_param("username", "minsu")
        .add_query_param("tag", "web")
        .await;
    assert_eq!(by_user.json::<Vec<Value>>().len(), 2);
    assert_eq!(by_user.header("last-page"), "1");
}

#[tokio::test]
async fn test_list_truncates_long_bodies() {
    let state = test_state();
    let server = test_server(state.clone());
    let (_, token) = token_for(&state, "juhee");
    let long = format!("<p>{}</p>", "a".repeat(300));
    let post = create_post(&state, &token, "t", &long, &[]).await;

    let listing = server.get("/api/posts").await.json::<Vec<Value>>();
    assert_eq!(listing[0]["body"], format!("{}...", "a".repeat(200)));

    let full = server
        .get(&format!("/api/posts/{}", post["id"].as_str().unwrap()))
        .await
        .json::<Value>();
    assert_eq!(full["body"], long);
}

#[tokio::test]
async fn test_read_post_id_checks() {
    let server = test_server(test_state());

    let malformed = server.get("/api/posts/not-an-id").await;
    malformed.assert_status(StatusCode::BAD_REQUEST);

    let missing = server.get(&format!("/api/posts/{}", Uuid::new_v4())).await;
    missing.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(missing.json::<Value>()["error_code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_only_author_can_update_or_delete() {
    let state = test_state();
    let (_, author) = token_for(&state, "juhee");
    let (_, other) = token_for(&state, "minsu");
    let post = create_post(&state, &author, "t", "b", &["a"]).await;
    let uri = format!("/api/posts/{}", post["id"].as_str().unwrap());

    let stolen = send(&state, Method::PATCH, &uri, Some(&other), Some(json!({ "title": "x" }))).await;
    assert_eq!(stolen.status, StatusCode::FORBIDDEN);

    let removed = send(&state, Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(removed.status, StatusCode::FORBIDDEN);

    let updated = send(
        &state,
        Method::PATCH,
        &uri,
        Some(&author),
        Some(json!({ "title": "new", "body": "<p>x</p><script>y</script>" })),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["title"], "new");
    assert_eq!(updated.body["body"], "<p>x</p>");
    assert_eq!(updated.body["tags"], json!(["a"]));
    assert_eq!(updated.body["user"], post["user"]);

    let deleted = send(&state, Method::DELETE, &uri, Some(&author), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = send(&state, Method::GET, &uri, None, None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mutations_require_login() {
    let state = test_state();
    let (_, token) = token_for(&state, "juhee");
    let post = create_post(&state, &token, "t", "b", &[]).await;
    let uri = format!("/api/posts/{}", post["id"].as_str().unwrap());

    let patch = send(&state, Method::PATCH, &uri, None, Some(json!({ "title": "x" }))).await;
    let delete = send(&state, Method::DELETE, &uri, None, None).await;

    assert_eq!(patch.status, StatusCode::UNAUTHORIZED);
    assert_eq!(delete.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mutations_check_id_before_login() {
    let state = test_state();

    let malformed = send(&state, Method::DELETE, "/api/posts/123", None, None).await;
    let missing = send(
        &state,
        Method::PATCH,
        &format!("/api/posts/{}", Uuid::new_v4()),
        None,
        Some(json!({ "title": "x" })),
    )
    .await;

    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_rejects_invalid_fields() {
    let state = test_state();
    let (_, token) = token_for(&state, "juhee");
    let post = create_post(&state, &token, "t", "b", &[]).await;
    let uri = format!("/api/posts/{}", post["id"].as_str().unwrap());

    let response = send(&state, Method::PATCH, &uri, Some(&token), Some(json!({ "title": "" }))).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let stored = send(&state, Method::GET, &uri, None, None).await;
    assert_eq!(stored.body["title"], "t");
}

#[tokio::test]
async fn test_update_checks_ownership_before_fields() {
    let state = test_state();
    let (_, owner) = token_for(&state, "juhee");
    let (_, other) = token_for(&state, "minsu");
    let post = create_post(&state, &owner, "t", "b", &[]).await;
    let uri = format!("/api/posts/{}", post["id"].as_str().unwrap());

    for body in [
        json!({ "title": "" }),
        json!({ "tags": "notarray" }),
        json!({ "title": 5 }),
    ] {
        let response = send(&state, Method::PATCH, &uri, Some(&other), Some(body.clone())).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "body {}", body);
    }

    let response = send(&state, Method::PATCH, &uri, Some(&owner), Some(json!({ "title": 5 }))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Documentation
// ============================================================================

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let server = test_server(test_state());

    let response = server.get("/api-docs/openapi.json").await;

    response.assert_status_ok();
    let doc = response.json::<Value>();
    assert!(doc["paths"]["/api/auth/register"].is_object());
    assert!(doc["paths"]["/api/posts"].is_object());
    assert!(doc["paths"]["/api/posts/{id}"].is_object());
}
