mod auth;
mod config;
mod db;
mod error;
mod posts;
mod validation;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::{
    check_handler, login_handler, logout_handler, register_handler, session_middleware,
    AuthService, MemoryUserRepository, PgUserRepository, TokenService, UserRepository,
};
use config::{AppConfig, SessionConfig};
use posts::{
    create_post_handler, delete_post_handler, list_posts_handler, read_post_handler,
    resolve_post, update_post_handler, MemoryPostRepository, PgPostRepository, PostRepository,
    PostService,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::register_handler,
        auth::handlers::login_handler,
        auth::handlers::check_handler,
        auth::handlers::logout_handler,
        posts::handlers::list_posts_handler,
        posts::handlers::create_post_handler,
        posts::handlers::read_post_handler,
        posts::handlers::update_post_handler,
        posts::handlers::delete_post_handler,
    ),
    components(
        schemas(
            auth::models::RegisterRequest,
            auth::models::LoginRequest,
            auth::models::UserResponse,
            auth::models::Identity,
            posts::models::Post,
            posts::models::PostAuthor,
            posts::models::CreatePostRequest,
            posts::models::UpdatePostRequest,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and session endpoints"),
        (name = "posts", description = "Blog post endpoints")
    ),
    info(
        title = "Blog API",
        version = "0.1.0",
        description = "Minimal blogging backend: cookie sessions and post CRUD"
    )
)]
struct ApiDoc;

/// Application state shared across handlers and middleware
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub post_service: Arc<PostService>,
    pub tokens: Arc<TokenService>,
    pub session: SessionConfig,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        jwt_secret: &str,
        session: SessionConfig,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(jwt_secret));
        Self {
            auth_service: Arc::new(AuthService::new(users, tokens.clone())),
            post_service: Arc::new(PostService::new(posts)),
            tokens,
            session,
        }
    }

    /// State backed by the in-memory stores
    pub fn in_memory(jwt_secret: &str, session: SessionConfig) -> Self {
        Self::new(
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemoryPostRepository::new()),
            jwt_secret,
            session,
        )
    }
}

/// Creates and configures the application router
/// Every route runs behind the session middleware; `/api/posts/:id` routes
/// additionally resolve the post before the handler runs.
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let post_routes = Router::new()
        .route(
            "/api/posts/:id",
            get(read_post_handler)
                .patch(update_post_handler)
                .delete(delete_post_handler),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), resolve_post));

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Auth routes
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/check", get(check_handler))
        .route("/api/auth/logout", post(logout_handler))
        // Post routes
        .route("/api/posts", get(list_posts_handler).post(create_post_handler))
        .merge(post_routes)
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // keep serving without a shutdown trigger
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Blog API - Starting...");

    let config = AppConfig::from_env().expect("Invalid configuration");

    let state = match config.database_url.as_deref() {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let db_pool = db::create_pool(database_url)
                .await
                .expect("Failed to create database pool");
            db::run_migrations(&db_pool)
                .await
                .expect("Failed to run database migrations");

            AppState::new(
                Arc::new(PgUserRepository::new(db_pool.clone())),
                Arc::new(PgPostRepository::new(db_pool)),
                &config.jwt_secret,
                config.session.clone(),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage");
            AppState::in_memory(&config.jwt_secret, config.session.clone())
        }
    };

    let app = create_router(state);

    let addr = config.bind_address();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Blog API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

#[cfg(test)]
mod tests;
