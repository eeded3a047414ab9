// Authentication module
// Cookie-carried JWT sessions: registration, login, logout and session check

pub mod cookie;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use handlers::{check_handler, login_handler, logout_handler, register_handler};
pub use middleware::session_middleware;
pub use repository::{MemoryUserRepository, PgUserRepository, UserRepository};
pub use service::AuthService;
pub use token::TokenService;
