// Posts module
// Post CRUD with pagination, tag/author filters, HTML sanitization and ownership checks

pub mod access;
pub mod error;
pub mod handlers;
pub mod models;
pub mod query;
pub mod repository;
pub mod sanitize;
pub mod service;

// Re-export commonly used types
pub use access::resolve_post;
pub use handlers::{
    create_post_handler, delete_post_handler, list_posts_handler, read_post_handler,
    update_post_handler,
};
pub use repository::{MemoryPostRepository, PgPostRepository, PostRepository};
pub use service::PostService;
