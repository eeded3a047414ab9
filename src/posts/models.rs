use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::models::Identity;
use crate::validation::validate_tags;

/// Author snapshot copied onto a post at creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PostAuthor {
    pub id: Uuid,
    #[schema(example = "juhee")]
    pub username: String,
}

impl From<&Identity> for PostAuthor {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username.clone(),
        }
    }
}

/// A blog post as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Post {
    pub id: Uuid,
    #[schema(example = "Hello")]
    pub title: String,
    /// Sanitized HTML
    #[schema(example = "<p>hello</p>")]
    pub body: String,
    #[schema(example = json!(["rust", "web"]))]
    pub tags: Vec<String>,
    pub published_date: DateTime<Utc>,
    pub user: PostAuthor,
}

/// Flat database row; the author snapshot lives in two columns
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub published_date: DateTime<Utc>,
    pub user_id: Uuid,
    pub username: String,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            body: row.body,
            tags: row.tags,
            published_date: row.published_date,
            user: PostAuthor {
                id: row.user_id,
                username: row.username,
            },
        }
    }
}

/// A post ready to be stored (body already sanitized)
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub user: PostAuthor,
}

/// Field changes for a partial update; `None` leaves the field as is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Request DTO for creating a post
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    #[schema(example = "Hello")]
    pub title: String,
    #[validate(length(min = 1, message = "Body must not be empty"))]
    #[schema(example = "<p>hello</p>")]
    pub body: String,
    #[validate(custom = "validate_tags")]
    #[schema(example = json!(["rust", "web"]))]
    pub tags: Vec<String>,
}

/// Request DTO for updating a post; every field is optional
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Body must not be empty"))]
    pub body: Option<String>,
    #[validate(custom = "validate_tags")]
    pub tags: Option<Vec<String>>,
}

/// One page of the post listing
#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub last_page: u64,
}

/// Remove repeated tags, keeping the first occurrence
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter().filter(|tag| seen.insert(tag.clone())).collect()
}
