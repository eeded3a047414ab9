// Post store: listing, lookup and mutation

use axum::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::StoreError;
use crate::posts::models::{NewPost, Post, PostChanges, PostRow};
use crate::posts::query::{PostFilter, PostQueryBuilder};

/// Persistence operations the post flow needs
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<Post, StoreError>;

    /// Newest-first slice of the posts matching `filter`; `page` is 1-indexed
    async fn find_page(
        &self,
        filter: &PostFilter,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Post>, StoreError>;

    async fn count(&self, filter: &PostFilter) -> Result<u64, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    /// Apply `changes`; `None` when the post no longer exists
    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>, StoreError>;

    /// `false` when there was nothing to delete
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// PostgreSQL-backed post repository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, title, body, tags, user_id, username)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, body, tags, published_date, user_id, username
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&post.title)
        .bind(&post.body)
        .bind(&post.tags)
        .bind(post.user.id)
        .bind(&post.user.username)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_write)?;

        Ok(row.into())
    }

    async fn find_page(
        &self,
        filter: &PostFilter,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Post>, StoreError> {
        let mut builder = PostQueryBuilder::for_filter(filter);
        builder.set_pagination(page, per_page);
        let (sql, params) = builder.build_select();

        let mut query = sqlx::query_as::<_, PostRow>(&sql);
        for param in params {
            query = query.bind(param);
        }
        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, StoreError> {
        let (sql, params) = PostQueryBuilder::for_filter(filter).build_count();

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for param in params {
            query = query.bind(param);
        }
        let total = query.fetch_one(&self.pool).await?;

        Ok(total.max(0) as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, body, tags, published_date, user_id, username
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                body = COALESCE($3, body),
                tags = COALESCE($4, tags)
            WHERE id = $1
            RETURNING id, title, body, tags, published_date, user_id, username
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.body)
        .bind(changes.tags)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_write)?;

        Ok(row.map(Post::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// In-memory post store; posts are kept in creation order
#[derive(Default)]
pub struct MemoryPostRepository {
    posts: RwLock<Vec<Post>>,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn reset(&self) {
        self.posts.write().await.clear();
    }
}

fn matches_filter(post: &Post, filter: &PostFilter) -> bool {
    let username_ok = filter
        .username
        .as_ref()
        .map_or(true, |username| &post.user.username == username);
    let tag_ok = filter
        .tag
        .as_ref()
        .map_or(true, |tag| post.tags.contains(tag));
    username_ok && tag_ok
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        let created = Post {
            id: Uuid::new_v4(),
            title: post.title,
            body: post.body,
            tags: post.tags,
            published_date: Utc::now(),
            user: post.user,
        };
        self.posts.write().await.push(created.clone());
        Ok(created)
    }

    async fn find_page(
        &self,
        filter: &PostFilter,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Post>, StoreError> {
        let skip = (page.saturating_sub(1) as usize).saturating_mul(per_page as usize);
        let posts = self.posts.read().await;

        Ok(posts
            .iter()
            .rev()
            .filter(|post| matches_filter(post, filter))
            .skip(skip)
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, StoreError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().filter(|post| matches_filter(post, filter)).count() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|post| post.id == id).cloned())
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>, StoreError> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|post| post.id == id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(body) = changes.body {
            post.body = body;
        }
        if let Some(tags) = changes.tags {
            post.tags = tags;
        }
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|post| post.id != id);
        Ok(posts.len() < before)
    }
}
