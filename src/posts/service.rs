// Post service - business logic layer

use std::sync::Arc;
use validator::Validate;

use crate::auth::models::Identity;
use crate::posts::{
    access::{check_ownership, parse_post_id},
    error::PostError,
    models::{dedup_tags, CreatePostRequest, NewPost, Post, PostAuthor, PostChanges, PostPage,
        UpdatePostRequest},
    query::{last_page, ValidatedPostQuery, POSTS_PER_PAGE},
    repository::PostRepository,
    sanitize::{excerpt, sanitize_body, EXCERPT_CHARS},
};

/// Post service coordinating validation, sanitization and ownership
pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// Look up a post by its raw path id
    ///
    /// Malformed ids fail with `InvalidId` without touching the store.
    pub async fn resolve(&self, raw_id: &str) -> Result<Post, PostError> {
        let id = parse_post_id(raw_id)?;
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(PostError::NotFound(id))
    }

    /// Create a post authored by `identity`
    pub async fn create(
        &self,
        identity: &Identity,
        request: CreatePostRequest,
    ) -> Result<Post, PostError> {
        request.validate()?;

        let post = self
            .posts
            .create(NewPost {
                title: request.title,
                body: sanitize_body(&request.body),
                tags: dedup_tags(request.tags),
                user: PostAuthor::from(identity),
            })
            .await?;

        tracing::info!("User {} created post {}", identity.id, post.id);
        Ok(post)
    }

    /// One page of posts, newest first, bodies cut to plain-text excerpts
    pub async fn list(&self, query: ValidatedPostQuery) -> Result<PostPage, PostError> {
        let total = self.posts.count(&query.filter).await?;
        let posts = self
            .posts
            .find_page(&query.filter, query.page, POSTS_PER_PAGE)
            .await?
            .into_iter()
            .map(|mut post| {
                post.body = excerpt(&post.body, EXCERPT_CHARS);
                post
            })
            .collect();

        Ok(PostPage {
            posts,
            last_page: last_page(total),
        })
    }

    /// Apply a partial update to `post`
    ///
    /// Ownership is checked before anything is written. The author snapshot
    /// and publish date never change.
    pub async fn update(
        &self,
        post: &Post,
        identity: &Identity,
        request: UpdatePostRequest,
    ) -> Result<Post, PostError> {
        check_ownership(Some(identity), post)?;
        request.validate()?;

        let changes = PostChanges {
            title: request.title,
            body: request.body.as_deref().map(sanitize_body),
            tags: request.tags.map(dedup_tags),
        };

        let updated = self
            .posts
            .update(post.id, changes)
            .await?
            .ok_or(PostError::NotFound(post.id))?;

        tracing::info!("User {} updated post {}", identity.id, post.id);
        Ok(updated)
    }

    /// Delete `post` if `identity` wrote it
    pub async fn delete(&self, post: &Post, identity: &Identity) -> Result<(), PostError> {
        check_ownership(Some(identity), post)?;

        if !self.posts.delete(post.id).await? {
            return Err(PostError::NotFound(post.id));
        }

        tracing::info!("User {} deleted post {}", identity.id, post.id);
        Ok(())
    }
}
