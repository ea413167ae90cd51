use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::{ContentType, Post, Privacy};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) author_id: i64,
    pub(crate) content: String,
    pub(crate) privacy: Privacy,
    pub(crate) content_type: ContentType,
    pub(crate) media_urls: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) content: String,
    pub(crate) privacy: Option<Privacy>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pagination {
    pub(crate) limit: u32,
    pub(crate) offset: u32,
}

impl Pagination {
    pub(crate) fn clamped(limit: Option<u32>, offset: Option<u32>, default: u32, max: u32) -> Self {
        Self {
            limit: limit.unwrap_or(default).clamp(1, max),
            offset: offset.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LikeChange {
    Toggle,
    Like,
    Unlike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LikeOutcome {
    pub(crate) liked: bool,
    pub(crate) likes_count: i64,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn list_public_posts(&self, pagination: Pagination) -> Result<Vec<Post>, DomainError>;
    /// Non-deleted post by id, no side effects.
    async fn find_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    /// Bumps the view counter of a post the viewer may see and returns it.
    async fn record_view(&self, id: i64, viewer_id: Option<i64>) -> Result<Option<Post>, DomainError>;
    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError>;
    async fn soft_delete_post(&self, id: i64) -> Result<bool, DomainError>;
    /// `None` when the post does not exist. The stored counter is
    /// recomputed from the likes table.
    async fn change_like(
        &self,
        user_id: i64,
        post_id: i64,
        change: LikeChange,
    ) -> Result<Option<LikeOutcome>, DomainError>;
}

#[async_trait]
impl<T: PostRepository + ?Sized> PostRepository for Arc<T> {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        (**self).create_post(input).await
    }

    async fn list_public_posts(&self, pagination: Pagination) -> Result<Vec<Post>, DomainError> {
        (**self).list_public_posts(pagination).await
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        (**self).find_post(id).await
    }

    async fn record_view(&self, id: i64, viewer_id: Option<i64>) -> Result<Option<Post>, DomainError> {
        (**self).record_view(id, viewer_id).await
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        (**self).update_post_owned(post_id, owner_id, patch).await
    }

    async fn soft_delete_post(&self, id: i64) -> Result<bool, DomainError> {
        (**self).soft_delete_post(id).await
    }

    async fn change_like(
        &self,
        user_id: i64,
        post_id: i64,
        change: LikeChange,
    ) -> Result<Option<LikeOutcome>, DomainError> {
        (**self).change_like(user_id, post_id, change).await
    }
}
