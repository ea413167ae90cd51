use std::sync::Arc;

use async_trait::async_trait;

use super::post_repository::Pagination;
use crate::domain::comment::{Comment, CommentThread};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) content: String,
    /// Always a top-level comment.
    pub(crate) parent_comment_id: Option<i64>,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    async fn post_exists(&self, post_id: i64) -> Result<bool, DomainError>;
    /// Inserts the comment and refreshes the post and parent counters in
    /// the same transaction.
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError>;
    async fn find_comment(&self, id: i64) -> Result<Option<Comment>, DomainError>;
    async fn list_threads(
        &self,
        post_id: i64,
        pagination: Pagination,
    ) -> Result<Vec<CommentThread>, DomainError>;
    async fn soft_delete_comment(&self, id: i64) -> Result<bool, DomainError>;
}

#[async_trait]
impl<T: CommentRepository + ?Sized> CommentRepository for Arc<T> {
    async fn post_exists(&self, post_id: i64) -> Result<bool, DomainError> {
        (**self).post_exists(post_id).await
    }

    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        (**self).create_comment(input).await
    }

    async fn find_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        (**self).find_comment(id).await
    }

    async fn list_threads(
        &self,
        post_id: i64,
        pagination: Pagination,
    ) -> Result<Vec<CommentThread>, DomainError> {
        (**self).list_threads(post_id, pagination).await
    }

    async fn soft_delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        (**self).soft_delete_comment(id).await
    }
}
