use tracing::info;

use crate::data::post_repository::{
    LikeChange, LikeOutcome, NewPost, Pagination, PostPatch, PostRepository,
};
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, Post, UpdatePostRequest};

pub(crate) const DEFAULT_POSTS_LIMIT: u32 = 20;
pub(crate) const MAX_POSTS_LIMIT: u32 = 50;

pub(crate) struct PostService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> PostService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let new_post = NewPost {
            author_id,
            content: req.content,
            privacy: req.privacy.unwrap_or_default(),
            content_type: req.content_type.unwrap_or_default(),
            media_urls: req.media_urls,
        };
        let post = self.repo.create_post(new_post).await?;
        info!(post_id = post.id, author_id, "post created");
        Ok(post)
    }

    pub(crate) async fn list_posts(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Post>, DomainError> {
        let pagination = Pagination::clamped(limit, offset, DEFAULT_POSTS_LIMIT, MAX_POSTS_LIMIT);
        self.repo.list_public_posts(pagination).await
    }

    /// Counts a view. Posts the viewer may not see look missing.
    pub(crate) async fn get_post(&self, id: i64, viewer_id: Option<i64>) -> Result<Post, DomainError> {
        self.repo
            .record_view(id, viewer_id)
            .await?
            .filter(|post| post.is_visible_to(viewer_id))
            .ok_or_else(|| post_not_found(id))
    }

    pub(crate) async fn update_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        self.ensure_owner(actor_user_id, post_id).await?;

        let patch = PostPatch {
            content: req.content,
            privacy: req.privacy,
        };
        self.repo
            .update_post_owned(post_id, actor_user_id, patch)
            .await?
            .ok_or_else(|| post_not_found(post_id))
    }

    pub(crate) async fn delete_post(&self, actor_user_id: i64, post_id: i64) -> Result<(), DomainError> {
        self.ensure_owner(actor_user_id, post_id).await?;

        let deleted = self.repo.soft_delete_post(post_id).await?;
        if !deleted {
            return Err(post_not_found(post_id));
        }
        info!(post_id, "post deleted");
        Ok(())
    }

    pub(crate) async fn toggle_like(&self, user_id: i64, post_id: i64) -> Result<LikeOutcome, DomainError> {
        self.change_like(user_id, post_id, LikeChange::Toggle).await
    }

    pub(crate) async fn like_post(&self, user_id: i64, post_id: i64) -> Result<LikeOutcome, DomainError> {
        self.change_like(user_id, post_id, LikeChange::Like).await
    }

    pub(crate) async fn unlike_post(&self, user_id: i64, post_id: i64) -> Result<LikeOutcome, DomainError> {
        self.change_like(user_id, post_id, LikeChange::Unlike).await
    }

    async fn change_like(
        &self,
        user_id: i64,
        post_id: i64,
        change: LikeChange,
    ) -> Result<LikeOutcome, DomainError> {
        self.repo
            .change_like(user_id, post_id, change)
            .await?
            .ok_or_else(|| post_not_found(post_id))
    }

    async fn ensure_owner(&self, actor_user_id: i64, post_id: i64) -> Result<(), DomainError> {
        let post = self
            .repo
            .find_post(post_id)
            .await?
            .ok_or_else(|| post_not_found(post_id))?;
        if post.author.id != actor_user_id {
            return Err(DomainError::Forbidden);
        }
        Ok(())
    }
}

fn post_not_found(id: i64) -> DomainError {
    DomainError::NotFound(format!("post id: {id}"))
}
