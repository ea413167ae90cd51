use tracing::info;

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::Pagination;
use crate::domain::comment::{Comment, CommentThread, CreateCommentRequest};
use crate::domain::error::DomainError;

pub(crate) const DEFAULT_COMMENTS_LIMIT: u32 = 20;
pub(crate) const MAX_COMMENTS_LIMIT: u32 = 50;

pub(crate) struct CommentService<R: CommentRepository> {
    repo: R,
}

impl<R: CommentRepository> CommentService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Replies to replies are attached to the top-level ancestor.
    pub(crate) async fn create_comment(
        &self,
        author_id: i64,
        post_id: i64,
        req: CreateCommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;
        if !self.repo.post_exists(post_id).await? {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }

        let parent_comment_id = match req.parent_comment_id {
            Some(parent_id) => {
                let parent = self
                    .repo
                    .find_comment(parent_id)
                    .await?
                    .filter(|parent| parent.post_id == post_id)
                    .ok_or_else(|| DomainError::NotFound(format!("comment id: {parent_id}")))?;
                Some(parent.parent_comment_id.unwrap_or(parent.id))
            }
            None => None,
        };

        let comment = self
            .repo
            .create_comment(NewComment {
                post_id,
                author_id,
                content: req.content,
                parent_comment_id,
            })
            .await?;
        info!(comment_id = comment.id, post_id, "comment created");
        Ok(comment)
    }

    pub(crate) async fn list_comments(
        &self,
        post_id: i64,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<CommentThread>, DomainError> {
        if !self.repo.post_exists(post_id).await? {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }
        let pagination =
            Pagination::clamped(limit, offset, DEFAULT_COMMENTS_LIMIT, MAX_COMMENTS_LIMIT);
        self.repo.list_threads(post_id, pagination).await
    }

    pub(crate) async fn delete_comment(&self, actor_user_id: i64, comment_id: i64) -> Result<(), DomainError> {
        let comment = self
            .repo
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {comment_id}")))?;
        if comment.author.id != actor_user_id {
            return Err(DomainError::Forbidden);
        }

        if !self.repo.soft_delete_comment(comment_id).await? {
            return Err(DomainError::NotFound(format!("comment id: {comment_id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::CommentService;
    use crate::domain::comment::CreateCommentRequest;
    use crate::domain::error::DomainError;
    use crate::domain::post::PostStats;
    use crate::test_support::InMemoryStore;

    fn comment(content: &str, parent: Option<i64>) -> CreateCommentRequest {
        CreateCommentRequest {
            content: content.to_string(),
            parent_comment_id: parent,
        }
    }

    #[tokio::test]
    async fn create_comment_updates_post_counter() {
        let store = InMemoryStore::new();
        let user = store.seed_user("commenter");
        let post = store.seed_post(user.id, "post", Utc::now(), PostStats::default());
        let service = CommentService::new(store.clone());

        let created = service
            .create_comment(user.id, post.id, comment(" nice ", None))
            .await
            .expect("create must succeed");

        assert_eq!(created.content, "nice");
        assert_eq!(created.author.username, "commenter");
        assert_eq!(store.post(post.id).map(|post| post.stats.comments), Some(1));
    }

    #[tokio::test]
    async fn reply_to_reply_attaches_to_top_level_comment() {
        let store = InMemoryStore::new();
        let user = store.seed_user("commenter");
        let post = store.seed_post(user.id, "post", Utc::now(), PostStats::default());
        let service = CommentService::new(store.clone());

        let root = service
            .create_comment(user.id, post.id, comment("root", None))
            .await
            .expect("root");
        let reply = service
            .create_comment(user.id, post.id, comment("reply", Some(root.id)))
            .await
            .expect("reply");
        let nested = service
            .create_comment(user.id, post.id, comment("nested", Some(reply.id)))
            .await
            .expect("nested");

        assert_eq!(nested.parent_comment_id, Some(root.id));

        let threads = service
            .list_comments(post.id, None, None)
            .await
            .expect("list must succeed");
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].comment.replies_count, 2);
        let replies: Vec<&str> = threads[0]
            .replies
            .iter()
            .map(|reply| reply.content.as_str())
            .collect();
        assert_eq!(replies, ["reply", "nested"]);
        assert_eq!(store.post(post.id).map(|post| post.stats.comments), Some(3));
    }

    #[tokio::test]
    async fn parent_from_another_post_is_rejected() {
        let store = InMemoryStore::new();
        let user = store.seed_user("commenter");
        let first = store.seed_post(user.id, "first", Utc::now(), PostStats::default());
        let second = store.seed_post(user.id, "second", Utc::now(), PostStats::default());
        let service = CommentService::new(store);

        let foreign = service
            .create_comment(user.id, first.id, comment("on first", None))
            .await
            .expect("create must succeed");
        let err = service
            .create_comment(user.id, second.id, comment("wrong", Some(foreign.id)))
            .await
            .expect_err("must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn commenting_on_missing_post_is_not_found() {
        let store = InMemoryStore::new();
        let user = store.seed_user("commenter");
        let service = CommentService::new(store);

        let err = service
            .create_comment(user.id, 99, comment("hello", None))
            .await
            .expect_err("must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn only_author_can_delete_and_counters_follow() {
        let store = InMemoryStore::new();
        let author = store.seed_user("author");
        let other = store.seed_user("other");
        let post = store.seed_post(author.id, "post", Utc::now(), PostStats::default());
        let service = CommentService::new(store.clone());

        let created = service
            .create_comment(author.id, post.id, comment("mine", None))
            .await
            .expect("create must succeed");

        let err = service
            .delete_comment(other.id, created.id)
            .await
            .expect_err("must fail");
        assert!(matches!(err, DomainError::Forbidden));

        service
            .delete_comment(author.id, created.id)
            .await
            .expect("delete must succeed");
        assert_eq!(store.post(post.id).map(|post| post.stats.comments), Some(0));

        let threads = service
            .list_comments(post.id, None, None)
            .await
            .expect("list must succeed");
        assert!(threads.is_empty());
    }
}
