use chrono::{DateTime, Utc};

use super::error::DomainError;
use super::user::AuthorSummary;

const MAX_COMMENT_CHARS: usize = 2000;

#[derive(Debug, Clone)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author: AuthorSummary,
    pub(crate) content: String,
    pub(crate) parent_comment_id: Option<i64>,
    pub(crate) likes_count: i64,
    pub(crate) replies_count: i64,
    pub(crate) is_edited: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// A top-level comment with its direct replies.
#[derive(Debug, Clone)]
pub(crate) struct CommentThread {
    pub(crate) comment: Comment,
    pub(crate) replies: Vec<Comment>,
}

#[derive(Debug, Clone)]
pub(crate) struct CreateCommentRequest {
    pub(crate) content: String,
    pub(crate) parent_comment_id: Option<i64>,
}

impl CreateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let content = self.content.trim();
        if content.is_empty() || content.chars().count() > MAX_COMMENT_CHARS {
            return Err(DomainError::Validation {
                field: "content",
                message: "must be 1..2000 chars",
            });
        }
        if let Some(parent) = self.parent_comment_id
            && parent <= 0
        {
            return Err(DomainError::Validation {
                field: "parent_comment_id",
                message: "must be > 0",
            });
        }
        Ok(Self {
            content: content.to_string(),
            parent_comment_id: self.parent_comment_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::CreateCommentRequest;
    use crate::domain::error::DomainError;

    #[test]
    fn create_comment_request_trims_content() {
        let req = CreateCommentRequest {
            content: "  nice post  ".to_string(),
            parent_comment_id: Some(3),
        };
        let validated = req.validate().expect("must validate");
        assert_eq!(validated.content, "nice post");
        assert_eq!(validated.parent_comment_id, Some(3));
    }

    #[test]
    fn create_comment_request_rejects_blank_and_oversized_content() {
        for content in ["   ".to_string(), "x".repeat(2001)] {
            let err = CreateCommentRequest {
                content,
                parent_comment_id: None,
            }
            .validate()
            .expect_err("content must be rejected");
            assert!(matches!(
                err,
                DomainError::Validation {
                    field: "content",
                    ..
                }
            ));
        }
    }

    #[test]
    fn create_comment_request_rejects_non_positive_parent() {
        let err = CreateCommentRequest {
            content: "reply".to_string(),
            parent_comment_id: Some(0),
        }
        .validate()
        .expect_err("parent must be rejected");
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "parent_comment_id",
                ..
            }
        ));
    }
}
