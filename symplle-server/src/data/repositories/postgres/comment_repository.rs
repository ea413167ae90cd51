use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::rows::{CommentRow, comment_columns};
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::Pagination;
use crate::domain::comment::{Comment, CommentThread};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn post_exists(&self, post_id: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1 AND is_deleted = FALSE)",
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_comment_db_error)
    }

    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_comment_db_error)?;

        let post: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM posts WHERE id = $1 AND is_deleted = FALSE FOR UPDATE",
        )
        .bind(input.post_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_comment_db_error)?;
        if post.is_none() {
            return Err(DomainError::NotFound("post".to_string()));
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO comments (post_id, author_id, content, parent_comment_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(input.post_id)
        .bind(input.author_id)
        .bind(&input.content)
        .bind(input.parent_comment_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_comment_db_error)?;

        refresh_counters(&mut tx, input.post_id, input.parent_comment_id).await?;

        let row = sqlx::query_as::<_, CommentRow>(concat!(
            "SELECT ",
            comment_columns!(),
            r#"
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.id = $1
            "#
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_comment_db_error)?;

        tx.commit().await.map_err(map_comment_db_error)?;
        Ok(row.into())
    }

    async fn find_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(concat!(
            "SELECT ",
            comment_columns!(),
            r#"
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.id = $1 AND c.is_deleted = FALSE
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(row.map(Comment::from))
    }

    async fn list_threads(
        &self,
        post_id: i64,
        pagination: Pagination,
    ) -> Result<Vec<CommentThread>, DomainError> {
        let top_level = sqlx::query_as::<_, CommentRow>(concat!(
            "SELECT ",
            comment_columns!(),
            r#"
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
              AND c.parent_comment_id IS NULL
              AND c.is_deleted = FALSE
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $2
            OFFSET $3
            "#
        ))
        .bind(post_id)
        .bind(i64::from(pagination.limit))
        .bind(i64::from(pagination.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;
        let top_level: Vec<Comment> = top_level.into_iter().map(Comment::from).collect();

        let parent_ids: Vec<i64> = top_level.iter().map(|comment| comment.id).collect();
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }

        let replies = sqlx::query_as::<_, CommentRow>(concat!(
            "SELECT ",
            comment_columns!(),
            r#"
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.parent_comment_id = ANY($1) AND c.is_deleted = FALSE
            ORDER BY c.created_at ASC, c.id ASC
            "#
        ))
        .bind(&parent_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        let mut replies_by_parent: HashMap<i64, Vec<Comment>> = HashMap::new();
        for reply in replies.into_iter().map(Comment::from) {
            if let Some(parent) = reply.parent_comment_id {
                replies_by_parent.entry(parent).or_default().push(reply);
            }
        }

        Ok(top_level
            .into_iter()
            .map(|comment| CommentThread {
                replies: replies_by_parent.remove(&comment.id).unwrap_or_default(),
                comment,
            })
            .collect())
    }

    async fn soft_delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_comment_db_error)?;

        let deleted: Option<(i64, Option<i64>)> = sqlx::query_as(
            r#"
            UPDATE comments
            SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING post_id, parent_comment_id
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_comment_db_error)?;

        let Some((post_id, parent_comment_id)) = deleted else {
            return Ok(false);
        };
        refresh_counters(&mut tx, post_id, parent_comment_id).await?;

        tx.commit().await.map_err(map_comment_db_error)?;
        Ok(true)
    }
}

/// Recomputes `posts.comments_count` and the parent's `replies_count`
/// from live rows.
async fn refresh_counters(
    tx: &mut Transaction<'_, Postgres>,
    post_id: i64,
    parent_comment_id: Option<i64>,
) -> Result<(), DomainError> {
    if let Some(parent) = parent_comment_id {
        sqlx::query(
            r#"
            UPDATE comments
            SET replies_count = (
                SELECT COUNT(*) FROM comments
                WHERE parent_comment_id = $1 AND is_deleted = FALSE
            )
            WHERE id = $1
            "#,
        )
        .bind(parent)
        .execute(&mut **tx)
        .await
        .map_err(map_comment_db_error)?;
    }

    sqlx::query(
        r#"
        UPDATE posts
        SET comments_count = (
            SELECT COUNT(*) FROM comments
            WHERE post_id = $1 AND is_deleted = FALSE
        )
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .execute(&mut **tx)
    .await
    .map_err(map_comment_db_error)?;

    Ok(())
}

fn map_comment_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::NotFound("comment".to_string());
    }
    DomainError::Unexpected(err.to_string())
}
