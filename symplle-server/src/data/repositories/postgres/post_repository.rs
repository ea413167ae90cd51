use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::{PostRow, post_columns};
use crate::data::post_repository::{
    LikeChange, LikeOutcome, NewPost, Pagination, PostPatch, PostRepository,
};
use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(concat!(
            r#"
            WITH inserted AS (
                INSERT INTO posts (author_id, content, privacy, post_type, media_urls)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            SELECT "#,
            post_columns!(),
            r#"
            FROM inserted p
            JOIN users u ON u.id = p.author_id
            "#
        ))
        .bind(input.author_id)
        .bind(&input.content)
        .bind(input.privacy.as_str())
        .bind(input.content_type.as_str())
        .bind(&input.media_urls)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Post::try_from(row)
    }

    async fn list_public_posts(&self, pagination: Pagination) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(concat!(
            "SELECT ",
            post_columns!(),
            r#"
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.is_deleted = FALSE AND p.privacy = 'public'
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $1
            OFFSET $2
            "#
        ))
        .bind(i64::from(pagination.limit))
        .bind(i64::from(pagination.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        rows.into_iter().map(Post::try_from).collect()
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(concat!(
            "SELECT ",
            post_columns!(),
            r#"
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.id = $1 AND p.is_deleted = FALSE
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(Post::try_from).transpose()
    }

    async fn record_view(&self, id: i64, viewer_id: Option<i64>) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(concat!(
            r#"
            WITH viewed AS (
                UPDATE posts
                SET views_count = views_count + 1
                WHERE id = $1
                  AND is_deleted = FALSE
                  AND (privacy = 'public' OR author_id = $2)
                RETURNING *
            )
            SELECT "#,
            post_columns!(),
            r#"
            FROM viewed p
            JOIN users u ON u.id = p.author_id
            "#
        ))
        .bind(id)
        .bind(viewer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(Post::try_from).transpose()
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(concat!(
            r#"
            WITH updated AS (
                UPDATE posts
                SET content = $3,
                    privacy = COALESCE($4, privacy),
                    is_edited = TRUE,
                    updated_at = NOW()
                WHERE id = $1 AND author_id = $2 AND is_deleted = FALSE
                RETURNING *
            )
            SELECT "#,
            post_columns!(),
            r#"
            FROM updated p
            JOIN users u ON u.id = p.author_id
            "#
        ))
        .bind(post_id)
        .bind(owner_id)
        .bind(&patch.content)
        .bind(patch.privacy.map(|privacy| privacy.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(Post::try_from).transpose()
    }

    async fn soft_delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn change_like(
        &self,
        user_id: i64,
        post_id: i64,
        change: LikeChange,
    ) -> Result<Option<LikeOutcome>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        let locked: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM posts WHERE id = $1 AND is_deleted = FALSE FOR UPDATE",
        )
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_post_db_error)?;
        if locked.is_none() {
            return Ok(None);
        }

        let currently_liked: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM likes WHERE user_id = $1 AND post_id = $2)",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_post_db_error)?;

        let liked = match change {
            LikeChange::Toggle => !currently_liked,
            LikeChange::Like => true,
            LikeChange::Unlike => false,
        };

        if liked && !currently_liked {
            sqlx::query(
                "INSERT INTO likes (user_id, post_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(map_post_db_error)?;
        } else if !liked && currently_liked {
            sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
                .bind(user_id)
                .bind(post_id)
                .execute(&mut *tx)
                .await
                .map_err(map_post_db_error)?;
        }

        let likes_count: i64 = sqlx::query_scalar(
            r#"
            UPDATE posts
            SET likes_count = (SELECT COUNT(*) FROM likes WHERE post_id = $1)
            WHERE id = $1
            RETURNING likes_count
            "#,
        )
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_post_db_error)?;

        tx.commit().await.map_err(map_post_db_error)?;

        Ok(Some(LikeOutcome { liked, likes_count }))
    }
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::NotFound("user".to_string());
    }
    DomainError::Unexpected(err.to_string())
}
