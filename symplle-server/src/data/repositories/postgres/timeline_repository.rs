use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::rows::{CommentRow, ScoredPostRow, comment_columns, post_columns};
use crate::data::timeline_repository::{RankedPost, TimelineQuery, TimelineRepository};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::ranking::{RECENCY_DECAY_PER_DAY, RECENCY_MAX_SCORE, TimelineAlgorithm};

const CHRONOLOGICAL_SQL: &str = concat!(
    "SELECT ",
    post_columns!(),
    r#", NULL::float8 AS score
    FROM posts p
    JOIN users u ON u.id = p.author_id
    WHERE p.is_deleted = FALSE AND p.privacy = 'public'
    ORDER BY p.created_at DESC, p.id DESC
    LIMIT $1
    OFFSET $2
    "#
);

const POPULAR_SQL: &str = concat!(
    "SELECT ",
    post_columns!(),
    r#", (p.likes_count * 2 + p.comments_count * 3 + p.shares_count * 1.5)::float8 AS score
    FROM posts p
    JOIN users u ON u.id = p.author_id
    WHERE p.is_deleted = FALSE AND p.privacy = 'public' AND p.created_at >= $1
    ORDER BY score DESC, p.created_at DESC, p.id DESC
    LIMIT $2
    OFFSET $3
    "#
);

// $4 engagement, $5 recency, $6 content weight; $7 max recency, $8 decay/day.
const SMART_SQL: &str = concat!(
    "SELECT ",
    post_columns!(),
    r#", (
        (p.likes_count + p.comments_count * 2)::float8 * $4
        + GREATEST(
            0::float8,
            $7 - (GREATEST(0::float8, EXTRACT(EPOCH FROM ($2 - p.created_at))::float8) / 3600.0) / 24.0 * $8
        ) * $5
        + (CASE p.post_type
            WHEN 'text' THEN 10
            WHEN 'image' THEN 20
            WHEN 'video' THEN 25
            WHEN 'mixed' THEN 30
            ELSE 0
        END)::float8 * $6
    ) AS score
    FROM posts p
    JOIN users u ON u.id = p.author_id
    WHERE p.is_deleted = FALSE AND p.privacy = 'public' AND p.created_at >= $1
    ORDER BY score DESC, p.created_at DESC, p.id DESC
    LIMIT $3
    OFFSET $9
    "#
);

const TRENDING_SQL: &str = concat!(
    "SELECT * FROM (SELECT ",
    post_columns!(),
    r#", (p.likes_count * 2 + p.comments_count * 3 + p.views_count * 0.1)::float8 AS score
        FROM posts p
        JOIN users u ON u.id = p.author_id
        WHERE p.is_deleted = FALSE AND p.privacy = 'public' AND p.created_at >= $1
    ) ranked
    WHERE ranked.score > $2
    ORDER BY ranked.score DESC, ranked.created_at DESC
    LIMIT $3
    "#
);

#[derive(Debug, Clone)]
pub(crate) struct PostgresTimelineRepository {
    pool: PgPool,
}

impl PostgresTimelineRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimelineRepository for PostgresTimelineRepository {
    async fn ranked_posts(&self, query: &TimelineQuery) -> Result<Vec<RankedPost>, DomainError> {
        let limit = i64::from(query.pagination.limit);
        let offset = i64::from(query.pagination.offset);
        let since = query.since();

        let rows = match (query.algorithm, since) {
            (TimelineAlgorithm::Smart, Some(since)) => {
                sqlx::query_as::<_, ScoredPostRow>(SMART_SQL)
                    .bind(since)
                    .bind(query.now)
                    .bind(limit)
                    .bind(query.weights.engagement)
                    .bind(query.weights.recency)
                    .bind(query.weights.content)
                    .bind(RECENCY_MAX_SCORE)
                    .bind(RECENCY_DECAY_PER_DAY)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await
            }
            (TimelineAlgorithm::Popular, Some(since)) => {
                sqlx::query_as::<_, ScoredPostRow>(POPULAR_SQL)
                    .bind(since)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await
            }
            _ => {
                sqlx::query_as::<_, ScoredPostRow>(CHRONOLOGICAL_SQL)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(map_timeline_db_error)?;

        rows.into_iter().map(into_ranked).collect()
    }

    async fn count_posts(&self, since: Option<DateTime<Utc>>) -> Result<i64, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM posts
            WHERE is_deleted = FALSE
              AND privacy = 'public'
              AND ($1::timestamptz IS NULL OR created_at >= $1)
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(map_timeline_db_error)
    }

    async fn trending_posts(
        &self,
        since: DateTime<Utc>,
        min_score: f64,
        limit: u32,
    ) -> Result<Vec<RankedPost>, DomainError> {
        let rows = sqlx::query_as::<_, ScoredPostRow>(TRENDING_SQL)
            .bind(since)
            .bind(min_score)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(map_timeline_db_error)?;

        rows.into_iter().map(into_ranked).collect()
    }

    async fn liked_post_ids(
        &self,
        user_id: i64,
        post_ids: &[i64],
    ) -> Result<HashSet<i64>, DomainError> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT post_id FROM likes WHERE user_id = $1 AND post_id = ANY($2)")
                .bind(user_id)
                .bind(post_ids)
                .fetch_all(&self.pool)
                .await
                .map_err(map_timeline_db_error)?;

        Ok(ids.into_iter().collect())
    }

    async fn recent_comments(
        &self,
        post_ids: &[i64],
        per_post: u32,
    ) -> Result<HashMap<i64, Vec<Comment>>, DomainError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, CommentRow>(concat!(
            "SELECT ",
            comment_columns!(),
            r#"
            FROM (
                SELECT
                    comments.*,
                    ROW_NUMBER() OVER (
                        PARTITION BY post_id
                        ORDER BY created_at DESC, id DESC
                    ) AS rn
                FROM comments
                WHERE post_id = ANY($1)
                  AND parent_comment_id IS NULL
                  AND is_deleted = FALSE
            ) c
            JOIN users u ON u.id = c.author_id
            WHERE c.rn <= $2
            ORDER BY c.post_id, c.created_at DESC, c.id DESC
            "#
        ))
        .bind(post_ids)
        .bind(i64::from(per_post))
        .fetch_all(&self.pool)
        .await
        .map_err(map_timeline_db_error)?;

        let mut by_post: HashMap<i64, Vec<Comment>> = HashMap::new();
        for comment in rows.into_iter().map(Comment::from) {
            by_post.entry(comment.post_id).or_default().push(comment);
        }
        Ok(by_post)
    }
}

fn into_ranked(row: ScoredPostRow) -> Result<RankedPost, DomainError> {
    Ok(RankedPost {
        post: Post::try_from(row.post)?,
        score: row.score,
    })
}

fn map_timeline_db_error(err: sqlx::Error) -> DomainError {
    DomainError::Unexpected(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::SMART_SQL;

    #[test]
    fn smart_sql_clamps_future_posts_to_zero_age() {
        let compact: String = SMART_SQL.split_whitespace().collect();
        assert!(compact.contains("GREATEST(0::float8,EXTRACT(EPOCHFROM($2-p.created_at))::float8)"));
    }
}
