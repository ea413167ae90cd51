use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::post_repository::Pagination;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::ranking::{RankingWeights, TimelineAlgorithm};

#[derive(Debug, Clone, Copy)]
pub(crate) struct TimelineQuery {
    pub(crate) algorithm: TimelineAlgorithm,
    pub(crate) pagination: Pagination,
    pub(crate) weights: RankingWeights,
    /// Reference instant for windows and recency decay.
    pub(crate) now: DateTime<Utc>,
}

impl TimelineQuery {
    pub(crate) fn since(&self) -> Option<DateTime<Utc>> {
        self.algorithm.window().map(|window| self.now - window)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RankedPost {
    pub(crate) post: Post,
    /// Present for score-ranked strategies.
    pub(crate) score: Option<f64>,
}

#[async_trait]
pub(crate) trait TimelineRepository: Send + Sync {
    /// Public, non-deleted posts ordered by the query's strategy, ties
    /// broken by newest first.
    async fn ranked_posts(&self, query: &TimelineQuery) -> Result<Vec<RankedPost>, DomainError>;
    async fn count_posts(&self, since: Option<DateTime<Utc>>) -> Result<i64, DomainError>;
    async fn trending_posts(
        &self,
        since: DateTime<Utc>,
        min_score: f64,
        limit: u32,
    ) -> Result<Vec<RankedPost>, DomainError>;
    async fn liked_post_ids(&self, user_id: i64, post_ids: &[i64]) -> Result<HashSet<i64>, DomainError>;
    /// Newest top-level comments per post, at most `per_post` each.
    async fn recent_comments(
        &self,
        post_ids: &[i64],
        per_post: u32,
    ) -> Result<HashMap<i64, Vec<Comment>>, DomainError>;
}

#[async_trait]
impl<T: TimelineRepository + ?Sized> TimelineRepository for Arc<T> {
    async fn ranked_posts(&self, query: &TimelineQuery) -> Result<Vec<RankedPost>, DomainError> {
        (**self).ranked_posts(query).await
    }

    async fn count_posts(&self, since: Option<DateTime<Utc>>) -> Result<i64, DomainError> {
        (**self).count_posts(since).await
    }

    async fn trending_posts(
        &self,
        since: DateTime<Utc>,
        min_score: f64,
        limit: u32,
    ) -> Result<Vec<RankedPost>, DomainError> {
        (**self).trending_posts(since, min_score, limit).await
    }

    async fn liked_post_ids(&self, user_id: i64, post_ids: &[i64]) -> Result<HashSet<i64>, DomainError> {
        (**self).liked_post_ids(user_id, post_ids).await
    }

    async fn recent_comments(
        &self,
        post_ids: &[i64],
        per_post: u32,
    ) -> Result<HashMap<i64, Vec<Comment>>, DomainError> {
        (**self).recent_comments(post_ids, per_post).await
    }
}
