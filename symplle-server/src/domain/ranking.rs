//! Scoring rules shared by the timeline strategies.
//!
//! The Postgres repository evaluates the same formulas in SQL and binds the
//! weights and windows defined here, so both sides stay in lockstep.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::post::{ContentType, Post, PostStats};

pub(crate) const DEFAULT_TIMELINE_LIMIT: u32 = 20;
pub(crate) const MAX_TIMELINE_LIMIT: u32 = 100;
pub(crate) const DEFAULT_TRENDING_LIMIT: u32 = 10;
pub(crate) const MAX_TRENDING_LIMIT: u32 = 50;
pub(crate) const RECENT_COMMENTS_PER_POST: u32 = 3;

pub(crate) const TRENDING_MIN_SCORE: f64 = 5.0;

/// Linear recency decay: points lost per day of age.
pub(crate) const RECENCY_DECAY_PER_DAY: f64 = 10.0;
pub(crate) const RECENCY_MAX_SCORE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TimelineAlgorithm {
    #[default]
    Smart,
    Chronological,
    Popular,
}

impl TimelineAlgorithm {
    pub(crate) const ALL: [TimelineAlgorithm; 3] = [
        TimelineAlgorithm::Smart,
        TimelineAlgorithm::Chronological,
        TimelineAlgorithm::Popular,
    ];

    /// Unknown or missing selectors fall back to the smart strategy.
    pub(crate) fn parse_or_default(raw: Option<&str>) -> Self {
        match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            Some("chronological") => TimelineAlgorithm::Chronological,
            Some("popular") => TimelineAlgorithm::Popular,
            _ => TimelineAlgorithm::Smart,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            TimelineAlgorithm::Smart => "smart",
            TimelineAlgorithm::Chronological => "chronological",
            TimelineAlgorithm::Popular => "popular",
        }
    }

    /// Only posts younger than this window are ranked.
    pub(crate) fn window(self) -> Option<Duration> {
        match self {
            TimelineAlgorithm::Chronological => None,
            TimelineAlgorithm::Popular => Some(Duration::days(7)),
            TimelineAlgorithm::Smart => Some(Duration::days(30)),
        }
    }

    pub(crate) fn window_label(self) -> Option<&'static str> {
        match self {
            TimelineAlgorithm::Chronological => None,
            TimelineAlgorithm::Popular => Some("7_days"),
            TimelineAlgorithm::Smart => Some("30_days"),
        }
    }

    pub(crate) fn factors(self) -> &'static [&'static str] {
        match self {
            TimelineAlgorithm::Smart => &["engagement", "recency", "content_type", "author_relevance"],
            TimelineAlgorithm::Chronological => &["created_at"],
            TimelineAlgorithm::Popular => &["likes_count", "comments_count", "shares_count"],
        }
    }
}

impl fmt::Display for TimelineAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn trending_window() -> Duration {
    Duration::hours(24)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct RankingWeights {
    pub(crate) engagement: f64,
    pub(crate) recency: f64,
    /// Reserved for follow-graph affinity; not part of the score yet.
    pub(crate) author: f64,
    pub(crate) content: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            engagement: 0.4,
            recency: 0.3,
            author: 0.2,
            content: 0.1,
        }
    }
}

pub(crate) fn engagement_score(stats: &PostStats) -> f64 {
    stats.likes as f64 + stats.comments as f64 * 2.0
}

pub(crate) fn recency_score(age: Duration) -> f64 {
    let hours = age.num_seconds().max(0) as f64 / 3600.0;
    (RECENCY_MAX_SCORE - hours / 24.0 * RECENCY_DECAY_PER_DAY).max(0.0)
}

pub(crate) fn smart_score(
    stats: &PostStats,
    content_type: ContentType,
    age: Duration,
    weights: &RankingWeights,
) -> f64 {
    engagement_score(stats) * weights.engagement
        + recency_score(age) * weights.recency
        + content_type.ranking_bonus() * weights.content
}

pub(crate) fn popularity_score(stats: &PostStats) -> f64 {
    stats.likes as f64 * 2.0 + stats.comments as f64 * 3.0 + stats.shares as f64 * 1.5
}

pub(crate) fn trending_score(stats: &PostStats) -> f64 {
    stats.likes as f64 * 2.0 + stats.comments as f64 * 3.0 + stats.views as f64 * 0.1
}

/// Score of `post` under `algorithm` at `now`. Chronological pages are
/// unscored.
pub(crate) fn score_post(
    algorithm: TimelineAlgorithm,
    post: &Post,
    now: DateTime<Utc>,
    weights: &RankingWeights,
) -> Option<f64> {
    match algorithm {
        TimelineAlgorithm::Chronological => None,
        TimelineAlgorithm::Popular => Some(popularity_score(&post.stats)),
        TimelineAlgorithm::Smart => Some(smart_score(
            &post.stats,
            post.content_type,
            now - post.created_at,
            weights,
        )),
    }
}

/// Rounds a score for presentation, two decimals.
pub(crate) fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}
