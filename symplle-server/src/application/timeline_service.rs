use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::data::post_repository::Pagination;
use crate::data::timeline_repository::{RankedPost, TimelineQuery, TimelineRepository};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::ranking::{
    self, DEFAULT_TIMELINE_LIMIT, DEFAULT_TRENDING_LIMIT, MAX_TIMELINE_LIMIT, MAX_TRENDING_LIMIT,
    RECENT_COMMENTS_PER_POST, RankingWeights, TRENDING_MIN_SCORE, TimelineAlgorithm,
};
use crate::i18n::LocaleContext;

pub(crate) const TRENDING_WINDOW_LABEL: &str = "24_hours";

#[derive(Debug, Clone, Copy)]
pub(crate) struct TimelineRequest {
    pub(crate) viewer_id: i64,
    pub(crate) algorithm: TimelineAlgorithm,
    pub(crate) limit: Option<u32>,
    pub(crate) offset: Option<u32>,
    pub(crate) now: DateTime<Utc>,
}

/// A ranked post with what the viewer needs to render it.
#[derive(Debug, Clone)]
pub(crate) struct TimelineEntry {
    pub(crate) post: Post,
    pub(crate) liked: bool,
    pub(crate) can_edit: bool,
    pub(crate) can_delete: bool,
    pub(crate) time_ago: String,
    pub(crate) relevance_score: Option<f64>,
    pub(crate) recent_comments: Vec<Comment>,
}

#[derive(Debug, Clone)]
pub(crate) struct TimelineMetadata {
    pub(crate) limit: u32,
    pub(crate) offset: u32,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) total_count: i64,
    pub(crate) time_range: Option<&'static str>,
    pub(crate) algorithm_weights: Option<RankingWeights>,
}

#[derive(Debug, Clone)]
pub(crate) struct Timeline {
    pub(crate) entries: Vec<TimelineEntry>,
    /// The strategy that produced the page, after any fallback.
    pub(crate) algorithm: TimelineAlgorithm,
    pub(crate) metadata: TimelineMetadata,
}

#[derive(Debug, Clone)]
pub(crate) struct TrendingEntry {
    pub(crate) post: Post,
    pub(crate) trending_score: f64,
    pub(crate) time_ago: String,
}

#[derive(Debug, Clone)]
pub(crate) struct Trending {
    pub(crate) entries: Vec<TrendingEntry>,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) time_window: &'static str,
}

#[derive(Debug, Clone)]
pub(crate) struct AlgorithmInfo {
    pub(crate) id: TimelineAlgorithm,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) factors: &'static [&'static str],
    pub(crate) is_default: bool,
}

pub(crate) struct TimelineService<R: TimelineRepository> {
    repo: R,
    weights: RankingWeights,
}

impl<R: TimelineRepository> TimelineService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self {
            repo,
            weights: RankingWeights::default(),
        }
    }

    /// Ranks a page of posts. A failing strategy degrades to the
    /// chronological one; only a failing chronological query is an error.
    pub(crate) async fn get_timeline(
        &self,
        request: TimelineRequest,
        ctx: &LocaleContext,
    ) -> Result<Timeline, DomainError> {
        let pagination = Pagination::clamped(
            request.limit,
            request.offset,
            DEFAULT_TIMELINE_LIMIT,
            MAX_TIMELINE_LIMIT,
        );
        let query = TimelineQuery {
            algorithm: request.algorithm,
            pagination,
            weights: self.weights,
            now: request.now,
        };

        let (query, ranked) = match self.repo.ranked_posts(&query).await {
            Ok(ranked) => (query, ranked),
            Err(err) if query.algorithm != TimelineAlgorithm::Chronological => {
                warn!(
                    algorithm = %query.algorithm,
                    error = %err,
                    "timeline ranking failed, falling back to chronological"
                );
                let fallback = TimelineQuery {
                    algorithm: TimelineAlgorithm::Chronological,
                    ..query
                };
                let ranked = self.repo.ranked_posts(&fallback).await?;
                (fallback, ranked)
            }
            Err(err) => return Err(err),
        };

        let total_count = match self.repo.count_posts(query.since()).await {
            Ok(count) => count,
            Err(err) => {
                warn!(error = %err, "timeline count failed");
                ranked.len() as i64
            }
        };

        let entries = self.enrich(ranked, &query, request.viewer_id, ctx).await;
        let is_smart = query.algorithm == TimelineAlgorithm::Smart;

        Ok(Timeline {
            entries,
            algorithm: query.algorithm,
            metadata: TimelineMetadata {
                limit: pagination.limit,
                offset: pagination.offset,
                generated_at: request.now,
                total_count,
                time_range: query.algorithm.window_label(),
                algorithm_weights: is_smart.then_some(self.weights),
            },
        })
    }

    /// Public posts of the last day whose engagement clears the floor.
    /// Failures degrade to an empty list.
    pub(crate) async fn get_trending(
        &self,
        limit: Option<u32>,
        now: DateTime<Utc>,
        ctx: &LocaleContext,
    ) -> Trending {
        let limit = limit
            .unwrap_or(DEFAULT_TRENDING_LIMIT)
            .clamp(1, MAX_TRENDING_LIMIT);
        let since = now - ranking::trending_window();

        let ranked = self
            .repo
            .trending_posts(since, TRENDING_MIN_SCORE, limit)
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "trending query failed");
                Vec::new()
            });

        Trending {
            entries: ranked
                .into_iter()
                .map(|ranked| TrendingEntry {
                    trending_score: ranking::round_score(
                        ranked
                            .score
                            .unwrap_or_else(|| ranking::trending_score(&ranked.post.stats)),
                    ),
                    time_ago: ctx.time_ago(&ranked.post.created_at, &now),
                    post: ranked.post,
                })
                .collect(),
            generated_at: now,
            time_window: TRENDING_WINDOW_LABEL,
        }
    }

    pub(crate) fn algorithms(&self, ctx: &LocaleContext) -> Vec<AlgorithmInfo> {
        TimelineAlgorithm::ALL
            .into_iter()
            .map(|algorithm| AlgorithmInfo {
                id: algorithm,
                name: ctx.t(&format!("timeline.algorithms.{algorithm}.name")),
                description: ctx.t(&format!("timeline.algorithms.{algorithm}.description")),
                factors: algorithm.factors(),
                is_default: algorithm == TimelineAlgorithm::default(),
            })
            .collect()
    }

    async fn enrich(
        &self,
        ranked: Vec<RankedPost>,
        query: &TimelineQuery,
        viewer_id: i64,
        ctx: &LocaleContext,
    ) -> Vec<TimelineEntry> {
        let post_ids: Vec<i64> = ranked.iter().map(|ranked| ranked.post.id).collect();

        let liked = self
            .repo
            .liked_post_ids(viewer_id, &post_ids)
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "failed to load likes for timeline");
                HashSet::new()
            });
        let mut comments = self
            .repo
            .recent_comments(&post_ids, RECENT_COMMENTS_PER_POST)
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "failed to load recent comments for timeline");
                HashMap::new()
            });

        let is_smart = query.algorithm == TimelineAlgorithm::Smart;
        ranked
            .into_iter()
            .map(|RankedPost { post, score }| {
                let is_author = post.author.id == viewer_id;
                let score = score.or_else(|| {
                    ranking::score_post(query.algorithm, &post, query.now, &query.weights)
                });
                TimelineEntry {
                    liked: liked.contains(&post.id),
                    can_edit: is_author,
                    can_delete: is_author,
                    time_ago: ctx.time_ago(&post.created_at, &query.now),
                    relevance_score: score.filter(|_| is_smart).map(ranking::round_score),
                    recent_comments: comments.remove(&post.id).unwrap_or_default(),
                    post,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};

    use super::{TimelineRequest, TimelineService};
    use crate::data::comment_repository::{CommentRepository, NewComment};
    use crate::data::post_repository::{LikeChange, PostRepository};
    use crate::data::timeline_repository::{RankedPost, TimelineQuery, TimelineRepository};
    use crate::domain::comment::Comment;
    use crate::domain::error::DomainError;
    use crate::domain::post::PostStats;
    use crate::domain::ranking::TimelineAlgorithm;
    use crate::i18n::tests::shipped_i18n;
    use crate::i18n::{Locale, LocaleContext};
    use crate::test_support::InMemoryStore;

    fn ctx(raw: &str) -> LocaleContext {
        LocaleContext::new(shipped_i18n(), Locale::parse(raw).expect("valid locale"))
    }

    fn request(viewer_id: i64, algorithm: TimelineAlgorithm, now: DateTime<Utc>) -> TimelineRequest {
        TimelineRequest {
            viewer_id,
            algorithm,
            limit: None,
            offset: None,
            now,
        }
    }

    fn stats(likes: i64, comments: i64, views: i64) -> PostStats {
        PostStats {
            likes,
            comments,
            shares: 0,
            views,
        }
    }

    /// Delegates to the in-memory store but fails every ranked query
    /// except the chronological one.
    #[derive(Clone)]
    struct FlakyRanking {
        inner: InMemoryStore,
        ranked_calls: Arc<Mutex<Vec<TimelineAlgorithm>>>,
    }

    #[async_trait]
    impl TimelineRepository for FlakyRanking {
        async fn ranked_posts(&self, query: &TimelineQuery) -> Result<Vec<RankedPost>, DomainError> {
            self.ranked_calls
                .lock()
                .expect("ranked calls mutex poisoned")
                .push(query.algorithm);
            if query.algorithm == TimelineAlgorithm::Chronological {
                self.inner.ranked_posts(query).await
            } else {
                Err(DomainError::Unexpected("ranking exploded".to_string()))
            }
        }

        async fn count_posts(&self, since: Option<DateTime<Utc>>) -> Result<i64, DomainError> {
            self.inner.count_posts(since).await
        }

        async fn trending_posts(
            &self,
            _since: DateTime<Utc>,
            _min_score: f64,
            _limit: u32,
        ) -> Result<Vec<RankedPost>, DomainError> {
            Err(DomainError::Unexpected("trending exploded".to_string()))
        }

        async fn liked_post_ids(
            &self,
            _user_id: i64,
            _post_ids: &[i64],
        ) -> Result<HashSet<i64>, DomainError> {
            Err(DomainError::Unexpected("likes exploded".to_string()))
        }

        async fn recent_comments(
            &self,
            post_ids: &[i64],
            per_post: u32,
        ) -> Result<HashMap<i64, Vec<Comment>>, DomainError> {
            self.inner.recent_comments(post_ids, per_post).await
        }
    }

    #[tokio::test]
    async fn smart_timeline_prefers_engagement_and_reports_weights() {
        let store = InMemoryStore::new();
        let author = store.seed_user("author");
        let viewer = store.seed_user("viewer");
        let now = Utc::now();
        let quiet = store.seed_post(author.id, "quiet", now - Duration::hours(1), stats(0, 0, 0));
        let busy = store.seed_post(author.id, "busy", now - Duration::hours(2), stats(40, 10, 0));
        let service = TimelineService::new(store);

        let timeline = service
            .get_timeline(request(viewer.id, TimelineAlgorithm::Smart, now), &ctx("en_US"))
            .await
            .expect("timeline must load");

        assert_eq!(timeline.algorithm, TimelineAlgorithm::Smart);
        let ids: Vec<i64> = timeline.entries.iter().map(|entry| entry.post.id).collect();
        assert_eq!(ids, [busy.id, quiet.id]);
        assert!(timeline.entries.iter().all(|entry| entry.relevance_score.is_some()));
        assert_eq!(timeline.metadata.limit, 20);
        assert_eq!(timeline.metadata.total_count, 2);
        assert_eq!(timeline.metadata.time_range, Some("30_days"));
        let weights = timeline.metadata.algorithm_weights.expect("smart has weights");
        assert_eq!(weights.author, 0.2);
    }

    #[tokio::test]
    async fn popular_timeline_excludes_posts_older_than_a_week() {
        let store = InMemoryStore::new();
        let author = store.seed_user("author");
        let now = Utc::now();
        store.seed_post(author.id, "viral but old", now - Duration::days(8), stats(500, 90, 0));
        let fresh = store.seed_post(author.id, "fresh", now - Duration::days(1), stats(1, 0, 0));
        let service = TimelineService::new(store);

        let timeline = service
            .get_timeline(request(author.id, TimelineAlgorithm::Popular, now), &ctx("en_US"))
            .await
            .expect("timeline must load");

        let ids: Vec<i64> = timeline.entries.iter().map(|entry| entry.post.id).collect();
        assert_eq!(ids, [fresh.id]);
        assert_eq!(timeline.metadata.time_range, Some("7_days"));
        assert!(timeline.metadata.algorithm_weights.is_none());
        assert!(timeline.entries[0].relevance_score.is_none());
    }

    #[tokio::test]
    async fn chronological_timeline_orders_newest_first_with_viewer_context() {
        let store = InMemoryStore::new();
        let author = store.seed_user("author");
        let viewer = store.seed_user("viewer");
        let now = Utc::now();
        let older = store.seed_post(author.id, "older", now - Duration::hours(3), stats(0, 0, 0));
        let newer = store.seed_post(viewer.id, "newer", now - Duration::minutes(5), stats(0, 0, 0));
        store
            .change_like(viewer.id, older.id, LikeChange::Like)
            .await
            .expect("like must succeed");
        for text in ["one", "two", "three", "four"] {
            store
                .create_comment(NewComment {
                    post_id: older.id,
                    author_id: author.id,
                    content: text.to_string(),
                    parent_comment_id: None,
                })
                .await
                .expect("comment must succeed");
        }
        let service = TimelineService::new(store);

        let timeline = service
            .get_timeline(
                request(viewer.id, TimelineAlgorithm::Chronological, now),
                &ctx("pt_BR"),
            )
            .await
            .expect("timeline must load");

        let [first, second] = timeline.entries.as_slice() else {
            panic!("expected two entries");
        };
        assert_eq!(first.post.id, newer.id);
        assert!(first.can_edit && first.can_delete);
        assert!(!first.liked);
        assert_eq!(first.time_ago, "há 5 minutos");

        assert_eq!(second.post.id, older.id);
        assert!(second.liked);
        assert!(!second.can_edit);
        assert_eq!(second.time_ago, "há 3 horas");
        assert_eq!(second.recent_comments.len(), 3);
        assert!(timeline.metadata.time_range.is_none());
    }

    #[tokio::test]
    async fn failing_strategy_falls_back_to_chronological() {
        let store = InMemoryStore::new();
        let author = store.seed_user("author");
        let now = Utc::now();
        store.seed_post(author.id, "only", now - Duration::hours(1), stats(3, 0, 0));
        let repo = FlakyRanking {
            inner: store,
            ranked_calls: Arc::new(Mutex::new(Vec::new())),
        };
        let service = TimelineService::new(repo.clone());

        let timeline = service
            .get_timeline(request(author.id, TimelineAlgorithm::Smart, now), &ctx("en_US"))
            .await
            .expect("fallback must succeed");

        assert_eq!(timeline.algorithm, TimelineAlgorithm::Chronological);
        assert_eq!(timeline.entries.len(), 1);
        assert!(!timeline.entries[0].liked, "like lookup failure degrades to false");
        assert!(timeline.metadata.algorithm_weights.is_none());
        assert_eq!(
            *repo.ranked_calls.lock().expect("ranked calls mutex poisoned"),
            [TimelineAlgorithm::Smart, TimelineAlgorithm::Chronological]
        );
    }

    #[tokio::test]
    async fn limit_is_clamped() {
        let store = InMemoryStore::new();
        let author = store.seed_user("author");
        let service = TimelineService::new(store);

        let timeline = service
            .get_timeline(
                TimelineRequest {
                    limit: Some(1000),
                    ..request(author.id, TimelineAlgorithm::Chronological, Utc::now())
                },
                &ctx("en_US"),
            )
            .await
            .expect("timeline must load");

        assert_eq!(timeline.metadata.limit, 100);
    }

    #[tokio::test]
    async fn trending_applies_window_and_floor() {
        let store = InMemoryStore::new();
        let author = store.seed_user("author");
        let now = Utc::now();
        let hot = store.seed_post(author.id, "hot", now - Duration::hours(2), stats(5, 1, 10));
        store.seed_post(author.id, "floor", now - Duration::hours(1), stats(2, 0, 10));
        store.seed_post(author.id, "stale", now - Duration::hours(30), stats(50, 5, 0));
        let service = TimelineService::new(store);

        let trending = service.get_trending(None, now, &ctx("es_ES")).await;

        assert_eq!(trending.time_window, "24_hours");
        let [entry] = trending.entries.as_slice() else {
            panic!("expected one trending post");
        };
        assert_eq!(entry.post.id, hot.id);
        assert_eq!(entry.trending_score, 14.0);
        assert_eq!(entry.time_ago, "hace 2 horas");
    }

    #[tokio::test]
    async fn trending_failure_yields_empty_list() {
        let repo = FlakyRanking {
            inner: InMemoryStore::new(),
            ranked_calls: Arc::new(Mutex::new(Vec::new())),
        };
        let service = TimelineService::new(repo);

        let trending = service.get_trending(Some(5), Utc::now(), &ctx("en_US")).await;
        assert!(trending.entries.is_empty());
    }

    #[test]
    fn algorithms_are_localized() {
        let service = TimelineService::new(InMemoryStore::new());

        let algorithms = service.algorithms(&ctx("pt_BR"));

        assert_eq!(algorithms.len(), 3);
        assert!(algorithms[0].is_default);
        assert_eq!(algorithms[0].id, TimelineAlgorithm::Smart);
        assert!(!algorithms[0].name.starts_with("timeline."));
        assert_eq!(algorithms[1].factors, ["created_at"]);
    }
}
