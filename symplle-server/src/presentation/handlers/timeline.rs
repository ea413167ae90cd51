use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::timeline_service::{
    AlgorithmInfo, Timeline, TimelineEntry, TimelineRequest, Trending, TrendingEntry,
};
use crate::domain::ranking::{RankingWeights, TimelineAlgorithm};
use crate::i18n::LocaleContext;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::envelope::{ApiResponse, Message};
use crate::presentation::extract::AppQuery;
use crate::presentation::handlers::comments::CommentDto;
use crate::presentation::handlers::posts::PostDto;
use crate::presentation::middleware::auth::CurrentUser;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct TimelineQuery {
    /// `smart` (default), `chronological` or `popular`.
    pub(crate) algorithm: Option<String>,
    pub(crate) limit: Option<u32>,
    pub(crate) offset: Option<u32>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct TrendingQuery {
    pub(crate) limit: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TimelinePostDto {
    #[serde(flatten)]
    pub(crate) post: PostDto,
    pub(crate) liked: bool,
    pub(crate) can_edit: bool,
    pub(crate) can_delete: bool,
    pub(crate) time_ago: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) relevance_score: Option<f64>,
    pub(crate) recent_comments: Vec<CommentDto>,
}

impl From<TimelineEntry> for TimelinePostDto {
    fn from(entry: TimelineEntry) -> Self {
        Self {
            post: entry.post.into(),
            liked: entry.liked,
            can_edit: entry.can_edit,
            can_delete: entry.can_delete,
            time_ago: entry.time_ago,
            relevance_score: entry.relevance_score,
            recent_comments: entry
                .recent_comments
                .into_iter()
                .map(CommentDto::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct WeightsDto {
    pub(crate) engagement: f64,
    pub(crate) recency: f64,
    pub(crate) author: f64,
    pub(crate) content: f64,
}

impl From<RankingWeights> for WeightsDto {
    fn from(weights: RankingWeights) -> Self {
        Self {
            engagement: weights.engagement,
            recency: weights.recency,
            author: weights.author,
            content: weights.content,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TimelineMetadataDto {
    pub(crate) limit: u32,
    pub(crate) offset: u32,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) total_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) time_range: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) algorithm_weights: Option<WeightsDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TimelineResponseDto {
    pub(crate) posts: Vec<TimelinePostDto>,
    /// Strategy that produced the page; differs from the requested one
    /// after a fallback.
    pub(crate) algorithm: &'static str,
    pub(crate) metadata: TimelineMetadataDto,
}

impl From<Timeline> for TimelineResponseDto {
    fn from(timeline: Timeline) -> Self {
        let metadata = timeline.metadata;
        Self {
            posts: timeline
                .entries
                .into_iter()
                .map(TimelinePostDto::from)
                .collect(),
            algorithm: timeline.algorithm.as_str(),
            metadata: TimelineMetadataDto {
                limit: metadata.limit,
                offset: metadata.offset,
                generated_at: metadata.generated_at,
                total_count: metadata.total_count,
                time_range: metadata.time_range,
                algorithm_weights: metadata.algorithm_weights.map(WeightsDto::from),
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TrendingPostDto {
    #[serde(flatten)]
    pub(crate) post: PostDto,
    pub(crate) trending_score: f64,
    pub(crate) time_ago: String,
}

impl From<TrendingEntry> for TrendingPostDto {
    fn from(entry: TrendingEntry) -> Self {
        Self {
            post: entry.post.into(),
            trending_score: entry.trending_score,
            time_ago: entry.time_ago,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TrendingResponseDto {
    pub(crate) trending_posts: Vec<TrendingPostDto>,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) time_window: &'static str,
}

impl From<Trending> for TrendingResponseDto {
    fn from(trending: Trending) -> Self {
        Self {
            trending_posts: trending
                .entries
                .into_iter()
                .map(TrendingPostDto::from)
                .collect(),
            generated_at: trending.generated_at,
            time_window: trending.time_window,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AlgorithmDto {
    pub(crate) id: &'static str,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) factors: Vec<&'static str>,
    pub(crate) is_default: bool,
}

impl From<AlgorithmInfo> for AlgorithmDto {
    fn from(info: AlgorithmInfo) -> Self {
        Self {
            id: info.id.as_str(),
            name: info.name,
            description: info.description,
            factors: info.factors.to_vec(),
            is_default: info.is_default,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AlgorithmsResponseDto {
    pub(crate) algorithms: Vec<AlgorithmDto>,
    pub(crate) default: &'static str,
}

#[utoipa::path(
    get,
    path = "/api/timeline",
    tag = "timeline",
    security(
        ("bearer_auth" = [])
    ),
    params(TimelineQuery),
    responses(
        (status = 200, description = "Ranked page of posts", body = TimelineResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_timeline(
    State(state): State<AppState>,
    user: CurrentUser,
    ctx: LocaleContext,
    AppQuery(query): AppQuery<TimelineQuery>,
) -> AppResult<ApiResponse<TimelineResponseDto>> {
    let request = TimelineRequest {
        viewer_id: user.id,
        algorithm: TimelineAlgorithm::parse_or_default(query.algorithm.as_deref()),
        limit: query.limit,
        offset: query.offset,
        now: Utc::now(),
    };

    let timeline = state.timeline_service.get_timeline(request, &ctx).await?;
    Ok(ApiResponse::ok(
        Message::new("timeline.success"),
        timeline.into(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/timeline/trending",
    tag = "timeline",
    security(
        ("bearer_auth" = [])
    ),
    params(TrendingQuery),
    responses(
        (status = 200, description = "Trending posts of the last 24 hours", body = TrendingResponseDto),
        (status = 401, description = "Unauthorized")
    )
)]
pub(crate) async fn get_trending(
    State(state): State<AppState>,
    _user: CurrentUser,
    ctx: LocaleContext,
    AppQuery(query): AppQuery<TrendingQuery>,
) -> AppResult<ApiResponse<TrendingResponseDto>> {
    let trending = state
        .timeline_service
        .get_trending(query.limit, Utc::now(), &ctx)
        .await;
    Ok(ApiResponse::ok(
        Message::new("timeline.trending_success"),
        trending.into(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/timeline/algorithms",
    tag = "timeline",
    responses(
        (status = 200, description = "Available ranking strategies", body = AlgorithmsResponseDto)
    )
)]
pub(crate) async fn list_algorithms(
    State(state): State<AppState>,
    ctx: LocaleContext,
) -> ApiResponse<AlgorithmsResponseDto> {
    let algorithms = state
        .timeline_service
        .algorithms(&ctx)
        .into_iter()
        .map(AlgorithmDto::from)
        .collect();
    ApiResponse::ok(
        Message::new("timeline.algorithms_retrieved"),
        AlgorithmsResponseDto {
            algorithms,
            default: TimelineAlgorithm::default().as_str(),
        },
    )
}
