use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::post_service::{DEFAULT_POSTS_LIMIT, MAX_POSTS_LIMIT};
use crate::data::post_repository::{LikeOutcome, Pagination};
use crate::domain::post::{ContentType, CreatePostRequest, Post, Privacy, UpdatePostRequest};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::envelope::{ApiResponse, Message};
use crate::presentation::extract::{AppJson, AppPath, AppQuery};
use crate::presentation::handlers::{AuthorDto, DeletedDto, PaginationQuery};
use crate::presentation::middleware::auth::CurrentUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub(crate) content: String,
    /// `public`, `friends` or `private`; defaults to `public`.
    pub(crate) privacy: Option<String>,
    /// `text`, `image`, `video` or `mixed`; inferred from the media when omitted.
    pub(crate) post_type: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub(crate) media_urls: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 1, max = 5000))]
    pub(crate) content: String,
    pub(crate) privacy: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) privacy: String,
    pub(crate) post_type: String,
    pub(crate) media_urls: Vec<String>,
    pub(crate) likes_count: i64,
    pub(crate) comments_count: i64,
    pub(crate) shares_count: i64,
    pub(crate) views_count: i64,
    pub(crate) is_edited: bool,
    pub(crate) author: AuthorDto,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            content: post.content,
            privacy: post.privacy.to_string(),
            post_type: post.content_type.to_string(),
            media_urls: post.media_urls,
            likes_count: post.stats.likes,
            comments_count: post.stats.comments,
            shares_count: post.stats.shares,
            views_count: post.stats.views,
            is_edited: post.is_edited,
            author: post.author.into(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListPostsResponseDto {
    pub(crate) posts: Vec<PostDto>,
    pub(crate) limit: u32,
    pub(crate) offset: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LikeResponseDto {
    /// `liked` or `unliked`.
    pub(crate) action: &'static str,
    pub(crate) likes_count: i64,
    pub(crate) post_id: i64,
}

fn like_response(post_id: i64, outcome: LikeOutcome) -> ApiResponse<LikeResponseDto> {
    let (action, key) = if outcome.liked {
        ("liked", "posts.liked")
    } else {
        ("unliked", "posts.unliked")
    };
    ApiResponse::ok(
        Message::new(key),
        LikeResponseDto {
            action,
            likes_count: outcome.likes_count,
            post_id,
        },
    )
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Posts listed", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PaginationQuery>,
) -> AppResult<ApiResponse<ListPostsResponseDto>> {
    let page = Pagination::clamped(query.limit, query.offset, DEFAULT_POSTS_LIMIT, MAX_POSTS_LIMIT);
    let posts = state
        .post_service
        .list_posts(Some(page.limit), Some(page.offset))
        .await?;

    Ok(ApiResponse::ok(
        Message::new("posts.list_retrieved"),
        ListPostsResponseDto {
            posts: posts.into_iter().map(PostDto::from).collect(),
            limit: page.limit,
            offset: page.offset,
        },
    ))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(dto): AppJson<CreatePostDto>,
) -> AppResult<ApiResponse<PostDto>> {
    dto.validate()?;
    let req = CreatePostRequest {
        content: dto.content,
        privacy: dto.privacy.as_deref().map(str::parse::<Privacy>).transpose()?,
        content_type: dto.post_type.as_deref().map(str::parse::<ContentType>).transpose()?,
        media_urls: dto.media_urls,
    };

    let post = state.post_service.create_post(user.id, req).await?;
    Ok(ApiResponse::created(Message::new("posts.created"), post.into()))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    viewer: Option<CurrentUser>,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<PostDto>> {
    let post = state
        .post_service
        .get_post(id, viewer.map(|viewer| viewer.id))
        .await?;
    Ok(ApiResponse::ok(Message::new("posts.retrieved"), post.into()))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(id): AppPath<i64>,
    AppJson(dto): AppJson<UpdatePostDto>,
) -> AppResult<ApiResponse<PostDto>> {
    dto.validate()?;
    let req = UpdatePostRequest {
        content: dto.content,
        privacy: dto.privacy.as_deref().map(str::parse::<Privacy>).transpose()?,
    };

    let post = state.post_service.update_post(user.id, id, req).await?;
    Ok(ApiResponse::ok(Message::new("posts.updated"), post.into()))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post deleted", body = DeletedDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<DeletedDto>> {
    state.post_service.delete_post(user.id, id).await?;
    Ok(ApiResponse::ok(Message::new("posts.deleted"), DeletedDto { id }))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/like",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Like flipped", body = LikeResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn toggle_like(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<LikeResponseDto>> {
    let outcome = state.post_service.toggle_like(user.id, id).await?;
    Ok(like_response(id, outcome))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}/like",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post liked", body = LikeResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn like_post(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<LikeResponseDto>> {
    let outcome = state.post_service.like_post(user.id, id).await?;
    Ok(like_response(id, outcome))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}/like",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Like removed", body = LikeResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn unlike_post(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<LikeResponseDto>> {
    let outcome = state.post_service.unlike_post(user.id, id).await?;
    Ok(like_response(id, outcome))
}
