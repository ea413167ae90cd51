use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::comment_service::{DEFAULT_COMMENTS_LIMIT, MAX_COMMENTS_LIMIT};
use crate::data::post_repository::Pagination;
use crate::domain::comment::{Comment, CommentThread, CreateCommentRequest};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::envelope::{ApiResponse, Message};
use crate::presentation::extract::{AppJson, AppPath, AppQuery};
use crate::presentation::handlers::{AuthorDto, DeletedDto, PaginationQuery};
use crate::presentation::middleware::auth::CurrentUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateCommentDto {
    #[validate(length(min = 1, max = 2000))]
    pub(crate) content: String,
    #[validate(range(min = 1))]
    pub(crate) parent_comment_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) content: String,
    pub(crate) parent_comment_id: Option<i64>,
    pub(crate) likes_count: i64,
    pub(crate) replies_count: i64,
    pub(crate) is_edited: bool,
    pub(crate) author: AuthorDto,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            content: comment.content,
            parent_comment_id: comment.parent_comment_id,
            likes_count: comment.likes_count,
            replies_count: comment.replies_count,
            is_edited: comment.is_edited,
            author: comment.author.into(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentThreadDto {
    #[serde(flatten)]
    pub(crate) comment: CommentDto,
    /// Oldest first.
    pub(crate) replies: Vec<CommentDto>,
}

impl From<CommentThread> for CommentThreadDto {
    fn from(thread: CommentThread) -> Self {
        Self {
            comment: thread.comment.into(),
            replies: thread.replies.into_iter().map(CommentDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListCommentsResponseDto {
    pub(crate) comments: Vec<CommentThreadDto>,
    pub(crate) limit: u32,
    pub(crate) offset: u32,
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}/comments",
    tag = "comments",
    params(
        ("id" = i64, Path, description = "Post id"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Comment threads, newest first", body = ListCommentsResponseDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_comments(
    State(state): State<AppState>,
    AppPath(post_id): AppPath<i64>,
    AppQuery(query): AppQuery<PaginationQuery>,
) -> AppResult<ApiResponse<ListCommentsResponseDto>> {
    let page = Pagination::clamped(
        query.limit,
        query.offset,
        DEFAULT_COMMENTS_LIMIT,
        MAX_COMMENTS_LIMIT,
    );
    let threads = state
        .comment_service
        .list_comments(post_id, Some(page.limit), Some(page.offset))
        .await?;

    Ok(ApiResponse::ok(
        Message::new("comments.list_retrieved"),
        ListCommentsResponseDto {
            comments: threads.into_iter().map(CommentThreadDto::from).collect(),
            limit: page.limit,
            offset: page.offset,
        },
    ))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/comments",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created", body = CommentDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post or parent comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(post_id): AppPath<i64>,
    AppJson(dto): AppJson<CreateCommentDto>,
) -> AppResult<ApiResponse<CommentDto>> {
    dto.validate()?;
    let req = CreateCommentRequest {
        content: dto.content,
        parent_comment_id: dto.parent_comment_id,
    };

    let comment = state
        .comment_service
        .create_comment(user.id, post_id, req)
        .await?;
    Ok(ApiResponse::created(
        Message::new("comments.created"),
        comment.into(),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment deleted", body = DeletedDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<DeletedDto>> {
    state.comment_service.delete_comment(user.id, id).await?;
    Ok(ApiResponse::ok(Message::new("comments.deleted"), DeletedDto { id }))
}
