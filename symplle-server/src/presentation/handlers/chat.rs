use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::chat::{
    ChatMessage, ChatRoom, CreateRoomRequest, MessageType, RoomType, SendMessageRequest,
};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::envelope::{ApiResponse, Message};
use crate::presentation::extract::{AppJson, AppPath, AppQuery};
use crate::presentation::handlers::{AuthorDto, PaginationQuery};
use crate::presentation::middleware::auth::CurrentUser;

const CHAT_API_VERSION: &str = "1.0.0";
const CHAT_FEATURES: [&str; 4] = ["rooms", "direct_messages", "replies", "pagination"];

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateRoomDto {
    /// `direct`, `group` or `channel`; defaults to `group`.
    pub(crate) room_type: Option<String>,
    #[validate(length(max = 255))]
    pub(crate) name: Option<String>,
    #[validate(length(max = 1000))]
    pub(crate) description: Option<String>,
    /// Defaults to `true` for channels and `false` otherwise.
    pub(crate) is_public: Option<bool>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub(crate) participant_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct SendMessageDto {
    #[validate(length(min = 1, max = 5000))]
    pub(crate) content: String,
    /// `text`, `image` or `file`; defaults to `text`.
    pub(crate) message_type: Option<String>,
    #[validate(range(min = 1))]
    pub(crate) reply_to_id: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct MessagesQuery {
    /// 1-based; defaults to 1.
    pub(crate) page: Option<u32>,
    /// Clamped to 1..100; defaults to 50.
    pub(crate) per_page: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ChatInfoDto {
    pub(crate) version: String,
    pub(crate) features: Vec<String>,
    pub(crate) room_types: Vec<String>,
    pub(crate) message_types: Vec<String>,
    pub(crate) websocket: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ChatRoomDto {
    pub(crate) id: i64,
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) room_type: String,
    pub(crate) created_by: i64,
    pub(crate) is_public: bool,
    pub(crate) max_participants: i64,
    pub(crate) participants_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<ChatRoom> for ChatRoomDto {
    fn from(room: ChatRoom) -> Self {
        Self {
            id: room.id,
            name: room.name,
            description: room.description,
            room_type: room.room_type.to_string(),
            created_by: room.created_by,
            is_public: room.is_public,
            max_participants: room.max_participants,
            participants_count: room.participants_count,
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ChatMessageDto {
    pub(crate) id: i64,
    pub(crate) room_id: i64,
    pub(crate) content: String,
    pub(crate) message_type: String,
    pub(crate) reply_to_id: Option<i64>,
    pub(crate) is_edited: bool,
    pub(crate) sender: AuthorDto,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<ChatMessage> for ChatMessageDto {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id,
            room_id: message.room_id,
            content: message.content,
            message_type: message.message_type.to_string(),
            reply_to_id: message.reply_to_id,
            is_edited: message.is_edited,
            sender: message.sender.into(),
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListRoomsResponseDto {
    pub(crate) rooms: Vec<ChatRoomDto>,
    pub(crate) total: i64,
    pub(crate) limit: u32,
    pub(crate) offset: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct MessagePaginationDto {
    pub(crate) page: u32,
    pub(crate) per_page: u32,
    pub(crate) total: i64,
    pub(crate) pages: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListMessagesResponseDto {
    /// Newest first.
    pub(crate) messages: Vec<ChatMessageDto>,
    pub(crate) pagination: MessagePaginationDto,
    pub(crate) room_id: i64,
}

#[utoipa::path(
    get,
    path = "/api/chat/info",
    tag = "chat",
    responses(
        (status = 200, description = "Chat capabilities", body = ChatInfoDto)
    )
)]
pub(crate) async fn chat_info() -> ApiResponse<ChatInfoDto> {
    ApiResponse::ok(
        Message::new("chat.info_retrieved"),
        ChatInfoDto {
            version: CHAT_API_VERSION.to_string(),
            features: CHAT_FEATURES.map(str::to_string).to_vec(),
            room_types: RoomType::ALL.map(|kind| kind.to_string()).to_vec(),
            message_types: MessageType::ALL.map(|kind| kind.to_string()).to_vec(),
            websocket: false,
        },
    )
}

#[utoipa::path(
    get,
    path = "/api/chat/rooms",
    tag = "chat",
    security(
        ("bearer_auth" = [])
    ),
    params(PaginationQuery),
    responses(
        (status = 200, description = "Rooms the caller belongs to, most recently active first", body = ListRoomsResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_rooms(
    State(state): State<AppState>,
    user: CurrentUser,
    AppQuery(query): AppQuery<PaginationQuery>,
) -> AppResult<ApiResponse<ListRoomsResponseDto>> {
    let page = state
        .chat_service
        .list_rooms(user.id, query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(
        Message::new("chat.rooms_retrieved").arg("count", page.rooms.len().to_string()),
        ListRoomsResponseDto {
            rooms: page.rooms.into_iter().map(ChatRoomDto::from).collect(),
            total: page.total,
            limit: page.pagination.limit,
            offset: page.pagination.offset,
        },
    ))
}

#[utoipa::path(
    post,
    path = "/api/chat/rooms",
    tag = "chat",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateRoomDto,
    responses(
        (status = 201, description = "Room created, or the existing direct room", body = ChatRoomDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Participant not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_room(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(dto): AppJson<CreateRoomDto>,
) -> AppResult<ApiResponse<ChatRoomDto>> {
    dto.validate()?;
    let req = CreateRoomRequest {
        room_type: dto
            .room_type
            .as_deref()
            .map(str::parse::<RoomType>)
            .transpose()?
            .unwrap_or_default(),
        name: dto.name,
        description: dto.description,
        is_public: dto.is_public,
        participant_ids: dto.participant_ids,
    };

    let room = state.chat_service.create_room(user.id, req).await?;
    Ok(ApiResponse::created(
        Message::new("chat.room_created"),
        room.into(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/chat/rooms/{id}",
    tag = "chat",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Room id")
    ),
    responses(
        (status = 200, description = "Room", body = ChatRoomDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Room not found or private"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_room(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(room_id): AppPath<i64>,
) -> AppResult<ApiResponse<ChatRoomDto>> {
    let room = state.chat_service.get_room(user.id, room_id).await?;
    Ok(ApiResponse::ok(Message::new("chat.room_retrieved"), room.into()))
}

#[utoipa::path(
    post,
    path = "/api/chat/rooms/{id}/join",
    tag = "chat",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Room id")
    ),
    responses(
        (status = 200, description = "Joined, or already a participant", body = ChatRoomDto),
        (status = 400, description = "Room is full"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Room not found or private"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn join_room(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(room_id): AppPath<i64>,
) -> AppResult<ApiResponse<ChatRoomDto>> {
    let room = state.chat_service.join_room(user.id, room_id).await?;
    Ok(ApiResponse::ok(Message::new("chat.room_joined"), room.into()))
}

#[utoipa::path(
    get,
    path = "/api/chat/rooms/{id}/messages",
    tag = "chat",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Room id"),
        MessagesQuery
    ),
    responses(
        (status = 200, description = "Messages, newest first", body = ListMessagesResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Room not found or private"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_messages(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(room_id): AppPath<i64>,
    AppQuery(query): AppQuery<MessagesQuery>,
) -> AppResult<ApiResponse<ListMessagesResponseDto>> {
    let page = state
        .chat_service
        .list_messages(user.id, room_id, query.page, query.per_page)
        .await?;
    let pages = page.pages();
    Ok(ApiResponse::ok(
        Message::new("chat.messages_retrieved").arg("count", page.messages.len().to_string()),
        ListMessagesResponseDto {
            messages: page.messages.into_iter().map(ChatMessageDto::from).collect(),
            pagination: MessagePaginationDto {
                page: page.page,
                per_page: page.per_page,
                total: page.total,
                pages,
            },
            room_id,
        },
    ))
}

#[utoipa::path(
    post,
    path = "/api/chat/rooms/{id}/messages",
    tag = "chat",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Room id")
    ),
    request_body = SendMessageDto,
    responses(
        (status = 201, description = "Message sent", body = ChatMessageDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Room or replied message not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn send_message(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(room_id): AppPath<i64>,
    AppJson(dto): AppJson<SendMessageDto>,
) -> AppResult<ApiResponse<ChatMessageDto>> {
    dto.validate()?;
    let req = SendMessageRequest {
        content: dto.content,
        message_type: dto
            .message_type
            .as_deref()
            .map(str::parse::<MessageType>)
            .transpose()?
            .unwrap_or_default(),
        reply_to_id: dto.reply_to_id,
    };

    let message = state
        .chat_service
        .send_message(user.id, room_id, req)
        .await?;
    Ok(ApiResponse::created(
        Message::new("chat.message_sent"),
        message.into(),
    ))
}
