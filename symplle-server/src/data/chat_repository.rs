use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use super::post_repository::Pagination;
use crate::domain::chat::{ChatMessage, ChatRoom, MessageType, RoomType};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewRoom {
    pub(crate) creator_id: i64,
    pub(crate) room_type: RoomType,
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) is_public: bool,
    pub(crate) max_participants: i64,
    /// Everyone but the creator, who joins as admin.
    pub(crate) participant_ids: Vec<i64>,
}

#[derive(Debug, Clone)]
pub(crate) struct NewMessage {
    pub(crate) room_id: i64,
    pub(crate) sender_id: i64,
    pub(crate) content: String,
    pub(crate) message_type: MessageType,
    pub(crate) reply_to_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub(crate) enum JoinOutcome {
    Joined(ChatRoom),
    AlreadyMember(ChatRoom),
    RoomFull,
}

#[async_trait]
pub(crate) trait ChatRepository: Send + Sync {
    async fn existing_user_ids(&self, ids: &[i64]) -> Result<HashSet<i64>, DomainError>;
    /// Inserts the room and its participants in one transaction.
    async fn create_room(&self, input: NewRoom) -> Result<ChatRoom, DomainError>;
    async fn find_room(&self, id: i64) -> Result<Option<ChatRoom>, DomainError>;
    async fn find_direct_room(&self, user_a: i64, user_b: i64) -> Result<Option<ChatRoom>, DomainError>;
    /// Rooms the user takes part in, most recently active first.
    async fn list_rooms_for(&self, user_id: i64, pagination: Pagination) -> Result<Vec<ChatRoom>, DomainError>;
    async fn count_rooms_for(&self, user_id: i64) -> Result<i64, DomainError>;
    async fn is_participant(&self, room_id: i64, user_id: i64) -> Result<bool, DomainError>;
    /// Adds the user unless the room is already at capacity. The capacity
    /// check and the insert happen under one row lock.
    async fn add_participant(&self, room_id: i64, user_id: i64) -> Result<Option<JoinOutcome>, DomainError>;
    /// Inserts the message and bumps the room's `updated_at`.
    async fn create_message(&self, input: NewMessage) -> Result<ChatMessage, DomainError>;
    async fn find_message(&self, id: i64) -> Result<Option<ChatMessage>, DomainError>;
    /// Newest first.
    async fn list_messages(&self, room_id: i64, pagination: Pagination) -> Result<Vec<ChatMessage>, DomainError>;
    async fn count_messages(&self, room_id: i64) -> Result<i64, DomainError>;
}

#[async_trait]
impl<T: ChatRepository + ?Sized> ChatRepository for Arc<T> {
    async fn existing_user_ids(&self, ids: &[i64]) -> Result<HashSet<i64>, DomainError> {
        (**self).existing_user_ids(ids).await
    }

    async fn create_room(&self, input: NewRoom) -> Result<ChatRoom, DomainError> {
        (**self).create_room(input).await
    }

    async fn find_room(&self, id: i64) -> Result<Option<ChatRoom>, DomainError> {
        (**self).find_room(id).await
    }

    async fn find_direct_room(&self, user_a: i64, user_b: i64) -> Result<Option<ChatRoom>, DomainError> {
        (**self).find_direct_room(user_a, user_b).await
    }

    async fn list_rooms_for(&self, user_id: i64, pagination: Pagination) -> Result<Vec<ChatRoom>, DomainError> {
        (**self).list_rooms_for(user_id, pagination).await
    }

    async fn count_rooms_for(&self, user_id: i64) -> Result<i64, DomainError> {
        (**self).count_rooms_for(user_id).await
    }

    async fn is_participant(&self, room_id: i64, user_id: i64) -> Result<bool, DomainError> {
        (**self).is_participant(room_id, user_id).await
    }

    async fn add_participant(&self, room_id: i64, user_id: i64) -> Result<Option<JoinOutcome>, DomainError> {
        (**self).add_participant(room_id, user_id).await
    }

    async fn create_message(&self, input: NewMessage) -> Result<ChatMessage, DomainError> {
        (**self).create_message(input).await
    }

    async fn find_message(&self, id: i64) -> Result<Option<ChatMessage>, DomainError> {
        (**self).find_message(id).await
    }

    async fn list_messages(&self, room_id: i64, pagination: Pagination) -> Result<Vec<ChatMessage>, DomainError> {
        (**self).list_messages(room_id, pagination).await
    }

    async fn count_messages(&self, room_id: i64) -> Result<i64, DomainError> {
        (**self).count_messages(room_id).await
    }
}
