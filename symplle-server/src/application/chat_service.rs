use tracing::info;

use crate::data::chat_repository::{ChatRepository, JoinOutcome, NewMessage, NewRoom};
use crate::data::post_repository::Pagination;
use crate::domain::chat::{
    ChatMessage, ChatRoom, CreateRoomRequest, MAX_ROOM_PARTICIPANTS, RoomType, SendMessageRequest,
};
use crate::domain::error::DomainError;

pub(crate) const DEFAULT_ROOMS_LIMIT: u32 = 20;
pub(crate) const MAX_ROOMS_LIMIT: u32 = 50;
pub(crate) const DEFAULT_MESSAGES_PER_PAGE: u32 = 50;
pub(crate) const MAX_MESSAGES_PER_PAGE: u32 = 100;

#[derive(Debug, Clone)]
pub(crate) struct RoomPage {
    pub(crate) rooms: Vec<ChatRoom>,
    pub(crate) total: i64,
    pub(crate) pagination: Pagination,
}

#[derive(Debug, Clone)]
pub(crate) struct MessagePage {
    pub(crate) messages: Vec<ChatMessage>,
    pub(crate) page: u32,
    pub(crate) per_page: u32,
    pub(crate) total: i64,
}

impl MessagePage {
    pub(crate) fn pages(&self) -> i64 {
        let per_page = i64::from(self.per_page);
        (self.total + per_page - 1) / per_page
    }
}

pub(crate) struct ChatService<R: ChatRepository> {
    repo: R,
}

impl<R: ChatRepository> ChatService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a room with the creator as admin. Asking for a direct room
    /// with someone you already have one with returns the existing room.
    pub(crate) async fn create_room(
        &self,
        creator_id: i64,
        req: CreateRoomRequest,
    ) -> Result<ChatRoom, DomainError> {
        let req = req.validate(creator_id)?;

        let existing = self.repo.existing_user_ids(&req.participant_ids).await?;
        if let Some(missing) = req.participant_ids.iter().find(|id| !existing.contains(id)) {
            return Err(DomainError::NotFound(format!("user id: {missing}")));
        }

        let max_participants = match req.room_type {
            RoomType::Direct => {
                let Some(&peer) = req.participant_ids.first() else {
                    return Err(DomainError::Validation {
                        field: "participant_ids",
                        message: "direct rooms need exactly one other participant",
                    });
                };
                if let Some(room) = self.repo.find_direct_room(creator_id, peer).await? {
                    info!(room_id = room.id, "direct room reused");
                    return Ok(room);
                }
                2
            }
            RoomType::Group | RoomType::Channel => MAX_ROOM_PARTICIPANTS,
        };

        let room = self
            .repo
            .create_room(NewRoom {
                creator_id,
                room_type: req.room_type,
                name: req.name,
                description: req.description,
                is_public: req.is_public.unwrap_or(false),
                max_participants,
                participant_ids: req.participant_ids,
            })
            .await?;
        info!(room_id = room.id, room_type = %room.room_type, "chat room created");
        Ok(room)
    }

    pub(crate) async fn list_rooms(
        &self,
        user_id: i64,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<RoomPage, DomainError> {
        let pagination = Pagination::clamped(limit, offset, DEFAULT_ROOMS_LIMIT, MAX_ROOMS_LIMIT);
        let rooms = self.repo.list_rooms_for(user_id, pagination).await?;
        let total = self.repo.count_rooms_for(user_id).await?;
        Ok(RoomPage {
            rooms,
            total,
            pagination,
        })
    }

    pub(crate) async fn get_room(&self, user_id: i64, room_id: i64) -> Result<ChatRoom, DomainError> {
        self.readable_room(user_id, room_id).await
    }

    /// Joining a room twice is a no-op.
    pub(crate) async fn join_room(&self, user_id: i64, room_id: i64) -> Result<ChatRoom, DomainError> {
        self.readable_room(user_id, room_id).await?;

        match self.repo.add_participant(room_id, user_id).await? {
            Some(JoinOutcome::Joined(room)) => {
                info!(room_id, user_id, "joined chat room");
                Ok(room)
            }
            Some(JoinOutcome::AlreadyMember(room)) => Ok(room),
            Some(JoinOutcome::RoomFull) => Err(DomainError::Validation {
                field: "room",
                message: "has no free seats",
            }),
            None => Err(room_not_found(room_id)),
        }
    }

    pub(crate) async fn list_messages(
        &self,
        user_id: i64,
        room_id: i64,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<MessagePage, DomainError> {
        self.readable_room(user_id, room_id).await?;

        let page = page.unwrap_or(1).max(1);
        let per_page = per_page
            .unwrap_or(DEFAULT_MESSAGES_PER_PAGE)
            .clamp(1, MAX_MESSAGES_PER_PAGE);
        let pagination = Pagination {
            limit: per_page,
            offset: (page - 1).saturating_mul(per_page),
        };

        let messages = self.repo.list_messages(room_id, pagination).await?;
        let total = self.repo.count_messages(room_id).await?;
        Ok(MessagePage {
            messages,
            page,
            per_page,
            total,
        })
    }

    /// Only participants may post. Replies must point into the same room.
    pub(crate) async fn send_message(
        &self,
        sender_id: i64,
        room_id: i64,
        req: SendMessageRequest,
    ) -> Result<ChatMessage, DomainError> {
        let req = req.validate()?;
        let room = self.readable_room(sender_id, room_id).await?;
        if !self.repo.is_participant(room.id, sender_id).await? {
            return Err(DomainError::Forbidden);
        }

        if let Some(reply_to) = req.reply_to_id {
            self.repo
                .find_message(reply_to)
                .await?
                .filter(|message| message.room_id == room.id)
                .ok_or_else(|| DomainError::NotFound(format!("message id: {reply_to}")))?;
        }

        let message = self
            .repo
            .create_message(NewMessage {
                room_id: room.id,
                sender_id,
                content: req.content,
                message_type: req.message_type,
                reply_to_id: req.reply_to_id,
            })
            .await?;
        info!(message_id = message.id, room_id, "chat message sent");
        Ok(message)
    }

    /// Public rooms are readable by anyone signed in; private rooms only by
    /// their participants and look missing to everyone else.
    async fn readable_room(&self, user_id: i64, room_id: i64) -> Result<ChatRoom, DomainError> {
        let room = self
            .repo
            .find_room(room_id)
            .await?
            .ok_or_else(|| room_not_found(room_id))?;
        if room.is_public || self.repo.is_participant(room.id, user_id).await? {
            Ok(room)
        } else {
            Err(room_not_found(room_id))
        }
    }
}

fn room_not_found(room_id: i64) -> DomainError {
    DomainError::NotFound(format!("chat room id: {room_id}"))
}
