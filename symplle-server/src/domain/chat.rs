use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::error::DomainError;
use super::user::AuthorSummary;

pub(crate) const MAX_ROOM_PARTICIPANTS: i64 = 100;
const MAX_ROOM_NAME_CHARS: usize = 255;
const MAX_ROOM_DESCRIPTION_CHARS: usize = 1000;
const MAX_MESSAGE_CHARS: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum RoomType {
    /// One-to-one conversation.
    Direct,
    #[default]
    Group,
    /// Named room anyone may join when public.
    Channel,
}

impl RoomType {
    pub(crate) const ALL: [RoomType; 3] = [RoomType::Direct, RoomType::Group, RoomType::Channel];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            RoomType::Direct => "direct",
            RoomType::Group => "group",
            RoomType::Channel => "channel",
        }
    }
}

impl FromStr for RoomType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(RoomType::Direct),
            "group" => Ok(RoomType::Group),
            "channel" => Ok(RoomType::Channel),
            _ => Err(DomainError::Validation {
                field: "room_type",
                message: "must be one of direct, group, channel",
            }),
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum MessageType {
    #[default]
    Text,
    Image,
    File,
    /// Written by the server only.
    System,
}

impl MessageType {
    pub(crate) const ALL: [MessageType; 4] = [
        MessageType::Text,
        MessageType::Image,
        MessageType::File,
        MessageType::System,
    ];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::File => "file",
            MessageType::System => "system",
        }
    }
}

impl FromStr for MessageType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(MessageType::Text),
            "image" => Ok(MessageType::Image),
            "file" => Ok(MessageType::File),
            "system" => Ok(MessageType::System),
            _ => Err(DomainError::Validation {
                field: "message_type",
                message: "must be one of text, image, file",
            }),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ChatRoom {
    pub(crate) id: i64,
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) room_type: RoomType,
    pub(crate) created_by: i64,
    pub(crate) is_public: bool,
    pub(crate) max_participants: i64,
    pub(crate) participants_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    /// Bumped on every new message.
    pub(crate) updated_at: DateTime<Utc>,
}

impl ChatRoom {
    pub(crate) fn is_full(&self) -> bool {
        self.participants_count >= self.max_participants
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ChatMessage {
    pub(crate) id: i64,
    pub(crate) room_id: i64,
    pub(crate) sender: AuthorSummary,
    pub(crate) content: String,
    pub(crate) message_type: MessageType,
    pub(crate) reply_to_id: Option<i64>,
    pub(crate) is_edited: bool,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CreateRoomRequest {
    pub(crate) room_type: RoomType,
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) is_public: Option<bool>,
    pub(crate) participant_ids: Vec<i64>,
}

impl CreateRoomRequest {
    /// Normalizes the request for `creator_id`: other participants are
    /// deduplicated and the creator is dropped from them. Direct rooms need
    /// exactly one other participant, carry no name and are never public.
    pub(crate) fn validate(self, creator_id: i64) -> Result<Self, DomainError> {
        let mut participant_ids = Vec::with_capacity(self.participant_ids.len());
        for id in self.participant_ids {
            if id <= 0 {
                return Err(DomainError::Validation {
                    field: "participant_ids",
                    message: "must contain ids > 0",
                });
            }
            if id != creator_id && !participant_ids.contains(&id) {
                participant_ids.push(id);
            }
        }
        if participant_ids.len() as i64 + 1 > MAX_ROOM_PARTICIPANTS {
            return Err(DomainError::Validation {
                field: "participant_ids",
                message: "must leave room for the creator within 100 participants",
            });
        }

        let description = trimmed(self.description);
        if description
            .as_ref()
            .is_some_and(|text| text.chars().count() > MAX_ROOM_DESCRIPTION_CHARS)
        {
            return Err(DomainError::Validation {
                field: "description",
                message: "must be at most 1000 chars",
            });
        }

        if self.room_type == RoomType::Direct {
            if participant_ids.len() != 1 {
                return Err(DomainError::Validation {
                    field: "participant_ids",
                    message: "direct rooms need exactly one other participant",
                });
            }
            return Ok(Self {
                room_type: RoomType::Direct,
                name: None,
                description,
                is_public: Some(false),
                participant_ids,
            });
        }

        let Some(name) = trimmed(self.name) else {
            return Err(DomainError::Validation {
                field: "name",
                message: "is required for group and channel rooms",
            });
        };
        if name.chars().count() > MAX_ROOM_NAME_CHARS {
            return Err(DomainError::Validation {
                field: "name",
                message: "must be at most 255 chars",
            });
        }

        Ok(Self {
            is_public: Some(
                self.is_public
                    .unwrap_or(self.room_type == RoomType::Channel),
            ),
            room_type: self.room_type,
            name: Some(name),
            description,
            participant_ids,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SendMessageRequest {
    pub(crate) content: String,
    pub(crate) message_type: MessageType,
    pub(crate) reply_to_id: Option<i64>,
}

impl SendMessageRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let content = self.content.trim();
        if content.is_empty() || content.chars().count() > MAX_MESSAGE_CHARS {
            return Err(DomainError::Validation {
                field: "content",
                message: "must be 1..5000 chars",
            });
        }
        if self.message_type == MessageType::System {
            return Err(DomainError::Validation {
                field: "message_type",
                message: "must be one of text, image, file",
            });
        }
        if let Some(reply_to) = self.reply_to_id
            && reply_to <= 0
        {
            return Err(DomainError::Validation {
                field: "reply_to_id",
                message: "must be > 0",
            });
        }
        Ok(Self {
            content: content.to_string(),
            ..self
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
