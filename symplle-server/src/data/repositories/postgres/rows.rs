use chrono::{DateTime, Utc};

use crate::domain::chat::{ChatMessage, ChatRoom};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostStats};
use crate::domain::user::{AuthorSummary, User, display_name};

/// Post columns plus the author join; expects aliases `p` and `u`.
macro_rules! post_columns {
    () => {
        r#"
        p.id, p.author_id, p.content, p.privacy, p.post_type, p.media_urls,
        p.likes_count, p.comments_count, p.shares_count, p.views_count,
        p.is_edited, p.created_at, p.updated_at,
        u.username AS author_username,
        u.first_name AS author_first_name,
        u.last_name AS author_last_name,
        u.avatar_url AS author_avatar_url
        "#
    };
}

/// Comment columns plus the author join; expects aliases `c` and `u`.
macro_rules! comment_columns {
    () => {
        r#"
        c.id, c.post_id, c.author_id, c.content, c.parent_comment_id,
        c.likes_count, c.replies_count, c.is_edited, c.created_at, c.updated_at,
        u.username AS author_username,
        u.first_name AS author_first_name,
        u.last_name AS author_last_name,
        u.avatar_url AS author_avatar_url
        "#
    };
}

/// Room columns with a live participant count; expects alias `r`.
macro_rules! room_columns {
    () => {
        r#"
        r.id, r.name, r.description, r.room_type, r.created_by, r.is_public,
        r.max_participants, r.created_at, r.updated_at,
        (SELECT COUNT(*) FROM chat_participants cp WHERE cp.room_id = r.id)
            AS participants_count
        "#
    };
}

/// Message columns plus the sender join; expects aliases `m` and `u`.
macro_rules! message_columns {
    () => {
        r#"
        m.id, m.room_id, m.sender_id, m.content, m.message_type, m.reply_to_id,
        m.is_edited, m.created_at,
        u.username AS sender_username,
        u.first_name AS sender_first_name,
        u.last_name AS sender_last_name,
        u.avatar_url AS sender_avatar_url
        "#
    };
}

macro_rules! user_columns {
    () => {
        r#"
        id, username, email, first_name, last_name, phone, avatar_url,
        preferred_locale, phone_verified, email_verified, created_at
        "#
    };
}

pub(super) use {comment_columns, message_columns, post_columns, room_columns, user_columns};

#[derive(Debug, sqlx::FromRow)]
pub(super) struct PostRow {
    id: i64,
    author_id: i64,
    content: String,
    privacy: String,
    post_type: String,
    media_urls: Vec<String>,
    likes_count: i64,
    comments_count: i64,
    shares_count: i64,
    views_count: i64,
    is_edited: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_username: String,
    author_first_name: Option<String>,
    author_last_name: Option<String>,
    author_avatar_url: Option<String>,
}

impl TryFrom<PostRow> for Post {
    type Error = DomainError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        Ok(Post {
            id: row.id,
            author: AuthorSummary {
                id: row.author_id,
                name: display_name(
                    &row.author_username,
                    row.author_first_name.as_deref(),
                    row.author_last_name.as_deref(),
                ),
                username: row.author_username,
                avatar_url: row.author_avatar_url,
            },
            content: row.content,
            privacy: row.privacy.parse().map_err(corrupt)?,
            content_type: row.post_type.parse().map_err(corrupt)?,
            media_urls: row.media_urls,
            stats: PostStats {
                likes: row.likes_count,
                comments: row.comments_count,
                shares: row.shares_count,
                views: row.views_count,
            },
            is_edited: row.is_edited,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ScoredPostRow {
    #[sqlx(flatten)]
    pub(super) post: PostRow,
    pub(super) score: Option<f64>,
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: i64,
    content: String,
    parent_comment_id: Option<i64>,
    likes_count: i64,
    replies_count: i64,
    is_edited: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_username: String,
    author_first_name: Option<String>,
    author_last_name: Option<String>,
    author_avatar_url: Option<String>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            post_id: row.post_id,
            author: AuthorSummary {
                id: row.author_id,
                name: display_name(
                    &row.author_username,
                    row.author_first_name.as_deref(),
                    row.author_last_name.as_deref(),
                ),
                username: row.author_username,
                avatar_url: row.author_avatar_url,
            },
            content: row.content,
            parent_comment_id: row.parent_comment_id,
            likes_count: row.likes_count,
            replies_count: row.replies_count,
            is_edited: row.is_edited,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ChatRoomRow {
    id: i64,
    name: Option<String>,
    description: Option<String>,
    room_type: String,
    created_by: i64,
    is_public: bool,
    max_participants: i64,
    participants_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ChatRoomRow> for ChatRoom {
    type Error = DomainError;

    fn try_from(row: ChatRoomRow) -> Result<Self, Self::Error> {
        Ok(ChatRoom {
            id: row.id,
            name: row.name,
            description: row.description,
            room_type: row.room_type.parse().map_err(corrupt)?,
            created_by: row.created_by,
            is_public: row.is_public,
            max_participants: row.max_participants,
            participants_count: row.participants_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ChatMessageRow {
    id: i64,
    room_id: i64,
    sender_id: i64,
    content: String,
    message_type: String,
    reply_to_id: Option<i64>,
    is_edited: bool,
    created_at: DateTime<Utc>,
    sender_username: String,
    sender_first_name: Option<String>,
    sender_last_name: Option<String>,
    sender_avatar_url: Option<String>,
}

impl TryFrom<ChatMessageRow> for ChatMessage {
    type Error = DomainError;

    fn try_from(row: ChatMessageRow) -> Result<Self, Self::Error> {
        Ok(ChatMessage {
            id: row.id,
            room_id: row.room_id,
            sender: AuthorSummary {
                id: row.sender_id,
                name: display_name(
                    &row.sender_username,
                    row.sender_first_name.as_deref(),
                    row.sender_last_name.as_deref(),
                ),
                username: row.sender_username,
                avatar_url: row.sender_avatar_url,
            },
            content: row.content,
            message_type: row.message_type.parse().map_err(corrupt)?,
            reply_to_id: row.reply_to_id,
            is_edited: row.is_edited,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct UserRow {
    id: i64,
    username: String,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    avatar_url: Option<String>,
    preferred_locale: Option<String>,
    phone_verified: bool,
    email_verified: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let user = User::new(row.id, row.username, row.email, row.created_at).map_err(corrupt)?;
        Ok(User {
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            avatar_url: row.avatar_url,
            preferred_locale: row.preferred_locale,
            phone_verified: row.phone_verified,
            email_verified: row.email_verified,
            ..user
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct UserCredentialsRow {
    #[sqlx(flatten)]
    pub(super) user: UserRow,
    pub(super) password_hash: String,
}

fn corrupt(err: DomainError) -> DomainError {
    DomainError::Unexpected(format!("corrupt row: {err}"))
}
