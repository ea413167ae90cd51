use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::rows::{ChatMessageRow, ChatRoomRow, message_columns, room_columns};
use crate::data::chat_repository::{ChatRepository, JoinOutcome, NewMessage, NewRoom};
use crate::data::post_repository::Pagination;
use crate::domain::chat::{ChatMessage, ChatRoom};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresChatRepository {
    pool: PgPool,
}

impl PostgresChatRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatRepository for PostgresChatRepository {
    async fn existing_user_ids(&self, ids: &[i64]) -> Result<HashSet<i64>, DomainError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let found: Vec<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(map_chat_db_error)?;
        Ok(found.into_iter().collect())
    }

    async fn create_room(&self, input: NewRoom) -> Result<ChatRoom, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_chat_db_error)?;

        let room_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO chat_rooms
                (name, description, room_type, created_by, is_public, max_participants)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.room_type.as_str())
        .bind(input.creator_id)
        .bind(input.is_public)
        .bind(input.max_participants)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_chat_db_error)?;

        sqlx::query(
            r#"
            INSERT INTO chat_participants (room_id, user_id, is_admin)
            SELECT $1, member, member = $2
            FROM UNNEST(array_prepend($2::BIGINT, $3::BIGINT[])) AS member
            "#,
        )
        .bind(room_id)
        .bind(input.creator_id)
        .bind(&input.participant_ids)
        .execute(&mut *tx)
        .await
        .map_err(map_chat_db_error)?;

        let room = fetch_room(&mut tx, room_id).await?;
        tx.commit().await.map_err(map_chat_db_error)?;
        Ok(room)
    }

    async fn find_room(&self, id: i64) -> Result<Option<ChatRoom>, DomainError> {
        let row = sqlx::query_as::<_, ChatRoomRow>(concat!(
            "SELECT ",
            room_columns!(),
            " FROM chat_rooms r WHERE r.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_chat_db_error)?;

        row.map(ChatRoom::try_from).transpose()
    }

    async fn find_direct_room(&self, user_a: i64, user_b: i64) -> Result<Option<ChatRoom>, DomainError> {
        let row = sqlx::query_as::<_, ChatRoomRow>(concat!(
            "SELECT ",
            room_columns!(),
            r#"
            FROM chat_rooms r
            WHERE r.room_type = 'direct'
              AND EXISTS (SELECT 1 FROM chat_participants WHERE room_id = r.id AND user_id = $1)
              AND EXISTS (SELECT 1 FROM chat_participants WHERE room_id = r.id AND user_id = $2)
            ORDER BY r.id
            LIMIT 1
            "#
        ))
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_chat_db_error)?;

        row.map(ChatRoom::try_from).transpose()
    }

    async fn list_rooms_for(&self, user_id: i64, pagination: Pagination) -> Result<Vec<ChatRoom>, DomainError> {
        let rows = sqlx::query_as::<_, ChatRoomRow>(concat!(
            "SELECT ",
            room_columns!(),
            r#"
            FROM chat_rooms r
            JOIN chat_participants me ON me.room_id = r.id AND me.user_id = $1
            ORDER BY r.updated_at DESC, r.id DESC
            LIMIT $2
            OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(i64::from(pagination.limit))
        .bind(i64::from(pagination.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(map_chat_db_error)?;

        rows.into_iter().map(ChatRoom::try_from).collect()
    }

    async fn count_rooms_for(&self, user_id: i64) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM chat_participants WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_chat_db_error)
    }

    async fn is_participant(&self, room_id: i64, user_id: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM chat_participants WHERE room_id = $1 AND user_id = $2)",
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_chat_db_error)
    }

    async fn add_participant(&self, room_id: i64, user_id: i64) -> Result<Option<JoinOutcome>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_chat_db_error)?;

        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM chat_rooms WHERE id = $1 FOR UPDATE")
                .bind(room_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_chat_db_error)?;
        if locked.is_none() {
            return Ok(None);
        }

        let room = fetch_room(&mut tx, room_id).await?;
        let already: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM chat_participants WHERE room_id = $1 AND user_id = $2)",
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_chat_db_error)?;
        if already {
            return Ok(Some(JoinOutcome::AlreadyMember(room)));
        }
        if room.is_full() {
            return Ok(Some(JoinOutcome::RoomFull));
        }

        sqlx::query("INSERT INTO chat_participants (room_id, user_id) VALUES ($1, $2)")
            .bind(room_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_chat_db_error)?;

        let room = fetch_room(&mut tx, room_id).await?;
        tx.commit().await.map_err(map_chat_db_error)?;
        Ok(Some(JoinOutcome::Joined(room)))
    }

    async fn create_message(&self, input: NewMessage) -> Result<ChatMessage, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_chat_db_error)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO chat_messages (room_id, sender_id, content, message_type, reply_to_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.room_id)
        .bind(input.sender_id)
        .bind(&input.content)
        .bind(input.message_type.as_str())
        .bind(input.reply_to_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_chat_db_error)?;

        sqlx::query("UPDATE chat_rooms SET updated_at = NOW() WHERE id = $1")
            .bind(input.room_id)
            .execute(&mut *tx)
            .await
            .map_err(map_chat_db_error)?;

        let row = sqlx::query_as::<_, ChatMessageRow>(concat!(
            "SELECT ",
            message_columns!(),
            r#"
            FROM chat_messages m
            JOIN users u ON u.id = m.sender_id
            WHERE m.id = $1
            "#
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_chat_db_error)?;

        tx.commit().await.map_err(map_chat_db_error)?;
        ChatMessage::try_from(row)
    }

    async fn find_message(&self, id: i64) -> Result<Option<ChatMessage>, DomainError> {
        let row = sqlx::query_as::<_, ChatMessageRow>(concat!(
            "SELECT ",
            message_columns!(),
            r#"
            FROM chat_messages m
            JOIN users u ON u.id = m.sender_id
            WHERE m.id = $1 AND m.is_deleted = FALSE
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_chat_db_error)?;

        row.map(ChatMessage::try_from).transpose()
    }

    async fn list_messages(&self, room_id: i64, pagination: Pagination) -> Result<Vec<ChatMessage>, DomainError> {
        let rows = sqlx::query_as::<_, ChatMessageRow>(concat!(
            "SELECT ",
            message_columns!(),
            r#"
            FROM chat_messages m
            JOIN users u ON u.id = m.sender_id
            WHERE m.room_id = $1 AND m.is_deleted = FALSE
            ORDER BY m.created_at DESC, m.id DESC
            LIMIT $2
            OFFSET $3
            "#
        ))
        .bind(room_id)
        .bind(i64::from(pagination.limit))
        .bind(i64::from(pagination.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(map_chat_db_error)?;

        rows.into_iter().map(ChatMessage::try_from).collect()
    }

    async fn count_messages(&self, room_id: i64) -> Result<i64, DomainError> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM chat_messages WHERE room_id = $1 AND is_deleted = FALSE",
        )
        .bind(room_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_chat_db_error)
    }
}

async fn fetch_room(tx: &mut Transaction<'_, Postgres>, room_id: i64) -> Result<ChatRoom, DomainError> {
    let row = sqlx::query_as::<_, ChatRoomRow>(concat!(
        "SELECT ",
        room_columns!(),
        " FROM chat_rooms r WHERE r.id = $1"
    ))
    .bind(room_id)
    .fetch_one(&mut **tx)
    .await
    .map_err(map_chat_db_error)?;

    ChatRoom::try_from(row)
}

fn map_chat_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23503") => return DomainError::NotFound("chat room or user".to_string()),
            Some("23505") => return DomainError::AlreadyExists("chat participant".to_string()),
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}
