use async_trait::async_trait;
use sqlx::PgPool;

use super::message_models::{Message, NewMessage};
use crate::error::Result;

/// Append-only store accessor for messages plus the unread accounting reads
/// and the one permitted mutation, the bulk read-flag flip.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persists a new message with `is_read = false` and returns it with its
    /// store-assigned insertion counter.
    async fn append(&self, message: NewMessage) -> Result<Message>;

    /// One page of a conversation, newest first; callers reverse for display.
    async fn page_newest_first(
        &self,
        conversation_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>>;

    async fn count(&self, conversation_id: &str) -> Result<i64>;

    /// Unread messages addressed to the user within one conversation.
    async fn count_unread(&self, conversation_id: &str, receiver_id: &str) -> Result<i64>;

    /// Unread messages addressed to the user across all conversations.
    async fn total_unread(&self, receiver_id: &str) -> Result<i64>;

    /// Flips every unread message addressed to the user in the conversation.
    /// Returns the number of rows touched; zero on repeat calls.
    async fn mark_read(&self, conversation_id: &str, receiver_id: &str) -> Result<u64>;
}

#[derive(Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn append(&self, message: NewMessage) -> Result<Message> {
        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO messages
                 (id, conversation_id, sender_id, receiver_id, sender_name,
                  sender_avatar, content, message_type, is_read, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE, $9)
             RETURNING *",
        )
        .bind(message.id)
        .bind(&message.conversation_id)
        .bind(&message.sender_id)
        .bind(&message.receiver_id)
        .bind(&message.sender_name)
        .bind(&message.sender_avatar)
        .bind(&message.content)
        .bind(message.message_type)
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn page_newest_first(
        &self,
        conversation_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages
             WHERE conversation_id = $1
             ORDER BY created_at DESC, seq DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(conversation_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn count(&self, conversation_id: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE conversation_id = $1")
                .bind(conversation_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn count_unread(&self, conversation_id: &str, receiver_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages
             WHERE conversation_id = $1 AND receiver_id = $2 AND is_read = FALSE",
        )
        .bind(conversation_id)
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn total_unread(&self, receiver_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages
             WHERE receiver_id = $1 AND is_read = FALSE",
        )
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn mark_read(&self, conversation_id: &str, receiver_id: &str) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE messages
             SET is_read = TRUE
             WHERE conversation_id = $1 AND receiver_id = $2 AND is_read = FALSE",
        )
        .bind(conversation_id)
        .bind(receiver_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
