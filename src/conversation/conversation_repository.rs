use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::conversation_models::Conversation;
use crate::error::Result;

/// Store accessor for conversation summary records. One row per unordered
/// participant pair; uniqueness is the store's job, not the caller's.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Atomic insert-if-absent keyed on the derived id. Returns the inserted
    /// row, or `None` when another first contact already won.
    async fn insert_if_absent(&self, conversation: &Conversation) -> Result<Option<Conversation>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Conversation>>;

    /// All conversations the user participates in, newest activity first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>>;

    /// Single-row atomic set of the denormalized last-message projection.
    async fn set_last_message(&self, id: &str, content: &str, at: DateTime<Utc>) -> Result<()>;
}

#[derive(Clone)]
pub struct PgConversationStore {
    pool: PgPool,
}

impl PgConversationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn insert_if_absent(&self, conversation: &Conversation) -> Result<Option<Conversation>> {
        let inserted = sqlx::query_as::<_, Conversation>(
            "INSERT INTO conversations
                 (id, participant_a, participant_b, topic_id, topic_title,
                  last_message, last_message_time, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (id) DO NOTHING
             RETURNING *",
        )
        .bind(&conversation.id)
        .bind(&conversation.participant_a)
        .bind(&conversation.participant_b)
        .bind(&conversation.topic_id)
        .bind(&conversation.topic_title)
        .bind(&conversation.last_message)
        .bind(conversation.last_message_time)
        .bind(conversation.created_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Conversation>> {
        let conversation =
            sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(conversation)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let conversations = sqlx::query_as::<_, Conversation>(
            "SELECT * FROM conversations
             WHERE participant_a = $1 OR participant_b = $1
             ORDER BY last_message_time DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(conversations)
    }

    async fn set_last_message(&self, id: &str, content: &str, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "UPDATE conversations
             SET last_message = $2, last_message_time = $3
             WHERE id = $1",
        )
        .bind(id)
        .bind(content)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
