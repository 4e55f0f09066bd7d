use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
}

impl Default for MessageType {
    fn default() -> Self {
        MessageType::Text
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageType::Text => write!(f, "text"),
            MessageType::Image => write!(f, "image"),
        }
    }
}

/// One unit of communication. Immutable after insert except for `is_read`,
/// which only the receiver's mark-read path ever flips.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    /// Store-assigned insertion counter; breaks ordering ties between
    /// messages sharing a `created_at`.
    pub seq: i64,
    pub conversation_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub sender_name: String,
    pub sender_avatar: String,
    pub content: String,
    pub message_type: MessageType,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields the messaging service fixes at creation time; the store assigns
/// `seq` and the unread flag starts false.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub id: Uuid,
    pub conversation_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub sender_name: String,
    pub sender_avatar: String,
    pub content: String,
    pub message_type: MessageType,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_display() {
        assert_eq!(MessageType::Text.to_string(), "text");
        assert_eq!(MessageType::Image.to_string(), "image");
    }

    #[test]
    fn test_message_type_default_is_text() {
        assert_eq!(MessageType::default(), MessageType::Text);
    }
}
