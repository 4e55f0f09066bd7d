use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::message_models::{Message, MessageType};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[validate(length(min = 1))]
    pub conversation_id: String,
    #[validate(length(min = 1))]
    pub sender_id: String,
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub sender_avatar: String,
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
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

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            sender_name: message.sender_name,
            sender_avatar: message.sender_avatar,
            content: message.content,
            message_type: message.message_type,
            is_read: message.is_read,
            created_at: message.created_at,
        }
    }
}

/// One page of chat history, oldest first within the page.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub messages: Vec<MessageResponse>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub viewer_id: Option<String>,
    /// Read-marking is opt-in; listing alone never mutates anything.
    #[serde(default)]
    pub mark_read: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    #[validate(length(min = 1))]
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub unread_count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamQuery {
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_request_defaults_type_to_text() {
        let req: SendMessageRequest = serde_json::from_value(serde_json::json!({
            "conversationId": "a_b",
            "senderId": "a",
            "content": "hello"
        }))
        .unwrap();
        assert_eq!(req.message_type, MessageType::Text);
        assert_eq!(req.sender_name, "");
    }

    #[test]
    fn list_query_defaults_mark_read_off() {
        let query: ListMessagesQuery =
            serde_json::from_value(serde_json::json!({ "page": 2 })).unwrap();
        assert_eq!(query.page, Some(2));
        assert!(!query.mark_read);
        assert!(query.viewer_id.is_none());
    }
}
