use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    #[validate(length(min = 1))]
    pub user_id: String,
    #[validate(length(min = 1))]
    pub target_user_id: String,
    #[serde(default)]
    pub topic_id: String,
    #[serde(default)]
    pub topic_title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListConversationsQuery {
    pub user_id: String,
}

/// Display info of the other participant, as the chat list renders it.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatPeer {
    pub id: String,
    pub nickname: String,
    pub avatar_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetail {
    pub id: String,
    pub other_user: ChatPeer,
    pub topic_id: String,
    pub topic_title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub other_user: ChatPeer,
    pub topic_id: String,
    pub topic_title: String,
    pub last_message: String,
    pub last_message_time: DateTime<Utc>,
    pub unread_count: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn create_request_requires_both_participants() {
        let req = CreateConversationRequest {
            user_id: String::new(),
            target_user_id: "openid-bob".to_string(),
            topic_id: String::new(),
            topic_title: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn summary_serializes_camel_case() {
        let summary = ConversationSummary {
            id: "a_b".to_string(),
            other_user: ChatPeer {
                id: "b".to_string(),
                nickname: "Bo".to_string(),
                avatar_url: String::new(),
            },
            topic_id: String::new(),
            topic_title: String::new(),
            last_message: "hello".to_string(),
            last_message_time: Utc::now(),
            unread_count: 2,
            created_at: Utc::now(),
        };
        let body = serde_json::to_value(&summary).unwrap();
        assert_eq!(body["lastMessage"], "hello");
        assert_eq!(body["unreadCount"], 2);
        assert_eq!(body["otherUser"]["id"], "b");
    }
}
