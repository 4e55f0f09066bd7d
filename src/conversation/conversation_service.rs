use std::sync::Arc;

use chrono::Utc;

use super::conversation_dto::{ChatPeer, ConversationDetail, ConversationSummary};
use super::conversation_id::derive_conversation_id;
use super::conversation_models::Conversation;
use super::conversation_repository::ConversationStore;
use crate::error::{AppError, Result};
use crate::message::message_repository::MessageStore;
use crate::user::user_repository::UserStore;

/// Shown when the other participant has no directory entry. Conversations
/// outlive the posts and profiles that prompted them, so missing display
/// info is tolerated rather than treated as an error.
const UNKNOWN_NICKNAME: &str = "Unknown user";

#[derive(Clone)]
pub struct ConversationService {
    conversations: Arc<dyn ConversationStore>,
    messages: Arc<dyn MessageStore>,
    users: Arc<dyn UserStore>,
}

impl ConversationService {
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        messages: Arc<dyn MessageStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            conversations,
            messages,
            users,
        }
    }

    /// Returns the existing conversation between the pair, or persists a new
    /// one. Idempotent: zero writes when the thread already exists, and the
    /// unique key resolves concurrent first contact to a single row.
    pub async fn get_or_create(
        &self,
        user_id: &str,
        target_user_id: &str,
        topic_id: &str,
        topic_title: &str,
    ) -> Result<ConversationDetail> {
        let id = derive_conversation_id(user_id, target_user_id)?;

        if let Some(existing) = self.conversations.find_by_id(&id).await? {
            return self.into_detail(existing, user_id).await;
        }

        let conversation =
            Conversation::first_contact(id, user_id, target_user_id, topic_id, topic_title, Utc::now());

        match self.conversations.insert_if_absent(&conversation).await? {
            Some(inserted) => self.into_detail(inserted, user_id).await,
            None => {
                // Lost the first-contact race; the winner's row is authoritative.
                let winner = self
                    .conversations
                    .find_by_id(&conversation.id)
                    .await?
                    .ok_or_else(|| AppError::ConversationNotFound(conversation.id.clone()))?;
                self.into_detail(winner, user_id).await
            }
        }
    }

    /// The user's chat list: every conversation they participate in, newest
    /// activity first, enriched with the other side's display info and the
    /// computed unread count.
    pub async fn list(&self, user_id: &str) -> Result<Vec<ConversationSummary>> {
        if user_id.is_empty() {
            return Err(AppError::Validation("userId is required".to_string()));
        }

        let conversations = self.conversations.list_for_user(user_id).await?;

        let mut summaries = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let other_user = self.peer(conversation.counterpart_of(user_id)).await?;
            let unread_count = self
                .messages
                .count_unread(&conversation.id, user_id)
                .await?;

            summaries.push(ConversationSummary {
                id: conversation.id,
                other_user,
                topic_id: conversation.topic_id,
                topic_title: conversation.topic_title,
                last_message: conversation.last_message,
                last_message_time: conversation.last_message_time,
                unread_count,
                created_at: conversation.created_at,
            });
        }

        Ok(summaries)
    }

    async fn into_detail(
        &self,
        conversation: Conversation,
        user_id: &str,
    ) -> Result<ConversationDetail> {
        let other_user = self.peer(conversation.counterpart_of(user_id)).await?;

        Ok(ConversationDetail {
            id: conversation.id,
            other_user,
            topic_id: conversation.topic_id,
            topic_title: conversation.topic_title,
            created_at: conversation.created_at,
        })
    }

    async fn peer(&self, user_id: &str) -> Result<ChatPeer> {
        let profile = self.users.find_by_id(user_id).await?;
        Ok(match profile {
            Some(profile) => ChatPeer {
                id: profile.id,
                nickname: profile.nickname,
                avatar_url: profile.avatar_url,
            },
            None => ChatPeer {
                id: user_id.to_string(),
                nickname: UNKNOWN_NICKNAME.to_string(),
                avatar_url: String::new(),
            },
        })
    }
}
