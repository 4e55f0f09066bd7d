use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::message_dto::{MessagePage, MessageResponse, SendMessageRequest};
use super::message_models::{Message, NewMessage};
use super::message_repository::MessageStore;
use crate::conversation::conversation_repository::ConversationStore;
use crate::error::{AppError, Result};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Clone)]
pub struct MessageService {
    conversations: Arc<dyn ConversationStore>,
    messages: Arc<dyn MessageStore>,
}

impl MessageService {
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        Self {
            conversations,
            messages,
        }
    }

    /// Appends a message, then refreshes the conversation's denormalized
    /// last-message fields. The message insert is the durability point: if
    /// the summary refresh fails the message stays stored, the summary goes
    /// momentarily stale, and the caller sees the failure.
    pub async fn send(&self, request: SendMessageRequest) -> Result<Message> {
        let content = request.content.trim();
        if content.is_empty() {
            return Err(AppError::EmptyContent);
        }

        let conversation = self
            .conversations
            .find_by_id(&request.conversation_id)
            .await?
            .ok_or_else(|| AppError::ConversationNotFound(request.conversation_id.clone()))?;

        if !conversation.is_participant(&request.sender_id) {
            return Err(AppError::NotParticipant {
                user_id: request.sender_id,
                conversation_id: conversation.id,
            });
        }

        let receiver_id = conversation.counterpart_of(&request.sender_id).to_string();
        let message = self
            .messages
            .append(NewMessage {
                id: Uuid::new_v4(),
                conversation_id: conversation.id.clone(),
                sender_id: request.sender_id,
                receiver_id,
                sender_name: request.sender_name,
                sender_avatar: request.sender_avatar,
                content: content.to_string(),
                message_type: request.message_type,
                created_at: Utc::now(),
            })
            .await?;

        if let Err(err) = self
            .conversations
            .set_last_message(&conversation.id, &message.content, message.created_at)
            .await
        {
            tracing::warn!(
                conversation_id = %conversation.id,
                "message stored but summary refresh failed: {err}"
            );
            return Err(err);
        }

        Ok(message)
    }

    /// One page of chat history, ascending chronological order within the
    /// page. Read-marking only happens when the caller opts in with both
    /// `mark_read` and a viewer.
    pub async fn list(
        &self,
        conversation_id: &str,
        page: u32,
        page_size: u32,
        viewer_id: Option<&str>,
        mark_read: bool,
    ) -> Result<MessagePage> {
        if conversation_id.is_empty() {
            return Err(AppError::Validation("conversationId is required".to_string()));
        }
        if page == 0 {
            return Err(AppError::Validation("page is 1-indexed".to_string()));
        }
        let marking_viewer = if mark_read {
            Some(viewer_id.ok_or_else(|| {
                AppError::Validation("viewerId is required when markRead is set".to_string())
            })?)
        } else {
            None
        };
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let offset = i64::from(page - 1) * i64::from(page_size);

        // Storage pages newest-first; the page is reversed so the client
        // renders oldest-at-the-top, newest-at-the-bottom.
        let mut messages = self
            .messages
            .page_newest_first(conversation_id, i64::from(page_size), offset)
            .await?;
        let total = self.messages.count(conversation_id).await?;
        let has_more = offset + (messages.len() as i64) < total;
        messages.reverse();

        if let Some(viewer_id) = marking_viewer {
            self.messages.mark_read(conversation_id, viewer_id).await?;
        }

        Ok(MessagePage {
            messages: messages.into_iter().map(MessageResponse::from).collect(),
            page,
            page_size,
            total,
            has_more,
        })
    }

    /// Idempotent: repeat calls touch zero rows and succeed.
    pub async fn mark_read(&self, conversation_id: &str, user_id: &str) -> Result<()> {
        self.messages.mark_read(conversation_id, user_id).await?;
        Ok(())
    }

    pub async fn count_unread(&self, conversation_id: &str, user_id: &str) -> Result<i64> {
        self.messages.count_unread(conversation_id, user_id).await
    }

    /// Unread across every conversation, for the tab badge.
    pub async fn total_unread(&self, user_id: &str) -> Result<i64> {
        if user_id.is_empty() {
            return Err(AppError::Validation("userId is required".to_string()));
        }
        self.messages.total_unread(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::conversation::conversation_models::Conversation;
    use crate::conversation::conversation_repository::memory::MemoryConversationStore;
    use crate::message::message_models::MessageType;
    use crate::message::message_repository::memory::MemoryMessageStore;

    const ALICE: &str = "openid-alice";
    const BOB: &str = "openid-bob";
    const THREAD: &str = "openid-alice_openid-bob";

    async fn service_with_thread() -> (
        MessageService,
        Arc<MemoryConversationStore>,
        Arc<MemoryMessageStore>,
    ) {
        let conversations = Arc::new(MemoryConversationStore::default());
        let messages = Arc::new(MemoryMessageStore::default());
        conversations
            .insert_if_absent(&Conversation::first_contact(
                THREAD.to_string(),
                ALICE,
                BOB,
                "",
                "",
                Utc::now(),
            ))
            .await
            .unwrap();
        let service = MessageService::new(conversations.clone(), messages.clone());
        (service, conversations, messages)
    }

    fn request(sender: &str, content: &str) -> SendMessageRequest {
        SendMessageRequest {
            conversation_id: THREAD.to_string(),
            sender_id: sender.to_string(),
            sender_name: String::new(),
            sender_avatar: String::new(),
            content: content.to_string(),
            message_type: MessageType::Text,
        }
    }

    #[tokio::test]
    async fn send_stores_message_and_refreshes_summary() {
        let (service, conversations, _) = service_with_thread().await;

        let message = service.send(request(ALICE, "hello")).await.unwrap();
        assert_eq!(message.receiver_id, BOB);
        assert!(!message.is_read);

        let page = service.list(THREAD, 1, 20, None, false).await.unwrap();
        assert_eq!(page.messages.len(), 1);
        assert_eq!(page.messages[0].content, "hello");
        assert!(!page.messages[0].is_read);

        let summary = conversations.find_by_id(THREAD).await.unwrap().unwrap();
        assert_eq!(summary.last_message, "hello");
        assert_eq!(summary.last_message_time, message.created_at);
    }

    #[tokio::test]
    async fn blank_content_is_rejected_and_nothing_is_stored() {
        let (service, _, messages) = service_with_thread().await;

        let err = service.send(request(ALICE, "   \n\t")).await.unwrap_err();
        assert_eq!(err.code(), 4001);
        assert_eq!(messages.count(THREAD).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_conversation_is_rejected() {
        let (service, _, _) = service_with_thread().await;

        let mut req = request(ALICE, "hello");
        req.conversation_id = "openid-x_openid-y".to_string();
        let err = service.send(req).await.unwrap_err();
        assert_eq!(err.code(), 4003);
    }

    #[tokio::test]
    async fn outsider_sender_is_rejected() {
        let (service, _, messages) = service_with_thread().await;

        let err = service
            .send(request("openid-mallory", "hi there"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), 4004);
        assert_eq!(messages.count(THREAD).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unread_counting_and_mark_read_are_idempotent() {
        let (service, _, _) = service_with_thread().await;

        service.send(request(ALICE, "one")).await.unwrap();
        service.send(request(ALICE, "two")).await.unwrap();
        service.send(request(BOB, "reply")).await.unwrap();

        // Two of Alice's messages are addressed to Bob, one of Bob's to Alice.
        assert_eq!(service.count_unread(THREAD, BOB).await.unwrap(), 2);
        assert_eq!(service.count_unread(THREAD, ALICE).await.unwrap(), 1);
        assert_eq!(service.total_unread(BOB).await.unwrap(), 2);

        service.mark_read(THREAD, BOB).await.unwrap();
        assert_eq!(service.count_unread(THREAD, BOB).await.unwrap(), 0);
        // Bob's reply to Alice is untouched by Bob's mark-read.
        assert_eq!(service.count_unread(THREAD, ALICE).await.unwrap(), 1);

        // Second call is a no-op, not an error.
        service.mark_read(THREAD, BOB).await.unwrap();
        assert_eq!(service.count_unread(THREAD, BOB).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn pages_are_ascending_with_correct_has_more() {
        let (service, _, _) = service_with_thread().await;

        for i in 1..=45 {
            service.send(request(ALICE, &format!("message {i}"))).await.unwrap();
        }

        let first = service.list(THREAD, 1, 20, None, false).await.unwrap();
        assert_eq!(first.messages.len(), 20);
        assert!(first.has_more);
        assert_eq!(first.total, 45);
        // Page 1 holds the newest 20, displayed oldest-first.
        assert_eq!(first.messages[0].content, "message 26");
        assert_eq!(first.messages[19].content, "message 45");

        let last = service.list(THREAD, 3, 20, None, false).await.unwrap();
        assert_eq!(last.messages.len(), 5);
        assert!(!last.has_more);
        assert_eq!(last.messages[0].content, "message 1");
        assert_eq!(last.messages[4].content, "message 5");
    }

    #[tokio::test]
    async fn page_size_is_clamped() {
        let (service, _, _) = service_with_thread().await;
        service.send(request(ALICE, "hello")).await.unwrap();

        let page = service.list(THREAD, 1, 5000, None, false).await.unwrap();
        assert_eq!(page.page_size, MAX_PAGE_SIZE);

        let err = service.list(THREAD, 0, 20, None, false).await.unwrap_err();
        assert_eq!(err.code(), 4001);
    }

    #[tokio::test]
    async fn listing_marks_read_only_when_opted_in() {
        let (service, _, _) = service_with_thread().await;
        service.send(request(ALICE, "hello")).await.unwrap();

        service.list(THREAD, 1, 20, Some(BOB), false).await.unwrap();
        assert_eq!(service.count_unread(THREAD, BOB).await.unwrap(), 1);

        service.list(THREAD, 1, 20, Some(BOB), true).await.unwrap();
        assert_eq!(service.count_unread(THREAD, BOB).await.unwrap(), 0);

        let err = service.list(THREAD, 1, 20, None, true).await.unwrap_err();
        assert_eq!(err.code(), 4001);
    }

    /// Fails every summary refresh while delegating the rest, to exercise the
    /// durability-over-freshness contract of `send`.
    struct StaleSummaryStore {
        inner: MemoryConversationStore,
    }

    #[async_trait]
    impl ConversationStore for StaleSummaryStore {
        async fn insert_if_absent(
            &self,
            conversation: &Conversation,
        ) -> Result<Option<Conversation>> {
            self.inner.insert_if_absent(conversation).await
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<Conversation>> {
            self.inner.find_by_id(id).await
        }

        async fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>> {
            self.inner.list_for_user(user_id).await
        }

        async fn set_last_message(
            &self,
            _id: &str,
            _content: &str,
            _at: DateTime<Utc>,
        ) -> Result<()> {
            Err(AppError::Internal)
        }
    }

    #[tokio::test]
    async fn failed_summary_refresh_reports_error_but_keeps_message() {
        let conversations = Arc::new(StaleSummaryStore {
            inner: MemoryConversationStore::default(),
        });
        conversations
            .insert_if_absent(&Conversation::first_contact(
                THREAD.to_string(),
                ALICE,
                BOB,
                "",
                "",
                Utc::now(),
            ))
            .await
            .unwrap();
        let messages = Arc::new(MemoryMessageStore::default());
        let service = MessageService::new(conversations.clone(), messages.clone());

        let err = service.send(request(ALICE, "hello")).await.unwrap_err();
        assert_eq!(err.code(), 5001);

        // The message survived; only the summary is stale.
        assert_eq!(messages.count(THREAD).await.unwrap(), 1);
        let summary = conversations.find_by_id(THREAD).await.unwrap().unwrap();
        assert_eq!(summary.last_message, "");
    }
}
