//! Client-side optimistic send queue.
//!
//! A chat view renders an outgoing message the instant the user submits it,
//! before the server has answered. Each draft moves through
//! `Pending -> Acknowledged | Failed`; a failed draft stays visible with its
//! content and is only ever re-sent by an explicit user retry. The queue is
//! transport-agnostic: the caller owns the actual `sendMessage` call and
//! reports its outcome back here.

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryState {
    /// Rendered locally, no server outcome yet.
    Pending,
    /// The server persisted the message under this id; a live feed or poll
    /// reconciles the local entry with the stored one.
    Acknowledged { server_id: Uuid },
    /// The send failed; the draft is kept for a user-triggered retry.
    Failed,
}

#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub local_id: u64,
    pub conversation_id: String,
    pub content: String,
    pub queued_at: DateTime<Utc>,
    pub state: DeliveryState,
}

impl OutgoingMessage {
    pub fn is_pending(&self) -> bool {
        self.state == DeliveryState::Pending
    }

    pub fn is_failed(&self) -> bool {
        self.state == DeliveryState::Failed
    }
}

#[derive(Debug)]
pub struct SendQueue {
    next_local_id: u64,
    entries: Vec<OutgoingMessage>,
}

impl SendQueue {
    pub fn new() -> Self {
        Self {
            next_local_id: 1,
            entries: Vec::new(),
        }
    }

    /// Queues a draft and returns the entry to render, already `Pending`.
    /// Blank drafts are dropped here, before any network call exists.
    pub fn submit(&mut self, conversation_id: &str, draft: &str) -> Option<&OutgoingMessage> {
        let content = draft.trim();
        if content.is_empty() {
            return None;
        }

        let local_id = self.next_local_id;
        self.next_local_id += 1;
        self.entries.push(OutgoingMessage {
            local_id,
            conversation_id: conversation_id.to_string(),
            content: content.to_string(),
            queued_at: Utc::now(),
            state: DeliveryState::Pending,
        });
        self.entries.last()
    }

    /// Records the server outcome for a pending entry. Returns false when the
    /// entry is unknown or already settled.
    pub fn acknowledge(&mut self, local_id: u64, server_id: Uuid) -> bool {
        match self.pending_mut(local_id) {
            Some(entry) => {
                entry.state = DeliveryState::Acknowledged { server_id };
                true
            }
            None => false,
        }
    }

    pub fn fail(&mut self, local_id: u64) -> bool {
        match self.pending_mut(local_id) {
            Some(entry) => {
                entry.state = DeliveryState::Failed;
                true
            }
            None => false,
        }
    }

    /// User-triggered retry of a failed entry: removes it and re-queues its
    /// content as a fresh pending draft. Pending or acknowledged entries are
    /// never retried.
    pub fn retry(&mut self, local_id: u64) -> Option<&OutgoingMessage> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.local_id == local_id && entry.is_failed())?;
        let failed = self.entries.remove(index);
        self.submit(&failed.conversation_id, &failed.content)
    }

    pub fn entry(&self, local_id: u64) -> Option<&OutgoingMessage> {
        self.entries.iter().find(|entry| entry.local_id == local_id)
    }

    pub fn entries(&self) -> &[OutgoingMessage] {
        &self.entries
    }

    fn pending_mut(&mut self, local_id: u64) -> Option<&mut OutgoingMessage> {
        self.entries
            .iter_mut()
            .find(|entry| entry.local_id == local_id && entry.is_pending())
    }
}

impl Default for SendQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_renders_pending_immediately() {
        let mut queue = SendQueue::new();
        let entry = queue.submit("a_b", "hi").unwrap();
        assert!(entry.is_pending());
        assert_eq!(entry.content, "hi");
        assert_eq!(queue.entries().len(), 1);
    }

    #[test]
    fn blank_drafts_never_enter_the_queue() {
        let mut queue = SendQueue::new();
        assert!(queue.submit("a_b", "   ").is_none());
        assert!(queue.entries().is_empty());
    }

    #[test]
    fn acknowledge_settles_a_pending_entry() {
        let mut queue = SendQueue::new();
        let local_id = queue.submit("a_b", "hi").unwrap().local_id;
        let server_id = Uuid::new_v4();

        assert!(queue.acknowledge(local_id, server_id));
        assert_eq!(
            queue.entry(local_id).unwrap().state,
            DeliveryState::Acknowledged { server_id }
        );
        // A settled entry cannot fail afterwards.
        assert!(!queue.fail(local_id));
    }

    #[test]
    fn failed_send_keeps_the_draft_and_retry_requeues_it() {
        let mut queue = SendQueue::new();
        let local_id = queue.submit("a_b", "hi").unwrap().local_id;

        assert!(queue.fail(local_id));
        let failed = queue.entry(local_id).unwrap();
        assert!(failed.is_failed());
        assert_eq!(failed.content, "hi");

        let retried = queue.retry(local_id).unwrap();
        assert!(retried.is_pending());
        assert_eq!(retried.content, "hi");
        let retried_id = retried.local_id;
        assert_ne!(retried_id, local_id);

        // The failed entry is gone; only the fresh pending one remains.
        assert_eq!(queue.entries().len(), 1);
        assert!(queue.entry(local_id).is_none());
        assert!(queue.entry(retried_id).is_some());
    }

    #[test]
    fn retry_never_touches_pending_or_acknowledged_entries() {
        let mut queue = SendQueue::new();
        let pending_id = queue.submit("a_b", "one").unwrap().local_id;
        assert!(queue.retry(pending_id).is_none());

        let acked_id = queue.submit("a_b", "two").unwrap().local_id;
        queue.acknowledge(acked_id, Uuid::new_v4());
        assert!(queue.retry(acked_id).is_none());

        assert_eq!(queue.entries().len(), 2);
    }
}
