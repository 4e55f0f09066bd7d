use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::conversation_id::canonical_pair;

/// Summary record for one two-participant thread. `last_message` and
/// `last_message_time` are denormalized projections of the newest message
/// and may be momentarily stale after a send.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    pub id: String,
    pub participant_a: String,
    pub participant_b: String,
    pub topic_id: String,
    pub topic_title: String,
    pub last_message: String,
    pub last_message_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Builds the record persisted on first contact. Participants are stored
    /// in canonical sorted order regardless of who initiated.
    pub fn first_contact(
        id: String,
        user_a: &str,
        user_b: &str,
        topic_id: &str,
        topic_title: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let (first, second) = canonical_pair(user_a, user_b);
        Self {
            id,
            participant_a: first.to_string(),
            participant_b: second.to_string(),
            topic_id: topic_id.to_string(),
            topic_title: topic_title.to_string(),
            last_message: String::new(),
            last_message_time: now,
            created_at: now,
        }
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.participant_a == user_id || self.participant_b == user_id
    }

    /// The other side of the thread, for a caller known to be a participant.
    pub fn counterpart_of(&self, user_id: &str) -> &str {
        if self.participant_a == user_id {
            &self.participant_b
        } else {
            &self.participant_a
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_contact_stores_participants_sorted() {
        let conv = Conversation::first_contact(
            "a_b".to_string(),
            "b",
            "a",
            "post-1",
            "badminton",
            Utc::now(),
        );
        assert_eq!(conv.participant_a, "a");
        assert_eq!(conv.participant_b, "b");
        assert_eq!(conv.last_message, "");
    }

    #[test]
    fn counterpart_resolves_both_sides() {
        let conv =
            Conversation::first_contact("a_b".to_string(), "a", "b", "", "", Utc::now());
        assert_eq!(conv.counterpart_of("a"), "b");
        assert_eq!(conv.counterpart_of("b"), "a");
        assert!(conv.is_participant("a"));
        assert!(!conv.is_participant("c"));
    }
}
