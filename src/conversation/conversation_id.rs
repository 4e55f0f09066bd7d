use crate::error::{AppError, Result};

/// Joins the two participant ids of a derived conversation id.
pub const SEPARATOR: &str = "_";

/// Derives the stable id for the conversation between two users.
///
/// The pair is sorted lexicographically before joining, so whichever side
/// initiates contact produces the same id. Identity is deliberately
/// topic-agnostic: the post that prompted first contact is stored on the
/// conversation as metadata, not baked into the id.
pub fn derive_conversation_id(user_a: &str, user_b: &str) -> Result<String> {
    if user_a.is_empty() || user_b.is_empty() {
        return Err(AppError::Validation(
            "userId and targetUserId are required".to_string(),
        ));
    }
    if user_a == user_b {
        return Err(AppError::SelfConversation);
    }

    let (first, second) = canonical_pair(user_a, user_b);
    Ok(format!("{first}{SEPARATOR}{second}"))
}

/// Returns the pair in canonical (sorted) order, the order conversations
/// store their participants in.
pub fn canonical_pair<'a>(user_a: &'a str, user_b: &'a str) -> (&'a str, &'a str) {
    if user_a <= user_b {
        (user_a, user_b)
    } else {
        (user_b, user_a)
    }
}
