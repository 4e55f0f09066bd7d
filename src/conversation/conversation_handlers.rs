use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use super::conversation_dto::{
    ConversationDetail, ConversationSummary, CreateConversationRequest, ListConversationsQuery,
};
use crate::{envelope::Envelope, error::Result, state::AppState};

/// Create the conversation for a participant pair, or return the existing one
#[utoipa::path(
    post,
    path = "/api/conversations",
    tag = "conversations",
    request_body = CreateConversationRequest,
    responses(
        (status = 200, description = "Envelope with the conversation; code 4002 when userId == targetUserId")
    )
)]
pub async fn create_or_get_conversation(
    State(state): State<AppState>,
    Json(payload): Json<CreateConversationRequest>,
) -> Result<Json<Envelope<ConversationDetail>>> {
    payload.validate()?;

    let detail = state
        .conversation_service
        .get_or_create(
            &payload.user_id,
            &payload.target_user_id,
            &payload.topic_id,
            &payload.topic_title,
        )
        .await?;

    Ok(Envelope::ok(detail))
}

/// List the user's conversations, newest activity first
#[utoipa::path(
    get,
    path = "/api/conversations",
    tag = "conversations",
    params(
        ("userId" = String, Query, description = "User whose chat list to return")
    ),
    responses(
        (status = 200, description = "Envelope with conversation summaries, each carrying unreadCount and peer display info")
    )
)]
pub async fn list_conversations(
    State(state): State<AppState>,
    Query(query): Query<ListConversationsQuery>,
) -> Result<Json<Envelope<Vec<ConversationSummary>>>> {
    let summaries = state.conversation_service.list(&query.user_id).await?;

    Ok(Envelope::ok(summaries))
}
