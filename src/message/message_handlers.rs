use axum::{
    extract::{Path, Query, State},
    response::{
        sse::{Event, KeepAlive},
        Sse,
    },
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use validator::Validate;

use super::{
    message_dto::{
        ListMessagesQuery, MarkReadRequest, MessagePage, MessageResponse, SendMessageRequest,
        StreamQuery, UnreadCount, UnreadQuery,
    },
    message_service::DEFAULT_PAGE_SIZE,
};
use crate::{envelope::Envelope, error::Result, state::AppState};

/// Send a message into an existing conversation
#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "messages",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Envelope with the persisted message; code 4003 when the conversation does not exist, 4004 when the sender is not a participant")
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<Envelope<MessageResponse>>> {
    payload.validate()?;

    let message = state.message_service.send(payload).await?;
    let response = MessageResponse::from(message);

    // Push the stored message to any open chat view of the receiver.
    let _ = state
        .message_tx
        .send((response.receiver_id.clone(), response.clone()));

    Ok(Envelope::ok(response))
}

/// Page through a conversation's history
#[utoipa::path(
    get,
    path = "/api/conversations/{id}/messages",
    tag = "messages",
    params(
        ("id" = String, Path, description = "Conversation id"),
        ("page" = Option<u32>, Query, description = "1-indexed page, newest page first"),
        ("pageSize" = Option<u32>, Query, description = "Page size, capped at 100"),
        ("viewerId" = Option<String>, Query, description = "Reader, required when markRead is set"),
        ("markRead" = Option<bool>, Query, description = "Opt-in: mark the viewer's unread messages read")
    ),
    responses(
        (status = 200, description = "Envelope with the page in ascending chronological order")
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<Envelope<MessagePage>>> {
    let page = state
        .message_service
        .list(
            &conversation_id,
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            query.viewer_id.as_deref(),
            query.mark_read,
        )
        .await?;

    Ok(Envelope::ok(page))
}

// ... (mark_conversation_read)
pub async fn mark_conversation_read(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Json(payload): Json<MarkReadRequest>,
) -> Result<Json<Envelope<()>>> {
    payload.validate()?;

    state
        .message_service
        .mark_read(&conversation_id, &payload.user_id)
        .await?;

    Ok(Envelope::ok(()))
}

// ... (total_unread)
pub async fn total_unread(
    State(state): State<AppState>,
    Query(query): Query<UnreadQuery>,
) -> Result<Json<Envelope<UnreadCount>>> {
    let unread_count = state.message_service.total_unread(&query.user_id).await?;

    Ok(Envelope::ok(UnreadCount { unread_count }))
}

/// Real-time message stream (SSE)
#[utoipa::path(
    get,
    path = "/api/messages/stream",
    tag = "messages",
    params(
        ("userId" = String, Query, description = "Receiver whose incoming messages to stream")
    ),
    responses(
        (status = 200, description = "Message stream established")
    )
)]
pub async fn message_stream(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let user_id = query.user_id;
    let rx = state.message_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok((receiver_id, message)) if receiver_id == user_id => {
            let json = serde_json::to_string(&message).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        _ => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
