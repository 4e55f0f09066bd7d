use std::time::Duration;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    conversation::conversation_dto::{
        ChatPeer, ConversationDetail, ConversationSummary, CreateConversationRequest,
    },
    conversation::conversation_handlers,
    message::message_dto::{MessagePage, MessageResponse, SendMessageRequest, UnreadCount},
    message::message_handlers,
    message::message_models::MessageType,
    state::AppState,
    user::user_handlers,
    user::user_models::UserProfile,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        conversation_handlers::create_or_get_conversation,
        conversation_handlers::list_conversations,
        message_handlers::send_message,
        message_handlers::list_messages,
        message_handlers::message_stream,
    ),
    components(
        schemas(
            CreateConversationRequest,
            ConversationDetail,
            ConversationSummary,
            ChatPeer,
            SendMessageRequest,
            MessageResponse,
            MessagePage,
            MessageType,
            UnreadCount,
            UserProfile,
        )
    ),
    tags(
        (name = "conversations", description = "Conversation creation and chat-list endpoints"),
        (name = "messages", description = "Message send, history, and unread endpoints")
    )
)]
struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let conversation_routes = Router::new()
        .route(
            "/",
            post(conversation_handlers::create_or_get_conversation)
                .get(conversation_handlers::list_conversations),
        )
        .route("/:id/messages", get(message_handlers::list_messages))
        .route("/:id/read", post(message_handlers::mark_conversation_read));

    let message_routes = Router::new()
        .route("/", post(message_handlers::send_message))
        .route("/unread", get(message_handlers::total_unread))
        .route("/stream", get(message_handlers::message_stream));

    let user_routes = Router::new().route(
        "/:id",
        put(user_handlers::upsert_profile).get(user_handlers::get_profile),
    );

    // Combine all routes
    let api_routes = Router::new()
        .nest("/conversations", conversation_routes)
        .nest("/messages", message_routes)
        .nest("/users", user_routes);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    state.config.request_timeout_secs,
                )))
                .layer(cors),
        )
        .with_state(state)
}
