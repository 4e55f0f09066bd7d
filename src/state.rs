use std::sync::Arc;

use tokio::sync::broadcast;

use crate::conversation::conversation_service::ConversationService;
use crate::db::DbPool;
use crate::message::message_dto::MessageResponse;
use crate::message::message_service::MessageService;
use crate::user::user_repository::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    /// Fan-out of freshly persisted messages, keyed by receiver id; the SSE
    /// stream endpoint subscribes here.
    pub message_tx: broadcast::Sender<(String, MessageResponse)>,
    pub users: Arc<dyn UserStore>,
    pub conversation_service: ConversationService,
    pub message_service: MessageService,
}

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: String,
    pub request_timeout_secs: u64,
    pub broadcast_capacity: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("REQUEST_TIMEOUT_SECS must be a number"),
            broadcast_capacity: std::env::var("MESSAGE_STREAM_CAPACITY")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .expect("MESSAGE_STREAM_CAPACITY must be a number"),
        }
    }
}
