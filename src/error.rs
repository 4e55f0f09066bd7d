use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::envelope::Envelope;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("message content cannot be empty")]
    EmptyContent,

    #[error("cannot start a conversation with yourself")]
    SelfConversation,

    #[error("conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("user {user_id} is not a participant of conversation {conversation_id}")]
    NotParticipant {
        user_id: String,
        conversation_id: String,
    },

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Envelope code carried in every response body. 0 is success; these are
    /// the failure bands: 4001 validation, 4002-4004 domain, 5001 internal.
    pub fn code(&self) -> i32 {
        match self {
            AppError::Validation(_) | AppError::EmptyContent => 4001,
            AppError::SelfConversation => 4002,
            AppError::ConversationNotFound(_) | AppError::UserNotFound(_) => 4003,
            AppError::NotParticipant { .. } => 4004,
            AppError::Database(_) | AppError::Internal => 5001,
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal => {
                "server error, please try again later".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Database(ref e) = self {
            tracing::error!("Database error: {:?}", e);
        }

        // Failures ride in the envelope code; the HTTP layer always answers
        // 200, mirroring the cloud-function convention the clients expect.
        let body = Json(Envelope::<()>::error(self.code(), self.public_message()));
        (StatusCode::OK, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
