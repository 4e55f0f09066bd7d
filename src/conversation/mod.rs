// Declare submodules
pub mod conversation_dto;
pub mod conversation_handlers;
pub mod conversation_id;
pub mod conversation_models;
pub mod conversation_repository;
pub mod conversation_service;

// Re-export public items
pub use conversation_id::derive_conversation_id;
pub use conversation_models::Conversation;
pub use conversation_repository::{ConversationStore, PgConversationStore};
pub use conversation_service::ConversationService;
