// Declare submodules
pub mod message_dto;
pub mod message_handlers;
pub mod message_models;
pub mod message_repository;
pub mod message_service;

// Re-export public items
pub use message_dto::{MessagePage, MessageResponse, SendMessageRequest};
pub use message_models::{Message, MessageType, NewMessage};
pub use message_repository::{MessageStore, PgMessageStore};
pub use message_service::MessageService;
