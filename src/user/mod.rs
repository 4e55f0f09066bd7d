// Declare submodules
pub mod user_dto;
pub mod user_handlers;
pub mod user_models;
pub mod user_repository;

// Re-export public items
pub use user_models::UserProfile;
pub use user_repository::{PgUserStore, UserStore};
