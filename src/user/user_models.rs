use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Directory entry for a user, as chat lists render them. Identity itself
/// comes from the session provider; this service only stores display info.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub nickname: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
}
