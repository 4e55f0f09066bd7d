use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use super::{user_dto::UpsertProfileRequest, user_models::UserProfile};
use crate::{
    envelope::Envelope,
    error::{AppError, Result},
    state::AppState,
};

// ... (upsert_profile)
pub async fn upsert_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpsertProfileRequest>,
) -> Result<Json<Envelope<UserProfile>>> {
    payload.validate()?;

    let profile = state
        .users
        .upsert(&user_id, &payload.nickname, &payload.avatar_url)
        .await?;

    Ok(Envelope::ok(profile))
}

// ... (get_profile)
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Envelope<UserProfile>>> {
    let profile = state
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound(user_id))?;

    Ok(Envelope::ok(profile))
}
