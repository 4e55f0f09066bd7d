use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertProfileRequest {
    #[validate(length(min = 1, max = 64))]
    pub nickname: String,
    #[serde(default)]
    pub avatar_url: String,
}
