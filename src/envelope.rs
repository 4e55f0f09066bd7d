use axum::Json;
use serde::Serialize;

/// Uniform response body for every chat route: `code` 0 on success, a
/// failure-band code otherwise; `data` is the payload or null.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub code: i32,
    pub msg: String,
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            code: 0,
            msg: "success".to_string(),
            data: Some(data),
        })
    }
}

impl Envelope<()> {
    pub fn error(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}
