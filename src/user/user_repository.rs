use async_trait::async_trait;
use sqlx::PgPool;

use super::user_models::UserProfile;
use crate::error::Result;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn upsert(&self, id: &str, nickname: &str, avatar_url: &str) -> Result<UserProfile>;

    async fn find_by_id(&self, id: &str) -> Result<Option<UserProfile>>;
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn upsert(&self, id: &str, nickname: &str, avatar_url: &str) -> Result<UserProfile> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "INSERT INTO users (id, nickname, avatar_url)
             VALUES ($1, $2, $3)
             ON CONFLICT (id) DO UPDATE
             SET nickname = EXCLUDED.nickname, avatar_url = EXCLUDED.avatar_url
             RETURNING *",
        )
        .bind(id)
        .bind(nickname)
        .bind(avatar_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }
}

#[cfg(test)]
pub mod memory {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    pub struct MemoryUserStore {
        rows: Mutex<Vec<UserProfile>>,
    }

    impl MemoryUserStore {
        pub async fn seed(&self, id: &str, nickname: &str, avatar_url: &str) {
            self.upsert(id, nickname, avatar_url).await.unwrap();
        }
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn upsert(
            &self,
            id: &str,
            nickname: &str,
            avatar_url: &str,
        ) -> Result<UserProfile> {
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|row| row.id == id) {
                row.nickname = nickname.to_string();
                row.avatar_url = avatar_url.to_string();
                return Ok(row.clone());
            }
            let profile = UserProfile {
                id: id.to_string(),
                nickname: nickname.to_string(),
                avatar_url: avatar_url.to_string(),
                created_at: Utc::now(),
            };
            rows.push(profile.clone());
            Ok(profile)
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<UserProfile>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|row| row.id == id).cloned())
        }
    }
}
