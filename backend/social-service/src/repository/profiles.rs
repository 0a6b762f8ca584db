use super::ProfileRepository;
use crate::domain::models::Profile;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for Profile operations
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, username, avatar_url, bio, follower_count, created_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn update_bio(&self, user_id: Uuid, bio: Option<&str>) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET bio = $2
            WHERE id = $1
            RETURNING id, username, avatar_url, bio, follower_count, created_at
            "#,
        )
        .bind(user_id)
        .bind(bio)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn update_avatar(&self, user_id: Uuid, avatar_url: &str) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET avatar_url = $2
            WHERE id = $1
            RETURNING id, username, avatar_url, bio, follower_count, created_at
            "#,
        )
        .bind(user_id)
        .bind(avatar_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn trending(&self, limit: i64) -> Result<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, username, avatar_url, bio, follower_count, created_at
            FROM profiles
            ORDER BY follower_count DESC, created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }
}
