use super::EngagementRepository;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for likes, bookmarks and reposts
///
/// Inserts are idempotent (`ON CONFLICT DO NOTHING`); counters on `posts`
/// are kept by triggers.
#[derive(Clone)]
pub struct PgEngagementRepository {
    pool: PgPool,
}

impl PgEngagementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_pair(&self, sql: &str, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let inserted = sqlx::query_as::<_, (Uuid,)>(sql)
            .bind(user_id)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(inserted.is_some())
    }

    async fn delete_pair(&self, sql: &str, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let result = sqlx::query(sql)
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, sql: &str, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(sql)
            .bind(user_id)
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }
}

#[async_trait]
impl EngagementRepository for PgEngagementRepository {
    async fn add_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        self.insert_pair(
            r#"
            INSERT INTO post_likes (user_id, post_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, user_id) DO NOTHING
            RETURNING id
            "#,
            user_id,
            post_id,
        )
        .await
    }

    async fn remove_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        self.delete_pair(
            "DELETE FROM post_likes WHERE user_id = $1 AND post_id = $2",
            user_id,
            post_id,
        )
        .await
    }

    async fn has_liked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM post_likes WHERE user_id = $1 AND post_id = $2)",
            user_id,
            post_id,
        )
        .await
    }

    async fn add_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        self.insert_pair(
            r#"
            INSERT INTO bookmarks (user_id, post_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, user_id) DO NOTHING
            RETURNING id
            "#,
            user_id,
            post_id,
        )
        .await
    }

    async fn remove_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        self.delete_pair(
            "DELETE FROM bookmarks WHERE user_id = $1 AND post_id = $2",
            user_id,
            post_id,
        )
        .await
    }

    async fn has_bookmarked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM bookmarks WHERE user_id = $1 AND post_id = $2)",
            user_id,
            post_id,
        )
        .await
    }

    async fn add_repost(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        self.insert_pair(
            r#"
            INSERT INTO reposts (user_id, post_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, user_id) DO NOTHING
            RETURNING id
            "#,
            user_id,
            post_id,
        )
        .await
    }
}
