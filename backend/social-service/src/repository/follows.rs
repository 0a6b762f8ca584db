use super::FollowRepository;
use crate::domain::models::FollowRelation;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for follow relations
///
/// The unique (follower_id, following_id) constraint rejects duplicates;
/// the insert trigger bumps the follower count and writes a notification.
#[derive(Clone)]
pub struct PgFollowRepository {
    pool: PgPool,
}

impl PgFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PgFollowRepository {
    async fn insert_follow(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<FollowRelation> {
        let relation = sqlx::query_as::<_, FollowRelation>(
            r#"
            INSERT INTO followers (follower_id, following_id)
            VALUES ($1, $2)
            RETURNING id, follower_id, following_id, created_at
            "#,
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(relation)
    }

    async fn delete_follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM followers
            WHERE follower_id = $1 AND following_id = $2
            "#,
        )
        .bind(follower_id)
        .bind(following_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }
}
