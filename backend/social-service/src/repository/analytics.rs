use super::AnalyticsRepository;
use crate::domain::models::AnalyticsRecord;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

/// Read-only access to the per-day analytics table
#[derive(Clone)]
pub struct PgAnalyticsRepository {
    pool: PgPool,
}

impl PgAnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsRepository for PgAnalyticsRepository {
    async fn daily_since(&self, user_id: Uuid, since: NaiveDate) -> Result<Vec<AnalyticsRecord>> {
        let rows = sqlx::query_as::<_, AnalyticsRecord>(
            r#"
            SELECT date, view_count, like_count, comment_count, watch_time_seconds
            FROM post_analytics
            WHERE user_id = $1 AND date >= $2
            ORDER BY date ASC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
