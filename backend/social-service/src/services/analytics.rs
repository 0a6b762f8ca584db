//! Profile analytics view
//!
//! Daily aggregates for the trailing window, turned into chart points,
//! totals and an engagement rate.
use crate::cache::{QueryCache, QueryKey};
use crate::domain::models::AnalyticsRecord;
use crate::error::{AppError, Result};
use crate::repository::AnalyticsRepository;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsPoint {
    /// Short day label, e.g. "Mar 04"
    pub date: String,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub watch_time_minutes: i64,
}

impl From<&AnalyticsRecord> for AnalyticsPoint {
    fn from(record: &AnalyticsRecord) -> Self {
        let seconds = record.watch_time_seconds.unwrap_or(0);
        Self {
            date: record.date.format("%b %d").to_string(),
            views: record.view_count.unwrap_or(0),
            likes: record.like_count.unwrap_or(0),
            comments: record.comment_count.unwrap_or(0),
            watch_time_minutes: (seconds as f64 / 60.0).round() as i64,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsTotals {
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub watch_time_minutes: i64,
}

impl AnalyticsTotals {
    pub fn from_points(points: &[AnalyticsPoint]) -> Self {
        points.iter().fold(Self::default(), |acc, p| Self {
            views: acc.views + p.views,
            likes: acc.likes + p.likes,
            comments: acc.comments + p.comments,
            watch_time_minutes: acc.watch_time_minutes + p.watch_time_minutes,
        })
    }

    /// (likes + comments) / views in percent, one decimal; 0 without views
    pub fn engagement_rate(&self) -> f64 {
        if self.views == 0 {
            return 0.0;
        }
        let rate = (self.likes + self.comments) as f64 / self.views as f64 * 100.0;
        (rate * 10.0).round() / 10.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsView {
    pub points: Vec<AnalyticsPoint>,
    pub totals: AnalyticsTotals,
    pub engagement_rate: f64,
}

impl AnalyticsView {
    pub fn from_records(records: &[AnalyticsRecord]) -> Self {
        let points: Vec<AnalyticsPoint> = records.iter().map(AnalyticsPoint::from).collect();
        let totals = AnalyticsTotals::from_points(&points);
        Self {
            engagement_rate: totals.engagement_rate(),
            points,
            totals,
        }
    }
}

#[derive(Clone)]
pub struct AnalyticsService {
    analytics: Arc<dyn AnalyticsRepository>,
    cache: Arc<QueryCache>,
    window_days: i64,
}

impl AnalyticsService {
    pub fn new(analytics: Arc<dyn AnalyticsRepository>, cache: Arc<QueryCache>, window_days: i64) -> Self {
        Self {
            analytics,
            cache,
            window_days,
        }
    }

    pub async fn view(&self, owner: Uuid, viewer: Uuid) -> Result<AnalyticsView> {
        self.view_as_of(owner, viewer, Utc::now().date_naive()).await
    }

    pub async fn view_as_of(&self, owner: Uuid, viewer: Uuid, today: NaiveDate) -> Result<AnalyticsView> {
        if owner != viewer {
            return Err(AppError::Forbidden(
                "Analytics are only visible to the profile owner".to_string(),
            ));
        }

        let key = QueryKey::ProfileAnalytics(owner);
        if let Some(view) = self.cache.get::<AnalyticsView>(&key) {
            return Ok(view);
        }

        let since = today - ChronoDuration::days(self.window_days);
        let records = self.analytics.daily_since(owner, since).await.map_err(|e| {
            error!(user_id = %owner, "Error fetching analytics: {}", e);
            e.user_facing("Failed to load analytics")
        })?;

        let view = AnalyticsView::from_records(&records);
        self.cache.put(key, &view);
        Ok(view)
    }
}
