//! Data access layer
//!
//! Each trait is the contract this service relies on from the relational
//! store. Constraint enforcement (uniqueness, foreign keys, counters) lives
//! in the schema; implementations only translate calls into statements.
pub mod analytics;
pub mod engagement;
pub mod follows;
pub mod memory;
pub mod posts;
pub mod profiles;

pub use analytics::PgAnalyticsRepository;
pub use engagement::PgEngagementRepository;
pub use follows::PgFollowRepository;
pub use memory::InMemoryStore;
pub use posts::PgPostRepository;
pub use profiles::PgProfileRepository;

use crate::domain::models::{
    AnalyticsRecord, FeedQuery, FeedRow, FollowRelation, NewPost, Post, Profile,
};
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Posts joined with author and counts, newest first
    async fn list_feed(&self, query: &FeedQuery) -> Result<Vec<FeedRow>>;

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>>;

    async fn insert_post(&self, post: &NewPost) -> Result<Post>;

    /// Delete a post owned by `author_id`; returns true if a row was removed
    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait EngagementRepository: Send + Sync {
    /// Returns true if a new like row was inserted
    async fn add_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool>;

    async fn remove_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool>;

    async fn has_liked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool>;

    async fn add_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<bool>;

    async fn remove_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<bool>;

    async fn has_bookmarked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool>;

    /// Returns true if a new repost row was inserted
    async fn add_repost(&self, user_id: Uuid, post_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>>;

    async fn update_bio(&self, user_id: Uuid, bio: Option<&str>) -> Result<Option<Profile>>;

    async fn update_avatar(&self, user_id: Uuid, avatar_url: &str) -> Result<Option<Profile>>;

    /// Profiles ordered by follower count, highest first
    async fn trending(&self, limit: i64) -> Result<Vec<Profile>>;
}

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Insert the relation; a duplicate surfaces as `AppError::Conflict`
    async fn insert_follow(&self, follower_id: Uuid, following_id: Uuid)
        -> Result<FollowRelation>;

    async fn delete_follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Rows with `date >= since`, ascending by date
    async fn daily_since(&self, user_id: Uuid, since: NaiveDate) -> Result<Vec<AnalyticsRecord>>;
}
