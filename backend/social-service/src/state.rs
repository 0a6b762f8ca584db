/// Shared application state
///
/// Services are cheap to clone; the repositories, storage and query cache
/// behind them are shared through `Arc`.
use crate::cache::QueryCache;
use crate::config::{EngagementConfig, FeedConfig};
use crate::repository::{
    AnalyticsRepository, EngagementRepository, FollowRepository, InMemoryStore,
    PgAnalyticsRepository, PgEngagementRepository, PgFollowRepository, PgPostRepository,
    PgProfileRepository, PostRepository, ProfileRepository,
};
use crate::services::{
    AnalyticsService, EngagementService, FeedService, PostComposer, ProfileService,
};
use crate::storage::ObjectStorage;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct Repositories {
    pub posts: Arc<dyn PostRepository>,
    pub engagement: Arc<dyn EngagementRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub analytics: Arc<dyn AnalyticsRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            posts: Arc::new(PgPostRepository::new(pool.clone())),
            engagement: Arc::new(PgEngagementRepository::new(pool.clone())),
            profiles: Arc::new(PgProfileRepository::new(pool.clone())),
            follows: Arc::new(PgFollowRepository::new(pool.clone())),
            analytics: Arc::new(PgAnalyticsRepository::new(pool)),
        }
    }

    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            posts: store.clone(),
            engagement: store.clone(),
            profiles: store.clone(),
            follows: store.clone(),
            analytics: store,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub feed: FeedService,
    pub composer: PostComposer,
    pub engagement: EngagementService,
    pub profiles: ProfileService,
    pub analytics: AnalyticsService,
    pub cache: Arc<QueryCache>,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        storage: Arc<dyn ObjectStorage>,
        feed_config: &FeedConfig,
        engagement_config: &EngagementConfig,
    ) -> Self {
        let cache = Arc::new(QueryCache::new(Duration::from_secs(
            feed_config.cache_ttl_secs,
        )));

        let feed = FeedService::new(repos.posts.clone(), cache.clone(), feed_config.page_size);
        let composer = PostComposer::new(
            repos.posts.clone(),
            repos.profiles.clone(),
            storage,
            cache.clone(),
        );
        let engagement = EngagementService::new(
            repos.posts,
            repos.engagement,
            cache.clone(),
            engagement_config.toggles_enabled,
        );
        let profiles = ProfileService::new(repos.profiles, repos.follows, feed.clone(), cache.clone());
        let analytics = AnalyticsService::new(
            repos.analytics,
            cache.clone(),
            feed_config.analytics_window_days,
        );

        Self {
            feed,
            composer,
            engagement,
            profiles,
            analytics,
            cache,
        }
    }
}
