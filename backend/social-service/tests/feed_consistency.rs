//! Feed reads racing with mutations, and feeds larger than a single page.
mod common;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use common::harness;
use social_service::cache::QueryCache;
use social_service::domain::models::{EngagementAction, FeedQuery, FeedRow, NewPost, Post};
use social_service::repository::{InMemoryStore, PostRepository};
use social_service::services::{EngagementService, FeedService};
use social_service::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio_test::assert_ok;
use uuid::Uuid;

/// Holds the first `list_feed` call after its rows are read until released
struct PausedPosts {
    inner: Arc<InMemoryStore>,
    armed: AtomicBool,
    fetched: Notify,
    release: Notify,
}

#[async_trait]
impl PostRepository for PausedPosts {
    async fn list_feed(&self, query: &FeedQuery) -> Result<Vec<FeedRow>> {
        let rows = self.inner.list_feed(query).await?;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.fetched.notify_one();
            self.release.notified().await;
        }
        Ok(rows)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        self.inner.find_post(post_id).await
    }

    async fn insert_post(&self, post: &NewPost) -> Result<Post> {
        self.inner.insert_post(post).await
    }

    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<bool> {
        self.inner.delete_post(post_id, author_id).await
    }
}

#[tokio::test]
async fn read_in_flight_during_delete_does_not_repopulate_cache() {
    let store = Arc::new(InMemoryStore::new());
    let ada = store.seed_profile("ada");
    let post = store.seed_post(ada.id, "going away", Utc::now());
    store.seed_post(ada.id, "stays", Utc::now() - Duration::minutes(1));

    let paused = Arc::new(PausedPosts {
        inner: store.clone(),
        armed: AtomicBool::new(true),
        fetched: Notify::new(),
        release: Notify::new(),
    });
    let cache = Arc::new(QueryCache::new(std::time::Duration::from_secs(30)));
    let feed = FeedService::new(paused.clone(), cache.clone(), None);
    let engagement = EngagementService::new(store.clone(), store.clone(), cache, true);

    let reader = tokio::spawn({
        let feed = feed.clone();
        async move { feed.home_feed(None).await }
    });
    paused.fetched.notified().await;

    assert_ok!(engagement.perform(ada.id, post.id, EngagementAction::Delete).await);
    paused.release.notify_one();

    let stale = reader.await.unwrap().unwrap();
    assert_eq!(stale.len(), 2);

    let after = feed.home_feed(None).await.unwrap();
    assert_eq!(after.len(), 1);
    assert!(after.iter().all(|p| p.id != post.id));
}

#[tokio::test]
async fn feeds_return_every_post() {
    let h = harness();
    let ada = h.store.seed_profile("ada");
    let now = Utc::now();
    for n in 0..60 {
        h.store
            .seed_post(ada.id, &format!("post {}", n), now - Duration::seconds(n));
    }

    let home = h.state.feed.home_feed(None).await.unwrap();
    assert_eq!(home.len(), 60);
    assert_eq!(home[0].content, "post 0");
    assert_eq!(home[59].content, "post 59");

    let own = h.state.profiles.user_posts(ada.id, None).await.unwrap();
    assert_eq!(own.len(), 60);
}
