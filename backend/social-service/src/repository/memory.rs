//! In-memory store implementing every repository trait
//!
//! Mirrors the schema's constraints (unique pairs, cascading deletes,
//! trigger-maintained counters) so services behave the same as against
//! Postgres. Used by the test suites and for running the service locally
//! without a database.
use super::{
    AnalyticsRepository, EngagementRepository, FollowRepository, PostRepository,
    ProfileRepository,
};
use crate::domain::models::{
    AnalyticsRecord, FeedQuery, FeedRow, FollowRelation, NewPost, Post, Profile,
};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
struct State {
    profiles: HashMap<Uuid, Profile>,
    posts: HashMap<Uuid, Post>,
    likes: HashSet<(Uuid, Uuid)>,
    bookmarks: HashSet<(Uuid, Uuid)>,
    reposts: HashSet<(Uuid, Uuid)>,
    comments: HashMap<Uuid, i64>,
    follows: Vec<FollowRelation>,
    analytics: HashMap<Uuid, Vec<AnalyticsRecord>>,
    post_inserts: usize,
    fail_post_inserts: bool,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create a profile as the auth sign-up hook would
    pub fn seed_profile(&self, username: &str) -> Profile {
        let profile = Profile {
            id: Uuid::new_v4(),
            username: username.to_string(),
            avatar_url: None,
            bio: None,
            follower_count: 0,
            created_at: Utc::now(),
        };
        self.state().profiles.insert(profile.id, profile.clone());
        profile
    }

    /// Insert a post with an explicit timestamp (does not count as a composer write)
    pub fn seed_post(&self, author_id: Uuid, content: &str, created_at: DateTime<Utc>) -> Post {
        let post = Post {
            id: Uuid::new_v4(),
            user_id: author_id,
            content: content.to_string(),
            media_urls: Vec::new(),
            likes_count: 0,
            reposts_count: 0,
            created_at,
        };
        self.state().posts.insert(post.id, post.clone());
        post
    }

    pub fn seed_comment(&self, post_id: Uuid) {
        *self.state().comments.entry(post_id).or_insert(0) += 1;
    }

    pub fn seed_analytics(&self, user_id: Uuid, record: AnalyticsRecord) {
        self.state()
            .analytics
            .entry(user_id)
            .or_default()
            .push(record);
    }

    /// Number of post rows inserted through `insert_post`
    pub fn post_insert_count(&self) -> usize {
        self.state().post_inserts
    }

    /// Number of stored follow relations
    pub fn follow_count(&self) -> usize {
        self.state().follows.len()
    }

    /// Make subsequent `insert_post` calls fail like an unreachable database
    pub fn fail_post_inserts(&self, fail: bool) {
        self.state().fail_post_inserts = fail;
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn list_feed(&self, query: &FeedQuery) -> Result<Vec<FeedRow>> {
        let state = self.state();
        let mut rows: Vec<FeedRow> = state
            .posts
            .values()
            .filter(|post| query.author.map_or(true, |author| post.user_id == author))
            .filter_map(|post| {
                let author = state.profiles.get(&post.user_id)?;
                let viewer_in = |set: &HashSet<(Uuid, Uuid)>| {
                    query
                        .viewer
                        .map_or(false, |viewer| set.contains(&(post.id, viewer)))
                };
                Some(FeedRow {
                    id: post.id,
                    user_id: post.user_id,
                    content: post.content.clone(),
                    media_urls: post.media_urls.clone(),
                    likes_count: post.likes_count,
                    reposts_count: post.reposts_count,
                    created_at: post.created_at,
                    username: author.username.clone(),
                    avatar_url: author.avatar_url.clone(),
                    comment_count: state.comments.get(&post.id).copied().unwrap_or(0),
                    bookmark_count: state
                        .bookmarks
                        .iter()
                        .filter(|(post_id, _)| *post_id == post.id)
                        .count() as i64,
                    is_liked: viewer_in(&state.likes),
                    is_bookmarked: viewer_in(&state.bookmarks),
                })
            })
            .collect();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = query.limit {
            rows.truncate(limit.max(0) as usize);
        }
        Ok(rows)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        Ok(self.state().posts.get(&post_id).cloned())
    }

    async fn insert_post(&self, post: &NewPost) -> Result<Post> {
        let mut state = self.state();
        if state.fail_post_inserts {
            return Err(AppError::Database("connection refused".to_string()));
        }
        if !state.profiles.contains_key(&post.user_id) {
            return Err(AppError::NotFound(format!("profile {}", post.user_id)));
        }

        let created = Post {
            id: Uuid::new_v4(),
            user_id: post.user_id,
            content: post.content.clone(),
            media_urls: post.media_urls.clone(),
            likes_count: 0,
            reposts_count: 0,
            created_at: Utc::now(),
        };
        state.posts.insert(created.id, created.clone());
        state.post_inserts += 1;
        Ok(created)
    }

    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<bool> {
        let mut state = self.state();
        match state.posts.get(&post_id) {
            Some(post) if post.user_id == author_id => {}
            _ => return Ok(false),
        }

        state.posts.remove(&post_id);
        state.likes.retain(|(id, _)| *id != post_id);
        state.bookmarks.retain(|(id, _)| *id != post_id);
        state.reposts.retain(|(id, _)| *id != post_id);
        state.comments.remove(&post_id);
        Ok(true)
    }
}

impl InMemoryStore {
    fn ensure_post(state: &State, post_id: Uuid) -> Result<()> {
        if state.posts.contains_key(&post_id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("post {}", post_id)))
        }
    }

    fn bump_likes(state: &mut State, post_id: Uuid, delta: i64) {
        if let Some(post) = state.posts.get_mut(&post_id) {
            post.likes_count = (post.likes_count + delta).max(0);
        }
    }
}

#[async_trait]
impl EngagementRepository for InMemoryStore {
    async fn add_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let mut state = self.state();
        Self::ensure_post(&state, post_id)?;
        let inserted = state.likes.insert((post_id, user_id));
        if inserted {
            Self::bump_likes(&mut state, post_id, 1);
        }
        Ok(inserted)
    }

    async fn remove_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let mut state = self.state();
        let removed = state.likes.remove(&(post_id, user_id));
        if removed {
            Self::bump_likes(&mut state, post_id, -1);
        }
        Ok(removed)
    }

    async fn has_liked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        Ok(self.state().likes.contains(&(post_id, user_id)))
    }

    async fn add_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let mut state = self.state();
        Self::ensure_post(&state, post_id)?;
        Ok(state.bookmarks.insert((post_id, user_id)))
    }

    async fn remove_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        Ok(self.state().bookmarks.remove(&(post_id, user_id)))
    }

    async fn has_bookmarked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        Ok(self.state().bookmarks.contains(&(post_id, user_id)))
    }

    async fn add_repost(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let mut state = self.state();
        Self::ensure_post(&state, post_id)?;
        let inserted = state.reposts.insert((post_id, user_id));
        if inserted {
            if let Some(post) = state.posts.get_mut(&post_id) {
                post.reposts_count += 1;
            }
        }
        Ok(inserted)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        Ok(self.state().profiles.get(&user_id).cloned())
    }

    async fn update_bio(&self, user_id: Uuid, bio: Option<&str>) -> Result<Option<Profile>> {
        let mut state = self.state();
        Ok(state.profiles.get_mut(&user_id).map(|profile| {
            profile.bio = bio.map(str::to_string);
            profile.clone()
        }))
    }

    async fn update_avatar(&self, user_id: Uuid, avatar_url: &str) -> Result<Option<Profile>> {
        let mut state = self.state();
        Ok(state.profiles.get_mut(&user_id).map(|profile| {
            profile.avatar_url = Some(avatar_url.to_string());
            profile.clone()
        }))
    }

    async fn trending(&self, limit: i64) -> Result<Vec<Profile>> {
        let mut profiles: Vec<Profile> = self.state().profiles.values().cloned().collect();
        profiles.sort_by(|a, b| {
            b.follower_count
                .cmp(&a.follower_count)
                .then(a.created_at.cmp(&b.created_at))
        });
        profiles.truncate(limit.max(0) as usize);
        Ok(profiles)
    }
}

#[async_trait]
impl FollowRepository for InMemoryStore {
    async fn insert_follow(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<FollowRelation> {
        let mut state = self.state();
        if !state.profiles.contains_key(&follower_id) || !state.profiles.contains_key(&following_id)
        {
            return Err(AppError::NotFound("profile does not exist".to_string()));
        }
        if state
            .follows
            .iter()
            .any(|f| f.follower_id == follower_id && f.following_id == following_id)
        {
            return Err(AppError::Conflict(
                "duplicate key value violates unique constraint".to_string(),
            ));
        }

        let relation = FollowRelation {
            id: Uuid::new_v4(),
            follower_id,
            following_id,
            created_at: Utc::now(),
        };
        state.follows.push(relation.clone());
        if let Some(profile) = state.profiles.get_mut(&following_id) {
            profile.follower_count += 1;
        }
        Ok(relation)
    }

    async fn delete_follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool> {
        let mut state = self.state();
        let before = state.follows.len();
        state
            .follows
            .retain(|f| !(f.follower_id == follower_id && f.following_id == following_id));
        let removed = state.follows.len() < before;
        if removed {
            if let Some(profile) = state.profiles.get_mut(&following_id) {
                profile.follower_count = (profile.follower_count - 1).max(0);
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl AnalyticsRepository for InMemoryStore {
    async fn daily_since(&self, user_id: Uuid, since: NaiveDate) -> Result<Vec<AnalyticsRecord>> {
        let mut rows: Vec<AnalyticsRecord> = self
            .state()
            .analytics
            .get(&user_id)
            .map(|rows| rows.iter().filter(|r| r.date >= since).cloned().collect())
            .unwrap_or_default();
        rows.sort_by_key(|r| r.date);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_feed_is_newest_first_and_filters_by_author() {
        let store = InMemoryStore::new();
        let ada = store.seed_profile("ada");
        let bob = store.seed_profile("bob");
        let now = Utc::now();
        store.seed_post(ada.id, "old", now - Duration::minutes(10));
        store.seed_post(bob.id, "middle", now - Duration::minutes(5));
        store.seed_post(ada.id, "new", now);

        let all = store
            .list_feed(&FeedQuery { viewer: None, author: None, limit: None })
            .await
            .unwrap();
        let contents: Vec<&str> = all.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["new", "middle", "old"]);

        let only_ada = store
            .list_feed(&FeedQuery { viewer: None, author: Some(ada.id), limit: None })
            .await
            .unwrap();
        assert_eq!(only_ada.len(), 2);
        assert!(only_ada.iter().all(|r| r.user_id == ada.id));
    }

    #[tokio::test]
    async fn test_duplicate_follow_is_a_conflict() {
        let store = InMemoryStore::new();
        let ada = store.seed_profile("ada");
        let bob = store.seed_profile("bob");

        store.insert_follow(ada.id, bob.id).await.unwrap();
        let err = store.insert_follow(ada.id, bob.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.follow_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_cascades_engagement() {
        let store = InMemoryStore::new();
        let ada = store.seed_profile("ada");
        let post = store.seed_post(ada.id, "hi", Utc::now());
        store.add_like(ada.id, post.id).await.unwrap();

        assert!(store.delete_post(post.id, ada.id).await.unwrap());
        assert!(!store.has_liked(ada.id, post.id).await.unwrap());
    }
}
