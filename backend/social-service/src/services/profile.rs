use crate::cache::{QueryCache, QueryKey};
use crate::domain::models::{FeedPost, FollowOutcome, Profile};
use crate::error::{AppError, Result};
use crate::notify::Notice;
use crate::repository::{FollowRepository, ProfileRepository};
use crate::services::feed::FeedService;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

pub const DEFAULT_TRENDING_LIMIT: i64 = 5;

/// Tabs of the profile page; analytics only for the owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileTab {
    Posts,
    Replies,
    Media,
    Videos,
    Likes,
    Analytics,
}

impl FollowOutcome {
    pub fn notice(&self) -> Notice {
        match self {
            FollowOutcome::Followed => Notice::success("Successfully followed user"),
            FollowOutcome::AlreadyFollowing => Notice::error("You are already following this user"),
        }
    }
}

#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    follows: Arc<dyn FollowRepository>,
    feed: FeedService,
    cache: Arc<QueryCache>,
}

impl ProfileService {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        follows: Arc<dyn FollowRepository>,
        feed: FeedService,
        cache: Arc<QueryCache>,
    ) -> Self {
        Self {
            profiles,
            follows,
            feed,
            cache,
        }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<Profile> {
        let key = QueryKey::Profile(user_id);
        if let Some(profile) = self.cache.get::<Profile>(&key) {
            return Ok(profile);
        }
        let generation = self.cache.generation();

        let profile = self
            .profiles
            .find_profile(user_id)
            .await
            .map_err(|e| e.user_facing("Failed to load profile"))?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        self.cache.put_if_current(key, &profile, generation);
        Ok(profile)
    }

    pub async fn update_bio(&self, owner: Uuid, bio: Option<&str>) -> Result<Profile> {
        let bio = bio.map(str::trim).filter(|b| !b.is_empty());
        let profile = self
            .profiles
            .update_bio(owner, bio)
            .await
            .map_err(|e| e.user_facing("Failed to update profile"))?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        self.cache.invalidate_profile(owner);
        Ok(profile)
    }

    pub async fn update_avatar(&self, owner: Uuid, avatar_url: &str) -> Result<Profile> {
        let profile = self
            .profiles
            .update_avatar(owner, avatar_url)
            .await
            .map_err(|e| e.user_facing("Failed to update profile"))?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        self.cache.invalidate_profile(owner);
        // author avatars are embedded in feed entries
        self.cache.invalidate_posts();
        Ok(profile)
    }

    pub async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<FollowOutcome> {
        if follower_id == following_id {
            return Err(AppError::Validation("You cannot follow yourself".to_string()));
        }

        match self.follows.insert_follow(follower_id, following_id).await {
            Ok(_) => {
                info!(%follower_id, %following_id, "follow created");
                self.cache.invalidate_profile(following_id);
                Ok(FollowOutcome::Followed)
            }
            Err(AppError::Conflict(_)) => Ok(FollowOutcome::AlreadyFollowing),
            Err(AppError::NotFound(_)) => Err(AppError::NotFound("User not found".to_string())),
            Err(e) => {
                error!(%follower_id, %following_id, "Error following user: {}", e);
                Err(e.user_facing("Failed to follow user"))
            }
        }
    }

    pub async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool> {
        let removed = self
            .follows
            .delete_follow(follower_id, following_id)
            .await
            .map_err(|e| e.user_facing("Failed to unfollow user"))?;

        if removed {
            self.cache.invalidate_profile(following_id);
        }
        Ok(removed)
    }

    /// Profiles with the most followers
    pub async fn trending_users(&self, limit: Option<i64>) -> Result<Vec<Profile>> {
        let limit = limit.unwrap_or(DEFAULT_TRENDING_LIMIT).clamp(1, 50);
        let key = QueryKey::TrendingUsers;
        if let Some(mut profiles) = self.cache.get::<Vec<Profile>>(&key) {
            if profiles.len() >= limit as usize {
                profiles.truncate(limit as usize);
                return Ok(profiles);
            }
        }
        let generation = self.cache.generation();

        let profiles = self
            .profiles
            .trending(limit)
            .await
            .map_err(|e| e.user_facing("Failed to load trending users"))?;

        self.cache.put_if_current(key, &profiles, generation);
        Ok(profiles)
    }

    pub async fn user_posts(&self, author: Uuid, viewer: Option<Uuid>) -> Result<Vec<FeedPost>> {
        self.feed.author_posts(author, viewer).await
    }

    pub fn profile_tabs(&self, owner: Uuid, viewer: Option<Uuid>) -> Vec<ProfileTab> {
        let mut tabs = vec![
            ProfileTab::Posts,
            ProfileTab::Replies,
            ProfileTab::Media,
            ProfileTab::Videos,
            ProfileTab::Likes,
        ];
        if viewer == Some(owner) {
            tabs.push(ProfileTab::Analytics);
        }
        tabs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;
    use std::time::Duration;

    fn service(store: Arc<InMemoryStore>) -> ProfileService {
        let cache = Arc::new(QueryCache::new(Duration::from_secs(30)));
        let feed = FeedService::new(store.clone(), cache.clone(), None);
        ProfileService::new(store.clone(), store, feed, cache)
    }

    #[tokio::test]
    async fn test_duplicate_follow_is_reported() {
        let store = Arc::new(InMemoryStore::new());
        let ada = store.seed_profile("ada");
        let bob = store.seed_profile("bob");
        let svc = service(store.clone());

        let first = svc.follow(ada.id, bob.id).await.unwrap();
        assert_eq!(first, FollowOutcome::Followed);
        assert_eq!(first.notice().message, "Successfully followed user");
        assert_eq!(store.follow_count(), 1);

        let again = svc.follow(ada.id, bob.id).await.unwrap();
        assert_eq!(again, FollowOutcome::AlreadyFollowing);
        assert_eq!(again.notice().message, "You are already following this user");
        assert_eq!(store.follow_count(), 1);
    }

    #[tokio::test]
    async fn test_follow_updates_cached_profile() {
        let store = Arc::new(InMemoryStore::new());
        let ada = store.seed_profile("ada");
        let bob = store.seed_profile("bob");
        let svc = service(store);

        assert_eq!(svc.get_profile(bob.id).await.unwrap().follower_count, 0);
        svc.follow(ada.id, bob.id).await.unwrap();
        assert_eq!(svc.get_profile(bob.id).await.unwrap().follower_count, 1);

        assert!(svc.unfollow(ada.id, bob.id).await.unwrap());
        assert!(!svc.unfollow(ada.id, bob.id).await.unwrap());
        assert_eq!(svc.get_profile(bob.id).await.unwrap().follower_count, 0);
    }

    #[tokio::test]
    async fn test_follow_rejects_self_and_unknown() {
        let store = Arc::new(InMemoryStore::new());
        let ada = store.seed_profile("ada");
        let svc = service(store);

        assert!(matches!(
            svc.follow(ada.id, ada.id).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            svc.follow(ada.id, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_trending_orders_by_followers() {
        let store = Arc::new(InMemoryStore::new());
        let ada = store.seed_profile("ada");
        let bob = store.seed_profile("bob");
        let cy = store.seed_profile("cy");
        let svc = service(store);

        svc.follow(ada.id, cy.id).await.unwrap();
        svc.follow(bob.id, cy.id).await.unwrap();
        svc.follow(cy.id, bob.id).await.unwrap();

        let names: Vec<_> = svc
            .trending_users(Some(2))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.username)
            .collect();
        assert_eq!(names, vec!["cy", "bob"]);
    }

    #[tokio::test]
    async fn test_bio_update_and_tabs() {
        let store = Arc::new(InMemoryStore::new());
        let ada = store.seed_profile("ada");
        let svc = service(store);

        let updated = svc.update_bio(ada.id, Some("  rustacean ")).await.unwrap();
        assert_eq!(updated.bio.as_deref(), Some("rustacean"));
        assert_eq!(svc.get_profile(ada.id).await.unwrap().bio.as_deref(), Some("rustacean"));

        assert!(svc.profile_tabs(ada.id, Some(ada.id)).contains(&ProfileTab::Analytics));
        assert!(!svc.profile_tabs(ada.id, None).contains(&ProfileTab::Analytics));
        assert!(!svc
            .profile_tabs(ada.id, Some(Uuid::new_v4()))
            .contains(&ProfileTab::Analytics));
    }

    #[tokio::test]
    async fn test_missing_profile() {
        let store = Arc::new(InMemoryStore::new());
        let svc = service(store);
        let err = svc.get_profile(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.user_message(), "Profile not found");
    }
}
