use crate::cache::QueryCache;
use crate::domain::models::EngagementAction;
use crate::error::{AppError, Result};
use crate::notify::Notice;
use crate::repository::{EngagementRepository, PostRepository};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// What an engagement action did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum EngagementOutcome {
    Deleted { post_id: Uuid },
    Liked { liked: bool },
    Bookmarked { bookmarked: bool },
    Reposted { already: bool },
    /// Accepted without persisting anything (toggles disabled)
    Ignored { action: EngagementAction },
}

impl EngagementOutcome {
    pub fn notice(&self) -> Notice {
        match self {
            EngagementOutcome::Deleted { .. } => Notice::success("Post deleted successfully"),
            EngagementOutcome::Liked { liked: true } => Notice::success("Post liked"),
            EngagementOutcome::Liked { liked: false } => Notice::success("Like removed"),
            EngagementOutcome::Bookmarked { bookmarked: true } => Notice::success("Post bookmarked"),
            EngagementOutcome::Bookmarked { bookmarked: false } => {
                Notice::success("Bookmark removed")
            }
            EngagementOutcome::Reposted { already: false } => Notice::success("Post reposted"),
            EngagementOutcome::Reposted { already: true } => {
                Notice::success("You have already reposted this post")
            }
            EngagementOutcome::Ignored { action } => Notice::success(format!("Post {}", past_tense(*action))),
        }
    }
}

fn past_tense(action: EngagementAction) -> &'static str {
    match action {
        EngagementAction::Like => "liked",
        EngagementAction::Bookmark => "bookmarked",
        EngagementAction::Delete => "deleted",
        EngagementAction::Repost => "reposted",
    }
}

#[derive(Clone)]
pub struct EngagementService {
    posts: Arc<dyn PostRepository>,
    engagement: Arc<dyn EngagementRepository>,
    cache: Arc<QueryCache>,
    toggles_enabled: bool,
}

impl EngagementService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        engagement: Arc<dyn EngagementRepository>,
        cache: Arc<QueryCache>,
        toggles_enabled: bool,
    ) -> Self {
        Self {
            posts,
            engagement,
            cache,
            toggles_enabled,
        }
    }

    /// Dispatch `action` on `post_id` for `user_id`
    pub async fn perform(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        action: EngagementAction,
    ) -> Result<EngagementOutcome> {
        if action != EngagementAction::Delete && !self.toggles_enabled {
            return Ok(EngagementOutcome::Ignored { action });
        }

        let outcome = match action {
            EngagementAction::Delete => self.delete(user_id, post_id).await,
            EngagementAction::Like => self.toggle_like(user_id, post_id).await,
            EngagementAction::Bookmark => self.toggle_bookmark(user_id, post_id).await,
            EngagementAction::Repost => self.repost(user_id, post_id).await,
        }
        .map_err(|e| {
            error!(%user_id, %post_id, %action, "Error handling post action: {}", e);
            match e {
                AppError::NotFound(_) => AppError::NotFound("Post not found".to_string()),
                other => other.user_facing(format!("Failed to {} post", action)),
            }
        })?;

        if outcome != (EngagementOutcome::Reposted { already: true }) {
            self.cache.invalidate_posts();
        }
        Ok(outcome)
    }

    async fn delete(&self, user_id: Uuid, post_id: Uuid) -> Result<EngagementOutcome> {
        let post = self
            .posts
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        if post.user_id != user_id {
            return Err(AppError::Forbidden(
                "You can only delete your own posts".to_string(),
            ));
        }

        if !self.posts.delete_post(post_id, user_id).await? {
            // removed concurrently between the lookup and the delete
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        info!(%post_id, %user_id, "post deleted");
        Ok(EngagementOutcome::Deleted { post_id })
    }

    async fn toggle_like(&self, user_id: Uuid, post_id: Uuid) -> Result<EngagementOutcome> {
        let liked = if self.engagement.has_liked(user_id, post_id).await? {
            self.engagement.remove_like(user_id, post_id).await?;
            false
        } else {
            self.engagement.add_like(user_id, post_id).await?;
            true
        };
        Ok(EngagementOutcome::Liked { liked })
    }

    async fn toggle_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<EngagementOutcome> {
        let bookmarked = if self.engagement.has_bookmarked(user_id, post_id).await? {
            self.engagement.remove_bookmark(user_id, post_id).await?;
            false
        } else {
            self.engagement.add_bookmark(user_id, post_id).await?;
            true
        };
        Ok(EngagementOutcome::Bookmarked { bookmarked })
    }

    async fn repost(&self, user_id: Uuid, post_id: Uuid) -> Result<EngagementOutcome> {
        let inserted = self.engagement.add_repost(user_id, post_id).await?;
        Ok(EngagementOutcome::Reposted { already: !inserted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;
    use chrono::Utc;
    use std::time::Duration;

    fn service(store: Arc<InMemoryStore>, toggles_enabled: bool) -> EngagementService {
        EngagementService::new(
            store.clone(),
            store,
            Arc::new(QueryCache::new(Duration::from_secs(30))),
            toggles_enabled,
        )
    }

    #[tokio::test]
    async fn test_like_toggles() {
        let store = Arc::new(InMemoryStore::new());
        let ada = store.seed_profile("ada");
        let post = store.seed_post(ada.id, "hi", Utc::now());
        let svc = service(store.clone(), true);

        let first = svc.perform(ada.id, post.id, EngagementAction::Like).await.unwrap();
        assert_eq!(first, EngagementOutcome::Liked { liked: true });
        assert_eq!(store.find_post(post.id).await.unwrap().unwrap().likes_count, 1);

        let second = svc.perform(ada.id, post.id, EngagementAction::Like).await.unwrap();
        assert_eq!(second, EngagementOutcome::Liked { liked: false });
        assert_eq!(store.find_post(post.id).await.unwrap().unwrap().likes_count, 0);
    }

    #[tokio::test]
    async fn test_bookmark_toggles() {
        let store = Arc::new(InMemoryStore::new());
        let ada = store.seed_profile("ada");
        let post = store.seed_post(ada.id, "hi", Utc::now());
        let svc = service(store.clone(), true);

        svc.perform(ada.id, post.id, EngagementAction::Bookmark).await.unwrap();
        assert!(store.has_bookmarked(ada.id, post.id).await.unwrap());
        let outcome = svc.perform(ada.id, post.id, EngagementAction::Bookmark).await.unwrap();
        assert_eq!(outcome, EngagementOutcome::Bookmarked { bookmarked: false });
    }

    #[tokio::test]
    async fn test_repost_once_per_user() {
        let store = Arc::new(InMemoryStore::new());
        let ada = store.seed_profile("ada");
        let bob = store.seed_profile("bob");
        let post = store.seed_post(ada.id, "hi", Utc::now());
        let svc = service(store.clone(), true);

        let first = svc.perform(bob.id, post.id, EngagementAction::Repost).await.unwrap();
        let again = svc.perform(bob.id, post.id, EngagementAction::Repost).await.unwrap();
        assert_eq!(first, EngagementOutcome::Reposted { already: false });
        assert_eq!(again, EngagementOutcome::Reposted { already: true });
        assert_eq!(store.find_post(post.id).await.unwrap().unwrap().reposts_count, 1);
    }

    #[tokio::test]
    async fn test_delete_requires_author() {
        let store = Arc::new(InMemoryStore::new());
        let ada = store.seed_profile("ada");
        let bob = store.seed_profile("bob");
        let post = store.seed_post(ada.id, "mine", Utc::now());
        let svc = service(store.clone(), true);

        let err = svc
            .perform(bob.id, post.id, EngagementAction::Delete)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(store.find_post(post.id).await.unwrap().is_some());

        let outcome = svc.perform(ada.id, post.id, EngagementAction::Delete).await.unwrap();
        assert_eq!(outcome.notice().message, "Post deleted successfully");
        assert!(store.find_post(post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_post() {
        let store = Arc::new(InMemoryStore::new());
        let ada = store.seed_profile("ada");
        let svc = service(store, true);

        for action in [EngagementAction::Delete, EngagementAction::Like] {
            let err = svc.perform(ada.id, Uuid::new_v4(), action).await.unwrap_err();
            assert_eq!(err.user_message(), "Post not found");
        }
    }

    #[tokio::test]
    async fn test_disabled_toggles_persist_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let ada = store.seed_profile("ada");
        let post = store.seed_post(ada.id, "hi", Utc::now());
        let svc = service(store.clone(), false);

        let outcome = svc.perform(ada.id, post.id, EngagementAction::Like).await.unwrap();
        assert_eq!(outcome, EngagementOutcome::Ignored { action: EngagementAction::Like });
        assert!(!store.has_liked(ada.id, post.id).await.unwrap());

        // delete is unaffected by the toggle switch
        svc.perform(ada.id, post.id, EngagementAction::Delete).await.unwrap();
        assert!(store.find_post(post.id).await.unwrap().is_none());
    }
}
