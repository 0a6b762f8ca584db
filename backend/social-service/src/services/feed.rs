use crate::cache::{QueryCache, QueryKey};
use crate::domain::models::{FeedPost, FeedQuery};
use crate::error::Result;
use crate::repository::PostRepository;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Read side of the post list: home feed and per-author lists
#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    cache: Arc<QueryCache>,
    page_size: Option<i64>,
}

impl FeedService {
    pub fn new(posts: Arc<dyn PostRepository>, cache: Arc<QueryCache>, page_size: Option<i64>) -> Self {
        Self {
            posts,
            cache,
            page_size,
        }
    }

    /// All posts, newest first, with the viewer's like/bookmark flags
    pub async fn home_feed(&self, viewer: Option<Uuid>) -> Result<Vec<FeedPost>> {
        self.load(
            QueryKey::Feed { viewer },
            FeedQuery {
                viewer,
                author: None,
                limit: self.page_size,
            },
        )
        .await
    }

    /// Posts of one author, newest first
    pub async fn author_posts(&self, author: Uuid, viewer: Option<Uuid>) -> Result<Vec<FeedPost>> {
        self.load(
            QueryKey::ProfilePosts { author, viewer },
            FeedQuery {
                viewer,
                author: Some(author),
                limit: self.page_size,
            },
        )
        .await
    }

    async fn load(&self, key: QueryKey, query: FeedQuery) -> Result<Vec<FeedPost>> {
        if let Some(posts) = self.cache.get::<Vec<FeedPost>>(&key) {
            return Ok(posts);
        }
        let generation = self.cache.generation();

        let rows = self.posts.list_feed(&query).await.map_err(|e| {
            error!(?query, "Error fetching posts: {}", e);
            e.user_facing("Failed to load posts")
        })?;

        let posts: Vec<FeedPost> = rows.into_iter().map(FeedPost::from).collect();
        self.cache.put_if_current(key, &posts, generation);
        Ok(posts)
    }
}
