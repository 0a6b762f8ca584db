//! Post composer
//!
//! `ComposeDraft` is the local state of the compose sheet. `PostComposer`
//! turns a draft into a post: media go to object storage first, then a
//! single post row is inserted with the URLs that made it.
use crate::cache::QueryCache;
use crate::domain::models::{FeedPost, NewPost};
use crate::error::{AppError, Result};
use crate::notify::Notice;
use crate::repository::{PostRepository, ProfileRepository};
use crate::storage::ObjectStorage;
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const EMPTY_DRAFT_MESSAGE: &str = "Please add some content or media to your post";
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create post. Please try again.";

/// A file picked in the composer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl MediaFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Text after the last '.', or the whole name when there is none
    pub fn extension(&self) -> &str {
        self.file_name.rsplit('.').next().unwrap_or(&self.file_name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComposeDraft {
    pub content: String,
    pub media: Vec<MediaFile>,
    pub mention: String,
    pub is_open: bool,
    pub is_submitting: bool,
}

impl ComposeDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Append files in order; returns how many were added
    pub fn add_media(&mut self, files: impl IntoIterator<Item = MediaFile>) -> usize {
        let before = self.media.len();
        self.media.extend(files);
        self.media.len() - before
    }

    pub fn remove_media(&mut self, index: usize) -> Option<MediaFile> {
        (index < self.media.len()).then(|| self.media.remove(index))
    }

    pub fn set_mention(&mut self, mention: impl Into<String>) {
        self.mention = mention.into();
    }

    /// Append the pending mention to the content and clear it
    pub fn apply_mention(&mut self) {
        if self.mention.is_empty() {
            return;
        }
        self.content.push_str(&format!(" @{} ", self.mention));
        self.mention.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty() && self.media.is_empty()
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.media.clear();
        self.mention.clear();
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComposeOutcome {
    pub post: FeedPost,
    /// One message per media file that could not be uploaded
    pub failed_uploads: Vec<String>,
}

impl ComposeOutcome {
    pub fn notice(&self) -> Notice {
        Notice::success("Post created successfully!")
    }
}

#[derive(Clone)]
pub struct PostComposer {
    posts: Arc<dyn PostRepository>,
    profiles: Arc<dyn ProfileRepository>,
    storage: Arc<dyn ObjectStorage>,
    cache: Arc<QueryCache>,
}

impl PostComposer {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        profiles: Arc<dyn ProfileRepository>,
        storage: Arc<dyn ObjectStorage>,
        cache: Arc<QueryCache>,
    ) -> Self {
        Self {
            posts,
            profiles,
            storage,
            cache,
        }
    }

    /// Publish the draft as `author_id`.
    ///
    /// On success the draft is cleared and closed; on failure it is left
    /// as it was so the user can retry.
    pub async fn submit(&self, author_id: Uuid, draft: &mut ComposeDraft) -> Result<ComposeOutcome> {
        if draft.is_empty() {
            return Err(AppError::Validation(EMPTY_DRAFT_MESSAGE.to_string()));
        }

        draft.is_submitting = true;
        let result = self.publish(author_id, draft).await;
        draft.is_submitting = false;

        let outcome = result?;
        draft.clear();
        draft.close();
        self.cache.invalidate_posts();
        Ok(outcome)
    }

    async fn publish(&self, author_id: Uuid, draft: &ComposeDraft) -> Result<ComposeOutcome> {
        let author = self
            .profiles
            .find_profile(author_id)
            .await
            .map_err(|e| e.user_facing(CREATE_FAILED_MESSAGE))?
            .ok_or_else(|| AppError::NotFound("Please sign in to create a post".to_string()))?;

        let mut media_urls = Vec::with_capacity(draft.media.len());
        let mut failed_uploads = Vec::new();
        for file in &draft.media {
            let path = format!("{}/{}.{}", author_id, Uuid::new_v4(), file.extension());
            match self
                .storage
                .upload(&path, &file.content_type, file.bytes.to_vec())
                .await
            {
                Ok(url) => media_urls.push(url),
                Err(e) => {
                    warn!(%author_id, file = %file.file_name, "Error uploading file: {}", e);
                    failed_uploads.push(format!("Failed to upload {}", file.file_name));
                }
            }
        }

        let post = self
            .posts
            .insert_post(&NewPost {
                user_id: author_id,
                content: draft.content.clone(),
                media_urls,
            })
            .await
            .map_err(|e| {
                error!(%author_id, "Error creating post: {}", e);
                AppError::Operation {
                    message: CREATE_FAILED_MESSAGE.to_string(),
                    source: Box::new(e),
                }
            })?;

        info!(post_id = %post.id, %author_id, media = post.media_urls.len(), "post created");
        Ok(ComposeOutcome {
            post: FeedPost::new_for_author(post, &author),
            failed_uploads,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;
    use crate::storage::InMemoryObjectStorage;
    use std::time::Duration;

    struct Fixture {
        store: Arc<InMemoryStore>,
        storage: Arc<InMemoryObjectStorage>,
        composer: PostComposer,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let storage = Arc::new(InMemoryObjectStorage::new("https://cdn.example.com/posts"));
        let composer = PostComposer::new(
            store.clone(),
            store.clone(),
            storage.clone(),
            Arc::new(QueryCache::new(Duration::from_secs(30))),
        );
        Fixture {
            store,
            storage,
            composer,
        }
    }

    #[test]
    fn test_extension_uses_last_dot() {
        assert_eq!(MediaFile::new("a.b.png", "image/png", Bytes::new()).extension(), "png");
        assert_eq!(MediaFile::new("README", "text/plain", Bytes::new()).extension(), "README");
    }

    #[test]
    fn test_draft_mentions_and_media() {
        let mut draft = ComposeDraft::new();
        draft.set_content("hi");
        draft.apply_mention();
        assert_eq!(draft.content, "hi");

        draft.set_mention("ada");
        draft.apply_mention();
        assert_eq!(draft.content, "hi @ada ");
        assert!(draft.mention.is_empty());

        let added = draft.add_media(vec![
            MediaFile::new("a.png", "image/png", vec![1u8]),
            MediaFile::new("b.mp4", "video/mp4", vec![2u8]),
        ]);
        assert_eq!(added, 2);
        assert_eq!(draft.remove_media(0).map(|f| f.file_name), Some("a.png".to_string()));
        assert_eq!(draft.remove_media(5), None);
        assert_eq!(draft.media.len(), 1);
    }

    #[test]
    fn test_whitespace_only_draft_is_empty() {
        let mut draft = ComposeDraft::new();
        draft.set_content("   \n");
        assert!(draft.is_empty());
        draft.add_media(vec![MediaFile::new("a.png", "image/png", Bytes::new())]);
        assert!(!draft.is_empty());
    }

    #[tokio::test]
    async fn test_empty_draft_is_rejected_without_writes() {
        let fx = fixture();
        let ada = fx.store.seed_profile("ada");
        let mut draft = ComposeDraft::new();
        draft.open();

        let err = fx.composer.submit(ada.id, &mut draft).await.unwrap_err();
        assert_eq!(err.user_message(), EMPTY_DRAFT_MESSAGE);
        assert_eq!(fx.store.post_insert_count(), 0);
        assert!(fx.storage.uploaded_paths().is_empty());
        assert!(draft.is_open);
    }

    #[tokio::test]
    async fn test_failed_insert_keeps_draft() {
        let fx = fixture();
        let ada = fx.store.seed_profile("ada");
        fx.store.fail_post_inserts(true);

        let mut draft = ComposeDraft::new();
        draft.open();
        draft.set_content("hello");

        let err = fx.composer.submit(ada.id, &mut draft).await.unwrap_err();
        assert_eq!(err.user_message(), CREATE_FAILED_MESSAGE);
        assert_eq!(draft.content, "hello");
        assert!(draft.is_open);
        assert!(!draft.is_submitting);
    }

    #[tokio::test]
    async fn test_upload_paths_are_scoped_to_author() {
        let fx = fixture();
        let ada = fx.store.seed_profile("ada");
        let mut draft = ComposeDraft::new();
        draft.add_media(vec![MediaFile::new("photo.jpeg", "image/jpeg", vec![1u8])]);

        let outcome = fx.composer.submit(ada.id, &mut draft).await.unwrap();
        let paths = fx.storage.uploaded_paths();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].starts_with(&format!("{}/", ada.id)));
        assert!(paths[0].ends_with(".jpeg"));
        assert_eq!(
            outcome.post.media_urls,
            vec![format!("https://cdn.example.com/posts/{}", paths[0])]
        );
    }
}
