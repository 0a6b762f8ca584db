//! Object storage for post media
use crate::error::{AppError, Result};
use async_trait::async_trait;
use s3_utils::{S3Client, S3Operations};
use std::collections::HashSet;
use std::sync::Mutex;

/// Accepts a path and a blob, returns the publicly resolvable URL
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<String>;
}

/// S3-compatible bucket (the hosted storage API)
#[derive(Clone)]
pub struct S3ObjectStorage {
    ops: S3Operations,
}

impl S3ObjectStorage {
    pub fn new(client: &S3Client) -> Self {
        Self {
            ops: client.operations(),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<String> {
        Ok(self.ops.upload_file(path, bytes, content_type).await?)
    }
}

/// Storage double that keeps uploads in memory
///
/// Paths ending in one of the registered suffixes fail, which lets tests
/// exercise partial upload failures.
pub struct InMemoryObjectStorage {
    base_url: String,
    uploads: Mutex<Vec<String>>,
    failing_suffixes: Mutex<HashSet<String>>,
}

impl InMemoryObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            uploads: Mutex::new(Vec::new()),
            failing_suffixes: Mutex::new(HashSet::new()),
        }
    }

    /// Reject uploads whose path ends with `suffix` (e.g. a file extension)
    pub fn fail_uploads_ending_with(&self, suffix: &str) {
        self.failing_suffixes
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(suffix.to_string());
    }

    /// Paths stored so far, in upload order
    pub fn uploaded_paths(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn upload(&self, path: &str, _content_type: &str, _bytes: Vec<u8>) -> Result<String> {
        let failing = self
            .failing_suffixes
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .any(|suffix| path.ends_with(suffix.as_str()));
        if failing {
            return Err(AppError::Storage(format!("upload rejected for {}", path)));
        }

        self.uploads
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(path.to_string());
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_upload_returns_public_url() {
        let storage = InMemoryObjectStorage::new("https://cdn.example.com/posts/");
        let url = storage
            .upload("user/abc.png", "image/png", vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/posts/user/abc.png");
        assert_eq!(storage.uploaded_paths(), vec!["user/abc.png".to_string()]);
    }

    #[tokio::test]
    async fn test_in_memory_upload_failure_injection() {
        let storage = InMemoryObjectStorage::new("https://cdn.example.com");
        storage.fail_uploads_ending_with(".mov");
        assert!(storage.upload("u/clip.mov", "video/quicktime", vec![]).await.is_err());
        assert!(storage.uploaded_paths().is_empty());
    }
}
