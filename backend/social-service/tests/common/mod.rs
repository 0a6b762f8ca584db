#![allow(dead_code)]

use social_service::config::{EngagementConfig, FeedConfig};
use social_service::repository::InMemoryStore;
use social_service::session::{SessionProvider, StaticAuthService};
use social_service::storage::InMemoryObjectStorage;
use social_service::{AppState, Repositories};
use std::sync::Arc;

pub const CDN: &str = "https://cdn.example.com/storage/v1/object/public/posts";

/// Services wired to in-memory backends
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub storage: Arc<InMemoryObjectStorage>,
    pub auth: Arc<StaticAuthService>,
    pub state: AppState,
    pub session: SessionProvider,
}

pub fn harness() -> Harness {
    harness_with(EngagementConfig::default())
}

pub fn harness_with(engagement: EngagementConfig) -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let storage = Arc::new(InMemoryObjectStorage::new(CDN));
    let auth = Arc::new(StaticAuthService::new());

    let state = AppState::new(
        Repositories::in_memory(store.clone()),
        storage.clone(),
        &FeedConfig::default(),
        &engagement,
    );
    let session = SessionProvider::new(auth.clone());

    Harness {
        store,
        storage,
        auth,
        state,
        session,
    }
}

/// Hand-built multipart body; each part is (name, optional filename, content type, bytes)
pub fn multipart_body(boundary: &str, parts: &[(&str, Option<&str>, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content_type, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}
