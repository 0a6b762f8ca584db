/// Object storage configuration
use crate::{S3Error, S3Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Bucket holding post media
    pub bucket: String,
    /// AWS region (hosted storage accepts any value)
    pub region: String,
    /// Base URL objects are publicly served from
    pub base_url: String,
    /// Custom S3 endpoint for S3-compatible storage
    pub endpoint: Option<String>,
    /// Whether to use path-style URLs (false = virtual-hosted-style)
    pub path_style: bool,
}

impl S3Config {
    /// Load storage configuration from environment variables
    pub fn from_env() -> S3Result<Self> {
        let base_url = std::env::var("S3_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:9000".to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(S3Error::Config(format!(
                "S3_BASE_URL must be an http(s) URL, got {base_url}"
            )));
        }

        Ok(Self {
            bucket: std::env::var("S3_BUCKET").unwrap_or_else(|_| "posts".to_string()),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoint: std::env::var("S3_ENDPOINT").ok(),
            path_style: std::env::var("S3_PATH_STYLE")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        })
    }

    /// Public URL an uploaded object resolves to
    pub fn public_url(&self, key: &str) -> String {
        if self.path_style {
            format!("{}/{}/{}", self.base_url, self.bucket, key)
        } else {
            format!("{}/{}", self.base_url, key)
        }
    }
}
