/// Shared object storage utilities
///
/// Wraps an S3-compatible bucket (the hosted storage API speaks the S3
/// protocol) and resolves public URLs for uploaded objects.
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use std::sync::Arc;

pub mod config;
pub mod operations;

pub use config::S3Config;
pub use operations::S3Operations;

/// Errors raised by storage operations
#[derive(Debug, thiserror::Error)]
pub enum S3Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Upload failed for {key}: {message}")]
    Upload { key: String, message: String },

    #[error("Storage unreachable: {0}")]
    Unavailable(String),
}

pub type S3Result<T> = Result<T, S3Error>;

/// Shared S3 client wrapper
#[derive(Clone)]
pub struct S3Client {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Client {
    /// Create new S3 client with configuration from environment
    pub async fn new() -> S3Result<Self> {
        let config = S3Config::from_env()?;
        Ok(Self::with_config(config).await)
    }

    /// Create new S3 client with custom configuration
    pub async fn with_config(config: S3Config) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.path_style);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Arc::new(Client::from_conf(builder.build())),
            config,
        }
    }

    /// Get S3 configuration
    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Operations bound to the configured bucket
    pub fn operations(&self) -> S3Operations {
        S3Operations::new(self.client.clone(), self.config.clone())
    }

    /// Health check for S3 connectivity
    pub async fn health_check(&self) -> S3Result<()> {
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| S3Error::Unavailable(e.to_string()))?;

        Ok(())
    }
}
