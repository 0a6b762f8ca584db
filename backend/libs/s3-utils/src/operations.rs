/// S3 operations for post media
use crate::config::S3Config;
use crate::{S3Error, S3Result};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct S3Operations {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Operations {
    pub fn new(client: Arc<Client>, config: S3Config) -> Self {
        Self { client, config }
    }

    /// Upload an object and return its public URL
    pub async fn upload_file(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> S3Result<String> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| S3Error::Upload {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        debug!(key, size, "object uploaded");
        Ok(self.config.public_url(key))
    }

    pub fn config(&self) -> &S3Config {
        &self.config
    }
}
