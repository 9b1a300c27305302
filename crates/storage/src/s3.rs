//! Object store backed by an S3 bucket.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

use crate::{validate_key, ObjectStore, StorageError, StoredObject};

/// Stores objects in `bucket`; URLs are `{public_base_url}/{key}`.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3ObjectStore {
    /// Build a client from the ambient AWS configuration (env, profile, IMDS).
    ///
    /// `region` overrides the ambient region. When `public_base_url` is not
    /// given, the virtual-hosted bucket URL is used.
    pub async fn connect(
        bucket: String,
        region: Option<String>,
        public_base_url: Option<String>,
    ) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let sdk_config = loader.load().await;

        let public_base_url = public_base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| match sdk_config.region() {
                Some(region) => format!("https://{bucket}.s3.{region}.amazonaws.com"),
                None => format!("https://{bucket}.s3.amazonaws.com"),
            });

        Self {
            client: aws_sdk_s3::Client::new(&sdk_config),
            bucket,
            public_base_url,
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        validate_key(key)?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes.to_vec()))
            .send()
            .await
            .map_err(|e| StorageError::S3(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!(bucket = %self.bucket, key, size = bytes.len(), "Stored object in S3");

        Ok(StoredObject {
            key: key.to_string(),
            public_url: self.public_url(key),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::S3(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!(bucket = %self.bucket, key, "Removed object from S3");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}
