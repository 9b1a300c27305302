//! Object storage for uploaded detection images.
//!
//! [`ObjectStore`] is the seam between the API and the storage backend:
//! bytes go in under a key, a publicly reachable URL comes out. Two backends
//! are provided, a local directory ([`local::LocalObjectStore`]) served by the
//! API itself, and an S3 bucket ([`s3::S3ObjectStore`]).

use async_trait::async_trait;

pub mod config;
pub mod local;
pub mod s3;

pub use config::{build_store, StorageBackend, StorageConfig, DEFAULT_BUCKET};

/// Errors from the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid object key '{0}'")]
    InvalidKey(String),

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 request failed: {0}")]
    S3(String),
}

/// Location of an object after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub public_url: String,
}

/// A bucket-like store addressed by `/`-separated keys.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `bytes` under `key`, replacing any existing object.
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;

    /// Remove the object under `key`. Removing a missing object succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Public URL an object under `key` is (or would be) reachable at.
    fn public_url(&self, key: &str) -> String;
}

/// Key for an uploaded detection image: `{user}/{unix_millis}-{file_name}`.
pub fn detection_image_key(user: impl std::fmt::Display, unix_millis: i64, file_name: &str) -> String {
    format!("{user}/{unix_millis}-{}", sanitize_file_name(file_name))
}

/// Reduce an uploaded file name to `[A-Za-z0-9._-]`, never empty or hidden.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Reject keys that could escape the bucket.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if bad {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
