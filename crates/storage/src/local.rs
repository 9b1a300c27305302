//! Object store backed by a local directory.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::{validate_key, ObjectStore, StorageError, StoredObject};

/// Stores objects as files under `{root}/{bucket}/{key}`.
///
/// The API serves `root` at the URL prefix given as `public_base_url`, so an
/// object's URL is `{public_base_url}/{bucket}/{key}`.
pub struct LocalObjectStore {
    root: PathBuf,
    bucket: String,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(&self.bucket).join(key)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        validate_key(key)?;
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(path = %path.display(), content_type, size = bytes.len(), "Stored object on disk");

        Ok(StoredObject {
            key: key.to_string(),
            public_url: self.public_url(key),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed object from disk");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{key}", self.public_base_url, self.bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "detection-images", "http://localhost:3000/storage/");

        let stored = store
            .put("u1/17-cam.jpg", b"jpeg-bytes", "image/jpeg")
            .await
            .unwrap();

        assert_eq!(
            stored.public_url,
            "http://localhost:3000/storage/detection-images/u1/17-cam.jpg"
        );
        let on_disk = std::fs::read(dir.path().join("detection-images/u1/17-cam.jpg")).unwrap();
        assert_eq!(on_disk, b"jpeg-bytes");
    }

    #[tokio::test]
    async fn delete_removes_file_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "detection-images", "http://x");
        store.put("u1/1-a.png", b"png", "image/png").await.unwrap();

        store.delete("u1/1-a.png").await.unwrap();
        assert!(!dir.path().join("detection-images/u1/1-a.png").exists());

        store.delete("u1/1-a.png").await.unwrap();
    }

    #[tokio::test]
    async fn put_rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "b", "http://x");
        let err = store.put("../evil", b"", "text/plain").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
