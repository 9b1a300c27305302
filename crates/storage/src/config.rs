use std::path::PathBuf;
use std::sync::Arc;

use crate::local::LocalObjectStore;
use crate::s3::S3ObjectStore;
use crate::ObjectStore;

/// Bucket uploaded detection images are written to.
pub const DEFAULT_BUCKET: &str = "detection-images";

/// Which [`ObjectStore`] implementation backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    S3,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "s3" => Ok(StorageBackend::S3),
            other => Err(format!("unknown storage backend '{other}' (expected local or s3)")),
        }
    }
}

/// Object storage configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    /// Directory holding one subdirectory per bucket (local backend only).
    pub local_root: PathBuf,
    /// URL prefix objects are published under. The local store appends
    /// `/{bucket}/{key}`, S3 appends `/{key}`.
    pub public_base_url: Option<String>,
    pub s3_region: Option<String>,
}

impl StorageConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                          |
    /// |---------------------------|----------------------------------|
    /// | `STORAGE_BACKEND`         | `local`                          |
    /// | `STORAGE_BUCKET`          | `detection-images`               |
    /// | `STORAGE_LOCAL_ROOT`      | `./storage`                      |
    /// | `STORAGE_PUBLIC_BASE_URL` | local: `http://localhost:3000/storage`, s3: bucket URL |
    /// | `STORAGE_S3_REGION`       | from the AWS environment         |
    ///
    /// # Panics
    ///
    /// Panics if `STORAGE_BACKEND` names an unknown backend.
    pub fn from_env() -> Self {
        let backend: StorageBackend = std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".into())
            .parse()
            .unwrap_or_else(|e| panic!("Invalid STORAGE_BACKEND: {e}"));

        let bucket = std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.into());

        let local_root = std::env::var("STORAGE_LOCAL_ROOT")
            .unwrap_or_else(|_| "./storage".into())
            .into();

        let public_base_url = std::env::var("STORAGE_PUBLIC_BASE_URL")
            .ok()
            .filter(|s| !s.is_empty());

        let s3_region = std::env::var("STORAGE_S3_REGION")
            .ok()
            .filter(|s| !s.is_empty());

        Self {
            backend,
            bucket,
            local_root,
            public_base_url,
            s3_region,
        }
    }

    /// Defaults for a local store rooted at `root`.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackend::Local,
            bucket: DEFAULT_BUCKET.to_string(),
            local_root: root.into(),
            public_base_url: None,
            s3_region: None,
        }
    }
}

/// Construct the configured [`ObjectStore`].
pub async fn build_store(config: &StorageConfig) -> Arc<dyn ObjectStore> {
    match config.backend {
        StorageBackend::Local => {
            let base = config
                .public_base_url
                .as_deref()
                .unwrap_or("http://localhost:3000/storage");
            tracing::info!(root = %config.local_root.display(), bucket = %config.bucket, "Using local object store");
            Arc::new(LocalObjectStore::new(
                config.local_root.clone(),
                config.bucket.clone(),
                base,
            ))
        }
        StorageBackend::S3 => {
            tracing::info!(bucket = %config.bucket, "Using S3 object store");
            Arc::new(
                S3ObjectStore::connect(
                    config.bucket.clone(),
                    config.s3_region.clone(),
                    config.public_base_url.clone(),
                )
                .await,
            )
        }
    }
}
