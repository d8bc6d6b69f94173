//! Object storage for evidence assets.
//!
//! [`ObjectStore`] is the backend seam (GCS or S3). [`Uploader`] wraps a
//! backend and implements the pipeline's contract: upload publicly, derive
//! the storage URI, and turn every failure into `None`.

pub mod gcs;
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use firewatch_core::storage::storage_uri;

use crate::credentials::CredentialError;

pub use gcs::GcsStore;
pub use s3::S3Store;

/// Default bucket when neither `BUCKET_NAME` nor `GCS_BUCKET_NAME` is set.
const DEFAULT_BUCKET: &str = "fire-detection-evidence";

/// Default base URL for the Cloud Storage JSON API and public objects.
pub const DEFAULT_GCS_API_BASE: &str = "https://storage.googleapis.com";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("Upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Storage API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("S3 upload failed: {0}")]
    S3(String),
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Gcs,
    S3,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub gcs_api_base: String,
}

impl StorageConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var           | Default                                         |
    /// |-------------------|-------------------------------------------------|
    /// | `STORAGE_BACKEND` | `gcs` (`s3` selects Amazon S3)                  |
    /// | `BUCKET_NAME`     | `GCS_BUCKET_NAME`, then `fire-detection-evidence` |
    /// | `GCS_API_BASE`    | `https://storage.googleapis.com`                |
    pub fn from_env() -> Self {
        let backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "s3" => StorageBackend::S3,
            _ => StorageBackend::Gcs,
        };

        Self {
            backend,
            bucket: bucket_name(
                std::env::var("BUCKET_NAME").ok(),
                std::env::var("GCS_BUCKET_NAME").ok(),
            ),
            gcs_api_base: std::env::var("GCS_API_BASE")
                .unwrap_or_else(|_| DEFAULT_GCS_API_BASE.into())
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

/// First non-blank of the backend-neutral name and the legacy GCS name.
fn bucket_name(neutral: Option<String>, legacy: Option<String>) -> String {
    neutral
        .into_iter()
        .chain(legacy)
        .find(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BUCKET.into())
}

// ---------------------------------------------------------------------------
// ObjectStore
// ---------------------------------------------------------------------------

/// A bucket that can hold publicly readable objects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// URI scheme for storage URIs (`gs`, `s3`).
    fn scheme(&self) -> &'static str;

    fn bucket(&self) -> &str;

    /// Store `bytes` under `key`, readable by anyone, and return its public URL.
    async fn put_public(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;
}

// ---------------------------------------------------------------------------
// Uploader
// ---------------------------------------------------------------------------

/// Locations of a successfully uploaded object. Both are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub public_url: String,
    pub storage_uri: String,
}

#[derive(Clone)]
pub struct Uploader {
    store: Arc<dyn ObjectStore>,
}

impl Uploader {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Upload and return both locations, or `None` on any failure.
    pub async fn upload(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> Option<StoredObject> {
        let size = bytes.len();
        match self.store.put_public(key, bytes, content_type).await {
            Ok(public_url) => {
                let storage_uri = storage_uri(self.store.scheme(), self.store.bucket(), key);
                tracing::info!(key, size, storage_uri = %storage_uri, "Uploaded evidence");
                Some(StoredObject {
                    public_url,
                    storage_uri,
                })
            }
            Err(e) => {
                tracing::error!(key, error = %e, "Evidence upload failed");
                None
            }
        }
    }
}

/// Build the configured backend.
pub async fn build_store(
    config: &StorageConfig,
    credentials: Arc<crate::credentials::CredentialProvider>,
) -> Arc<dyn ObjectStore> {
    match config.backend {
        StorageBackend::Gcs => Arc::new(GcsStore::new(
            config.gcs_api_base.clone(),
            config.bucket.clone(),
            credentials,
        )),
        StorageBackend::S3 => Arc::new(S3Store::from_env(config.bucket.clone()).await),
    }
}
