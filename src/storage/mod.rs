//! Object storage for release artifacts
//! Uses Apache Arrow object_store crate

use crate::config::S3Credentials;
use crate::hashing::{HashAlgorithm, get_hash};
use crate::naming::possible_names;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::{ObjectStore, path::Path as StoragePath};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No free name for '{key}' after {attempts} candidates")]
    NoFreeName { key: String, attempts: usize },

    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Metadata returned after upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMetadata {
    pub key: String,
    pub etag: Option<String>,
    pub size: usize,
    /// Identical content was already stored under `key`
    pub reused: bool,
}

/// Storage client wrapping object_store
#[derive(Clone)]
pub struct StorageClient {
    store: Arc<dyn ObjectStore>,
    pub bucket: String,
}

impl StorageClient {
    /// Create new storage client with any object_store backend
    pub fn new(store: Arc<dyn ObjectStore>, bucket: String) -> Self {
        Self { store, bucket }
    }

    /// S3 backend using explicit credentials, never the ambient AWS environment
    pub fn s3(credentials: S3Credentials<'_>) -> Result<Self> {
        let store = AmazonS3Builder::new()
            .with_bucket_name(credentials.bucket)
            .with_access_key_id(credentials.key_id)
            .with_secret_access_key(credentials.key_secret)
            .build()?;

        Ok(Self::new(Arc::new(store), credentials.bucket.to_string()))
    }

    /// Create in-memory storage for testing/development
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(object_store::memory::InMemory::new()),
            bucket: "balrogworker-local".to_string(),
        }
    }

    /// Public URL of `key` in this bucket
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.amazonaws.com/{}",
            self.bucket,
            key.trim_start_matches('/')
        )
    }

    /// Upload bytes to storage, replacing whatever is at `key`
    pub async fn upload(&self, key: &str, data: Bytes) -> Result<UploadMetadata> {
        let path = StoragePath::from(key);
        let size = data.len();

        let put_result = self.store.put(&path, data.into()).await?;

        tracing::info!(key, size, "Uploaded to storage");

        Ok(UploadMetadata {
            key: key.to_string(),
            etag: put_result.e_tag.clone(),
            size,
            reused: false,
        })
    }

    /// Download from storage
    pub async fn download(&self, key: &str) -> Result<Bytes> {
        let path = StoragePath::from(key);

        let result = match self.store.get(&path).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let bytes = result.bytes().await?;

        tracing::debug!(key, size = bytes.len(), "Downloaded from storage");

        Ok(bytes)
    }

    /// Upload `data` without overwriting a different artifact.
    ///
    /// Candidates from [`possible_names`] are probed in order. A key holding
    /// identical content is reused as-is; a key holding other content is
    /// skipped; the first free key receives the upload.
    pub async fn upload_unique(
        &self,
        key: &str,
        data: Bytes,
        max_suffix: i64,
    ) -> Result<UploadMetadata> {
        let candidates = possible_names(key, max_suffix);
        let digest = get_hash(&data, HashAlgorithm::Sha512);

        for candidate in &candidates {
            let existing = match self.download(candidate).await {
                Ok(existing) => existing,
                Err(StorageError::NotFound(_)) => return self.upload(candidate, data).await,
                Err(e) => return Err(e),
            };

            if get_hash(&existing, HashAlgorithm::Sha512) == digest {
                tracing::info!(key = %candidate, "Identical artifact already stored");
                return Ok(UploadMetadata {
                    key: candidate.clone(),
                    etag: None,
                    size: existing.len(),
                    reused: true,
                });
            }

            tracing::debug!(key = %candidate, "Name taken by different content");
        }

        Err(StorageError::NoFreeName {
            key: key.to_string(),
            attempts: candidates.len(),
        })
    }
}
