//! Upload front end for a [`BlobStore`]

use super::traits::BlobStore;
use crate::config::RetryConfig;
use crate::error::StorageError;
use crate::retry::with_retry;
use crate::types::{UploadMetadata, UploadOutcome};
use std::sync::Arc;

/// Uploads documents into one bucket of a [`BlobStore`]
///
/// Every attempt of a retried upload uses the same key, so a retry after a
/// partial failure overwrites rather than duplicates.
#[derive(Clone)]
pub struct BlobUploader {
    store: Arc<dyn BlobStore>,
    bucket: String,
    retry: RetryConfig,
}

impl BlobUploader {
    /// Create an uploader targeting `bucket`
    pub fn new(store: Arc<dyn BlobStore>, bucket: impl Into<String>, retry: RetryConfig) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            retry,
        }
    }

    /// Destination bucket
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    /// Store `body` under `storage_key` with `upload-date` and `original-name` metadata
    pub async fn put(
        &self,
        body: &[u8],
        storage_key: &str,
        content_type: &str,
        metadata: &UploadMetadata,
    ) -> Result<UploadOutcome, StorageError> {
        let pairs = metadata.to_pairs();

        let stored = with_retry(&self.retry, || {
            self.store
                .put(&self.bucket, storage_key, body, content_type, &pairs)
        })
        .await?;

        tracing::debug!(
            backend = self.store.name(),
            bucket = %self.bucket,
            key = %storage_key,
            etag = ?stored.etag,
            "upload complete"
        );

        Ok(UploadOutcome {
            storage_key: storage_key.to_string(),
            bucket: self.bucket.clone(),
            version_tag: stored.etag,
        })
    }
}

impl std::fmt::Debug for BlobUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobUploader")
            .field("backend", &self.store.name())
            .field("bucket", &self.bucket)
            .field("retry", &self.retry)
            .finish()
    }
}
