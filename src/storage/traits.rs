//! Traits and types for blob storage

use crate::error::StorageError;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// What a backend reports after storing an object
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Backend version tag, if the backend produces one
    pub etag: Option<String>,
}

/// Durable object storage capability
///
/// A put with an existing `(bucket, key)` replaces the object. Implementations
/// must not partially apply a failed put in a way that a later successful put
/// to the same key cannot repair.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `body` under `bucket`/`key`
    ///
    /// # Arguments
    ///
    /// * `bucket` - Destination bucket
    /// * `key` - Object key, `/`-separated
    /// * `body` - Object bytes
    /// * `content_type` - MIME type recorded with the object
    /// * `metadata` - User metadata (e.g. `upload-date`, `original-name`)
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
        metadata: &BTreeMap<String, String>,
    ) -> Result<StoredObject, StorageError>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}
