//! In-memory blob store

use super::traits::{BlobStore, StoredObject};
use super::{check_object_path, hex_sha256};
use crate::error::StorageError;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// An object held by [`MemoryBlobStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryObject {
    /// Object bytes
    pub body: Vec<u8>,
    /// Content type given at upload
    pub content_type: String,
    /// User metadata given at upload
    pub metadata: BTreeMap<String, String>,
    /// Version tag returned from the put
    pub etag: String,
}

/// Keeps objects in a map; contents are lost when the store is dropped
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<(String, String), MemoryObject>>,
}

impl MemoryBlobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a stored object
    pub async fn get(&self, bucket: &str, key: &str) -> Option<MemoryObject> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// All keys in `bucket`, sorted
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Number of stored objects across all buckets
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// True if nothing has been stored
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
        metadata: &BTreeMap<String, String>,
    ) -> Result<StoredObject, StorageError> {
        check_object_path(bucket, key)?;

        let etag = hex_sha256(body);
        self.objects.write().await.insert(
            (bucket.to_string(), key.to_string()),
            MemoryObject {
                body: body.to_vec(),
                content_type: content_type.to_string(),
                metadata: metadata.clone(),
                etag: etag.clone(),
            },
        );

        Ok(StoredObject { etag: Some(etag) })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
