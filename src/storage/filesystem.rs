//! Filesystem-backed blob store

use super::traits::{BlobStore, StoredObject};
use super::{check_object_path, hex_sha256};
use crate::error::StorageError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Suffix of the metadata sidecar written next to each object
const SIDECAR_SUFFIX: &str = ".meta.json";

/// Contents of an object's metadata sidecar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSidecar {
    /// Content type given at upload
    pub content_type: String,
    /// User metadata given at upload
    pub metadata: BTreeMap<String, String>,
    /// Hex SHA-256 of the object body
    pub etag: String,
    /// Object size in bytes
    pub size_bytes: u64,
}

/// Stores objects as files under `root/<bucket>/<key>`
///
/// Each object gets a `<key>.meta.json` sidecar with its content type,
/// metadata, and SHA-256 etag. Key components map to directories.
#[derive(Debug, Clone)]
pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    /// Create a store rooted at `root`; directories are created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path an object is (or would be) written to
    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        let mut path = self.root.join(bucket);
        for part in key.split('/') {
            path.push(part);
        }
        path
    }

    /// Read back an object's sidecar
    pub async fn read_sidecar(&self, bucket: &str, key: &str) -> Option<ObjectSidecar> {
        let raw = tokio::fs::read(sidecar_path(&self.object_path(bucket, key)))
            .await
            .ok()?;
        serde_json::from_slice(&raw).ok()
    }
}

fn sidecar_path(object_path: &Path) -> PathBuf {
    let mut name = object_path.as_os_str().to_owned();
    name.push(SIDECAR_SUFFIX);
    PathBuf::from(name)
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
        metadata: &BTreeMap<String, String>,
    ) -> Result<StoredObject, StorageError> {
        check_object_path(bucket, key)?;

        let io_err = |e: std::io::Error| StorageError::Io {
            key: key.to_string(),
            reason: e.to_string(),
        };

        let path = self.object_path(bucket, key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let etag = hex_sha256(body);
        let sidecar = ObjectSidecar {
            content_type: content_type.to_string(),
            metadata: metadata.clone(),
            etag: etag.clone(),
            size_bytes: body.len() as u64,
        };
        let sidecar_json = serde_json::to_vec_pretty(&sidecar).map_err(|e| StorageError::Io {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        tokio::fs::write(&path, body).await.map_err(io_err)?;
        tokio::fs::write(sidecar_path(&path), sidecar_json)
            .await
            .map_err(io_err)?;

        tracing::debug!(path = ?path, size_bytes = body.len(), "object written");

        Ok(StoredObject { etag: Some(etag) })
    }

    fn name(&self) -> &'static str {
        "filesystem"
    }
}
