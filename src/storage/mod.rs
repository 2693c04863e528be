//! Blob storage for harvested documents
//!
//! The core abstraction is the [`BlobStore`] trait, a single `put` operation
//! that stores bytes with a content type and user metadata. Implementations:
//!
//! - [`FilesystemBlobStore`]: objects under `root/<bucket>/<key>` with a JSON sidecar
//! - `S3BlobStore`: Amazon S3 via `object_store` (cargo feature `s3`)
//! - [`HttpBlobStore`]: unsigned gateways accepting `PUT {endpoint}/{bucket}/{key}`
//! - [`MemoryBlobStore`]: in-process map for tests and demos
//!
//! [`BlobUploader`] sits in front of a store, fixes the bucket, attaches
//! upload metadata, and applies the retry policy.
//!
//! ## Usage
//!
//! ```
//! use doc_harvester::config::RetryConfig;
//! use doc_harvester::storage::{BlobUploader, MemoryBlobStore};
//! use doc_harvester::types::UploadMetadata;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryBlobStore::new());
//! let uploader = BlobUploader::new(store.clone(), "documents", RetryConfig::default());
//!
//! let metadata = UploadMetadata {
//!     upload_date: "2024-01-01T00:00:00Z".to_string(),
//!     original_name: "Report.pdf".to_string(),
//! };
//! let outcome = uploader
//!     .put(b"%PDF-1.7", "pdfs/1_report.pdf", "application/pdf", &metadata)
//!     .await?;
//!
//! assert_eq!(outcome.bucket, "documents");
//! assert!(store.get("documents", "pdfs/1_report.pdf").await.is_some());
//! # Ok(())
//! # }
//! ```

mod filesystem;
mod http;
mod memory;
#[cfg(feature = "s3")]
mod s3;
mod traits;
mod uploader;

pub use filesystem::{FilesystemBlobStore, ObjectSidecar};
pub use http::HttpBlobStore;
pub use memory::{MemoryBlobStore, MemoryObject};
#[cfg(feature = "s3")]
pub use s3::S3BlobStore;
pub use traits::{BlobStore, StoredObject};
pub use uploader::BlobUploader;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{Result, StorageError};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Build the blob store selected by `config.backend`
pub fn store_from_config(config: &StorageConfig) -> Result<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match &config.backend {
        StorageBackend::Filesystem { root } => Arc::new(FilesystemBlobStore::new(root.clone())),
        #[cfg(feature = "s3")]
        StorageBackend::S3 {
            region,
            endpoint,
            timeout,
        } => Arc::new(S3BlobStore::new(
            region.as_deref(),
            endpoint.as_deref(),
            *timeout,
        )?),
        #[cfg(not(feature = "s3"))]
        StorageBackend::S3 { .. } => {
            return Err(crate::error::Error::config(
                "storage.backend",
                "the s3 backend requires the `s3` cargo feature",
            ));
        }
        StorageBackend::Http {
            endpoint,
            auth_header,
            metadata_header_prefix,
            timeout,
        } => Arc::new(HttpBlobStore::new(
            endpoint,
            auth_header.clone(),
            metadata_header_prefix,
            *timeout,
        )?),
        StorageBackend::Memory => Arc::new(MemoryBlobStore::new()),
    };

    tracing::debug!(backend = store.name(), bucket = %config.bucket, "blob store ready");
    Ok(store)
}

/// Reject bucket names and keys that could escape their namespace
///
/// Empty strings, leading `/`, backslashes, and `.`/`..`/empty path components
/// are all refused.
pub(crate) fn check_object_path(bucket: &str, key: &str) -> std::result::Result<(), StorageError> {
    let invalid = |reason: &str| StorageError::InvalidKey {
        key: format!("{bucket}/{key}"),
        reason: reason.to_string(),
    };

    if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == "." || bucket == ".." {
        return Err(invalid("bucket must be a single non-empty path component"));
    }
    if key.is_empty() {
        return Err(invalid("key is empty"));
    }
    if key.contains('\\') {
        return Err(invalid("key contains a backslash"));
    }
    if key
        .split('/')
        .any(|part| part.is_empty() || part == "." || part == "..")
    {
        return Err(invalid("key has an empty, '.', or '..' component"));
    }
    Ok(())
}

/// Hex SHA-256 of `body`, used as the etag by local backends
pub(crate) fn hex_sha256(body: &[u8]) -> String {
    Sha256::digest(body)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path_accepts_generated_keys() {
        assert!(check_object_path("documents", "pdfs/1700000000000_report.pdf").is_ok());
        assert!(check_object_path("documents", "a").is_ok());
    }

    #[test]
    fn test_object_path_rejects_escapes() {
        for (bucket, key) in [
            ("", "pdfs/a.pdf"),
            ("..", "pdfs/a.pdf"),
            ("a/b", "pdfs/a.pdf"),
            ("documents", ""),
            ("documents", "/etc/passwd"),
            ("documents", "pdfs/../../x"),
            ("documents", "pdfs//a.pdf"),
            ("documents", "pdfs\\a.pdf"),
        ] {
            assert!(
                matches!(
                    check_object_path(bucket, key),
                    Err(StorageError::InvalidKey { .. })
                ),
                "{bucket}/{key} accepted"
            );
        }
    }

    #[test]
    fn test_store_from_config_selects_backend() {
        let mut config = StorageConfig::default();

        config.backend = StorageBackend::Memory;
        assert_eq!(store_from_config(&config).unwrap().name(), "memory");

        config.backend = StorageBackend::Filesystem {
            root: std::env::temp_dir(),
        };
        assert_eq!(store_from_config(&config).unwrap().name(), "filesystem");

        config.backend = StorageBackend::Http {
            endpoint: "https://objects.example.com".into(),
            auth_header: None,
            metadata_header_prefix: "x-amz-meta-".into(),
            timeout: std::time::Duration::from_secs(5),
        };
        assert_eq!(store_from_config(&config).unwrap().name(), "http");
    }

    #[cfg(feature = "s3")]
    #[test]
    fn test_store_from_config_builds_s3_backend() {
        let config = StorageConfig {
            bucket: "documents".into(),
            backend: StorageBackend::S3 {
                region: Some("eu-west-1".into()),
                endpoint: Some("http://127.0.0.1:9000".into()),
                timeout: std::time::Duration::from_secs(5),
            },
            ..StorageConfig::default()
        };

        assert_eq!(store_from_config(&config).unwrap().name(), "s3");
    }
}
