//! HTTP blob store for plain object gateways
//!
//! The requests are not SigV4-signed, so this backend suits gateways that
//! accept a static `Authorization` header (or none), such as an internal
//! object proxy or a presigned-upload front end. Use the `s3` backend to
//! talk to Amazon S3 itself.

use super::check_object_path;
use super::traits::{BlobStore, StoredObject};
use crate::error::{Error, Result, StorageError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

/// Stores objects with `PUT {endpoint}/{bucket}/{key}`
///
/// User metadata is sent as `{prefix}{name}` headers (`x-amz-meta-` by
/// default) with percent-encoded values, so non-ASCII original filenames
/// survive the trip. The `ETag` response header becomes the version tag.
///
/// Status handling: 2xx is success; 408, 429, and 5xx are reported as
/// [`StorageError::Unavailable`] (retryable); any other status is
/// [`StorageError::Rejected`].
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    client: reqwest::Client,
    endpoint: String,
    auth_header: Option<String>,
    metadata_header_prefix: String,
    timeout: Duration,
}

impl HttpBlobStore {
    /// Create a store for `endpoint`
    pub fn new(
        endpoint: &str,
        auth_header: Option<String>,
        metadata_header_prefix: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let endpoint = endpoint.trim_end_matches('/');
        let parsed = url::Url::parse(endpoint).map_err(|e| {
            Error::config(
                "storage.backend.endpoint",
                format!("'{}' is not a valid URL: {}", endpoint, e),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(
                "storage.backend.endpoint",
                format!("'{}' must use http or https", endpoint),
            ));
        }

        // Same as the fetcher: no idle connection outlives the request
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            auth_header,
            metadata_header_prefix: metadata_header_prefix.to_ascii_lowercase(),
            timeout,
        })
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        let encoded_key = key
            .split('/')
            .map(|part| urlencoding::encode(part).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/{}/{}",
            self.endpoint,
            urlencoding::encode(bucket),
            encoded_key
        )
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
        metadata: &BTreeMap<String, String>,
    ) -> std::result::Result<StoredObject, StorageError> {
        check_object_path(bucket, key)?;

        let url = self.object_url(bucket, key);
        let mut request = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body.to_vec());

        for (name, value) in metadata {
            request = request.header(
                format!("{}{}", self.metadata_header_prefix, name.to_ascii_lowercase()),
                urlencoding::encode(value).into_owned(),
            );
        }
        if let Some(auth) = &self.auth_header {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                StorageError::Unavailable(format!("PUT {} timed out after {:?}", url, self.timeout))
            } else if e.is_builder() {
                StorageError::InvalidKey {
                    key: key.to_string(),
                    reason: e.to_string(),
                }
            } else {
                StorageError::Unavailable(format!("PUT {} failed: {}", url, e))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            let etag = response
                .headers()
                .get(reqwest::header::ETAG)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            return Ok(StoredObject { etag });
        }

        let body = response.text().await.unwrap_or_default();
        let reason = if body.trim().is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            format!("HTTP {}: {}", status.as_u16(), truncate(body.trim(), 200))
        };

        if status.is_server_error()
            || status == reqwest::StatusCode::REQUEST_TIMEOUT
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            Err(StorageError::Unavailable(reason))
        } else {
            Err(StorageError::Rejected {
                key: key.to_string(),
                reason,
            })
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
