//! Amazon S3 blob store
//!
//! Requests are signed with SigV4 by `object_store`. One client is built per
//! bucket on first use and reused afterwards; none of them keep idle pooled
//! connections.

use super::check_object_path;
use super::traits::{BlobStore, StoredObject};
use crate::error::{Error, Result, StorageError};
use async_trait::async_trait;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::{
    Attribute, AttributeValue, Attributes, ClientOptions, ObjectStore, PutOptions, PutPayload,
};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Stores objects in Amazon S3 or an S3-compatible service
///
/// User metadata becomes `x-amz-meta-*` object metadata with percent-encoded
/// values. The `ETag` returned by S3 becomes the version tag.
///
/// `object_store`'s own retries are disabled; [`BlobUploader`](super::BlobUploader)
/// applies the configured retry policy instead.
#[derive(Debug)]
pub struct S3BlobStore {
    builder: AmazonS3Builder,
    clients: Mutex<HashMap<String, Arc<AmazonS3>>>,
}

impl S3BlobStore {
    /// Create a store using credentials from the `AWS_*` environment
    ///
    /// `region` and `endpoint` override the environment when given. A plain
    /// `http://` endpoint is allowed for local S3-compatible services.
    pub fn new(region: Option<&str>, endpoint: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut builder = AmazonS3Builder::from_env();

        if let Some(region) = region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = endpoint {
            let parsed = url::Url::parse(endpoint).map_err(|e| {
                Error::config(
                    "storage.backend.endpoint",
                    format!("'{}' is not a valid URL: {}", endpoint, e),
                )
            })?;
            builder = builder
                .with_endpoint(endpoint.trim_end_matches('/'))
                .with_allow_http(parsed.scheme() == "http");
        }

        Ok(Self::from_builder(builder, timeout))
    }

    /// Create a store from a preconfigured builder (credentials, region, endpoint)
    ///
    /// The bucket name, client options, and retry settings of `builder` are
    /// replaced per bucket.
    pub fn from_builder(builder: AmazonS3Builder, timeout: Duration) -> Self {
        let client_options = ClientOptions::new()
            .with_timeout(timeout)
            .with_pool_max_idle_per_host(0);
        let no_retries = object_store::RetryConfig {
            max_retries: 0,
            ..object_store::RetryConfig::default()
        };

        Self {
            builder: builder
                .with_client_options(client_options)
                .with_retry(no_retries),
            clients: Mutex::new(HashMap::new()),
        }
    }

    fn client_for(&self, bucket: &str) -> std::result::Result<Arc<AmazonS3>, StorageError> {
        let mut clients = self
            .clients
            .lock()
            .map_err(|_| StorageError::Unavailable("S3 client cache poisoned".to_string()))?;

        if let Some(client) = clients.get(bucket) {
            return Ok(client.clone());
        }

        let client = self
            .builder
            .clone()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| StorageError::Unavailable(format!("S3 client for '{}': {}", bucket, e)))?;
        let client = Arc::new(client);
        clients.insert(bucket.to_string(), client.clone());
        Ok(client)
    }
}

/// Content type plus user metadata as `object_store` attributes
fn object_attributes(content_type: &str, metadata: &BTreeMap<String, String>) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert(
        Attribute::ContentType,
        AttributeValue::from(content_type.to_string()),
    );
    for (name, value) in metadata {
        attributes.insert(
            Attribute::Metadata(Cow::Owned(name.to_ascii_lowercase())),
            AttributeValue::from(urlencoding::encode(value).into_owned()),
        );
    }
    attributes
}

fn map_object_store_error(key: &str, e: object_store::Error) -> StorageError {
    match e {
        // Transport failures and server errors surface as Generic
        object_store::Error::Generic { .. } => StorageError::Unavailable(e.to_string()),
        object_store::Error::InvalidPath { .. } => StorageError::InvalidKey {
            key: key.to_string(),
            reason: e.to_string(),
        },
        other => StorageError::Rejected {
            key: key.to_string(),
            reason: other.to_string(),
        },
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
        metadata: &BTreeMap<String, String>,
    ) -> std::result::Result<StoredObject, StorageError> {
        check_object_path(bucket, key)?;

        let location = ObjectPath::parse(key).map_err(|e| StorageError::InvalidKey {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        let client = self.client_for(bucket)?;

        let options = PutOptions {
            attributes: object_attributes(content_type, metadata),
            ..PutOptions::default()
        };
        let result = client
            .put_opts(&location, PutPayload::from(body.to_vec()), options)
            .await
            .map_err(|e| map_object_store_error(key, e))?;

        Ok(StoredObject { etag: result.e_tag })
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}
