//! Shared test helpers for creating DocHarvester instances in tests.

use crate::config::{Config, StorageBackend};
use crate::error::{FetchError, FetchFailure, StorageError};
use crate::fetch::HttpFetcher;
use crate::harvester::DocHarvester;
use crate::storage::{BlobStore, MemoryBlobStore, StoredObject};
use crate::types::{FetchOptions, FetchResult, ResponseHeaders};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) const PAGE_URL: &str = "https://docs.example.com/library/";

/// Canned reply for one URL
#[derive(Clone, Debug)]
enum Reply {
    Body {
        content_type: Option<String>,
        body: Vec<u8>,
    },
    Failure(FetchFailure),
}

/// [`HttpFetcher`] that serves canned replies and records what was requested
#[derive(Default)]
pub(crate) struct StubFetcher {
    replies: HashMap<String, Reply>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Serve `html` as the page at [`PAGE_URL`]
    pub(crate) fn with_page(self, html: impl Into<String>) -> Self {
        self.with_response(PAGE_URL, Some("text/html; charset=utf-8"), html.into().into_bytes())
    }

    /// Serve a PDF body at `url`
    pub(crate) fn with_pdf(self, url: &str, body: &[u8]) -> Self {
        self.with_response(url, Some("application/pdf"), body.to_vec())
    }

    pub(crate) fn with_response(
        mut self,
        url: &str,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> Self {
        self.replies.insert(
            url.to_string(),
            Reply::Body {
                content_type: content_type.map(str::to_string),
                body,
            },
        );
        self
    }

    pub(crate) fn with_failure(mut self, url: &str, failure: FetchFailure) -> Self {
        self.replies.insert(url.to_string(), Reply::Failure(failure));
        self
    }

    /// Delay the reply for `url`; a delay beyond the request timeout becomes a timeout
    pub(crate) fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl HttpFetcher for StubFetcher {
    async fn get(&self, url: &str, options: FetchOptions) -> Result<FetchResult, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        if let Some(delay) = self.delays.get(url).copied() {
            if delay > options.timeout {
                tokio::time::sleep(options.timeout).await;
                return Err(FetchError::new(url, FetchFailure::Timeout(options.timeout)));
            }
            tokio::time::sleep(delay).await;
        }

        match self.replies.get(url).cloned() {
            Some(Reply::Body { content_type, body }) => Ok(FetchResult {
                status: 200,
                headers: ResponseHeaders {
                    content_type,
                    content_length: Some(body.len() as u64),
                    ..ResponseHeaders::default()
                },
                body,
            }),
            Some(Reply::Failure(failure)) => Err(FetchError::new(url, failure)),
            None => Err(FetchError::new(url, FetchFailure::Status(404))),
        }
    }
}

/// Memory store that rejects keys containing a marker
pub(crate) struct RejectingStore {
    pub(crate) inner: MemoryBlobStore,
    marker: String,
}

impl RejectingStore {
    pub(crate) fn new(marker: &str) -> Self {
        Self {
            inner: MemoryBlobStore::new(),
            marker: marker.to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for RejectingStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
        metadata: &BTreeMap<String, String>,
    ) -> Result<StoredObject, StorageError> {
        if key.contains(&self.marker) {
            return Err(StorageError::Rejected {
                key: key.to_string(),
                reason: "HTTP 403: AccessDenied".to_string(),
            });
        }
        self.inner
            .put(bucket, key, body, content_type, metadata)
            .await
    }

    fn name(&self) -> &'static str {
        "rejecting"
    }
}

/// Config with a bucket and the memory backend
pub(crate) fn create_test_config() -> Config {
    let mut config = Config::default();
    config.storage.bucket = "documents".to_string();
    config.storage.backend = StorageBackend::Memory;
    config
}

/// An HTML page linking to each of `hrefs`, labeled "Document N"
pub(crate) fn links_page(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .enumerate()
        .map(|(i, href)| format!(r#"<li><a href="{href}">Document {}</a></li>"#, i + 1))
        .collect();
    format!("<html><body><ul>{anchors}</ul></body></html>")
}

/// Absolute URL of `name` relative to [`PAGE_URL`]
pub(crate) fn doc_url(name: &str) -> String {
    format!("{PAGE_URL}{name}")
}

/// Harvester over `fetcher` with a fresh memory store
pub(crate) fn create_test_harvester(
    config: Config,
    fetcher: Arc<StubFetcher>,
) -> (DocHarvester, Arc<MemoryBlobStore>) {
    let store = Arc::new(MemoryBlobStore::new());
    let harvester = DocHarvester::with_components(config, fetcher, store.clone()).unwrap();
    (harvester, store)
}
