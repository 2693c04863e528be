//! The harvesting pipeline and its façade
//!
//! [`DocHarvester`] owns the process-wide collaborators (HTTP fetcher, blob
//! uploader, link extractor, key namer) and the event channel. They are built
//! once and shared by every run; a run itself keeps no state between calls.
//!
//! Submodules:
//! - [`pipeline`] - Run orchestration and the state machine
//! - [`item`] - Per-candidate fetch, validate, name, upload
//! - [`ledger`] - Index-ordered outcome collection and report assembly

mod item;
mod ledger;
mod pipeline;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use pipeline::validate_input_url;

use crate::config::Config;
use crate::error::Result;
use crate::extract::LinkExtractor;
use crate::fetch::{HttpFetcher, ReqwestFetcher};
use crate::naming::KeyNamer;
use crate::storage::{self, BlobStore, BlobUploader};
use crate::types::Event;
use std::sync::Arc;

/// Buffered events per subscriber before the slowest one starts lagging
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Document harvester (cloneable - all fields are Arc-wrapped or cheap)
#[derive(Clone)]
pub struct DocHarvester {
    /// Configuration (wrapped in Arc for sharing across runs)
    pub(crate) config: Arc<Config>,
    /// Page and document fetcher
    pub(crate) fetcher: Arc<dyn HttpFetcher>,
    /// Upload front end bound to the configured bucket
    pub(crate) uploader: BlobUploader,
    /// Link extractor for the configured document kind
    pub(crate) extractor: Arc<LinkExtractor>,
    /// Storage key derivation
    pub(crate) namer: KeyNamer,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl DocHarvester {
    /// Create a harvester with the production fetcher and the configured blob store
    ///
    /// The configuration is validated first; a missing bucket or zero limit is
    /// reported here rather than on the first run.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use doc_harvester::{Config, DocHarvester};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = Config::default().with_env_overrides()?;
    /// let harvester = DocHarvester::new(config)?;
    ///
    /// let report = harvester.harvest("https://example.com/reports").await?;
    /// println!(
    ///     "{} of {} documents stored",
    ///     report.summary.successful, report.summary.total
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher: Arc<dyn HttpFetcher> = Arc::new(ReqwestFetcher::new(&config.fetch)?);
        let store = storage::store_from_config(&config.storage)?;
        Self::with_components(config, fetcher, store)
    }

    /// Create a harvester with caller-supplied fetch and storage capabilities
    pub fn with_components(
        config: Config,
        fetcher: Arc<dyn HttpFetcher>,
        store: Arc<dyn BlobStore>,
    ) -> Result<Self> {
        config.validate()?;

        let extractor = Arc::new(LinkExtractor::new(&config.document)?);
        let namer = KeyNamer::new(&config.storage, config.document.file_suffix.clone());
        let uploader =
            BlobUploader::new(store, config.storage.bucket.clone(), config.retry.clone());

        // Receivers are created per subscriber; the initial one is dropped
        let (event_tx, _rx) = tokio::sync::broadcast::channel(EVENT_CHANNEL_CAPACITY);

        tracing::debug!(
            bucket = %config.storage.bucket,
            max_items = config.batch.max_items,
            max_concurrent_items = config.batch.max_concurrent_items,
            "harvester ready"
        );

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            uploader,
            extractor,
            namer,
            event_tx,
        })
    }

    /// Subscribe to harvest events
    ///
    /// Each subscriber receives every event sent after it subscribed. A
    /// subscriber that falls more than the channel capacity behind receives
    /// `RecvError::Lagged` and skips ahead.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the configuration
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Emit an event to all subscribers
    ///
    /// Having no subscribers is not an error; the event is dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Spawn the REST API server in a background task
    ///
    /// The server listens on `api.bind_address` until the task is aborted.
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let harvester = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(harvester, config).await })
    }
}

impl std::fmt::Debug for DocHarvester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocHarvester")
            .field("uploader", &self.uploader)
            .field("namer", &self.namer)
            .finish_non_exhaustive()
    }
}
