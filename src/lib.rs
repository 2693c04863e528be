//! # doc-harvester
//!
//! Collects every document of one kind (PDF by default) linked from a web page
//! and stores each in object storage, reporting per-document outcomes.
//!
//! ## How a run works
//!
//! 1. Fetch the page and extract anchors whose `href` mentions the document
//!    extension, resolved to absolute URLs in document order.
//! 2. Keep the first `batch.max_items` candidates.
//! 3. For each candidate: download, check the `Content-Type`, derive a
//!    storage key, upload with metadata. A failure affects that candidate only.
//! 4. Return a [`BatchReport`] listing every stored document and every failure.
//!
//! Failing to fetch the page, or finding no candidates, fails the run as a
//! whole with an [`Error`] instead of a report.
//!
//! ## Quick Start
//!
//! ```no_run
//! use doc_harvester::{Config, DocHarvester};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.storage.bucket = "documents".to_string();
//!
//!     let harvester = DocHarvester::new(config)?;
//!
//!     let mut events = harvester.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let report = harvester.harvest("https://example.com/reports/").await?;
//!     println!(
//!         "{} stored, {} failed",
//!         report.summary.successful, report.summary.failed
//!     );
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Document link extraction
pub mod extract;
/// HTTP fetching
pub mod fetch;
/// Pipeline orchestration and the harvester façade
pub mod harvester;
/// Filenames and storage keys
pub mod naming;
/// Retry logic with exponential backoff
pub mod retry;
/// Blob storage backends and the uploader
pub mod storage;
/// Core types and events
pub mod types;
/// Content-type validation
pub mod validate;

// Re-export commonly used types
pub use config::{Config, DocumentKind, KeyStrategy, StorageBackend};
pub use error::{
    ApiError, Error, ErrorDetail, ExtractionError, FetchError, InputError, ItemFailure, Result,
    StorageError, ToHttpStatus, ValidationError,
};
pub use fetch::{HttpFetcher, ReqwestFetcher};
pub use harvester::DocHarvester;
pub use storage::{BlobStore, BlobUploader};
pub use types::{
    BatchReport, BatchSummary, CandidateLink, Event, FetchResult, HarvestRequest, ItemError,
    ItemResult, PipelineState,
};
