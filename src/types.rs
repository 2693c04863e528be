//! Core types for doc-harvester
//!
//! The report types ([`BatchReport`], [`ItemResult`], [`ItemError`]) are the wire
//! contract with presentation layers and serialize with camelCase field names.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use utoipa::ToSchema;

/// A document link discovered on the source page
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLink {
    /// Absolute URL of the document
    pub url: String,
    /// Trimmed anchor text, or the configured placeholder when empty
    pub label: String,
}

/// How a response body will be consumed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseKind {
    /// Decoded text (charset-aware), stored as UTF-8 bytes
    Text,
    /// Raw bytes exactly as received
    Binary,
}

/// Per-call fetch options
#[derive(Clone, Copy, Debug)]
pub struct FetchOptions {
    /// Timeout for the whole request, body included
    pub timeout: Duration,
    /// How the body should be read
    pub kind: ResponseKind,
}

impl FetchOptions {
    /// Options for fetching an HTML page
    pub fn text(timeout: Duration) -> Self {
        Self {
            timeout,
            kind: ResponseKind::Text,
        }
    }

    /// Options for fetching a document
    pub fn binary(timeout: Duration) -> Self {
        Self {
            timeout,
            kind: ResponseKind::Binary,
        }
    }
}

/// Response headers the pipeline cares about
///
/// A header that was absent (or not valid UTF-8) is `None`. Names in `other`
/// are lower-cased; repeated headers keep the last value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    /// `Content-Type`
    pub content_type: Option<String>,
    /// `Content-Length`, when present and numeric
    pub content_length: Option<u64>,
    /// `Content-Disposition`
    pub content_disposition: Option<String>,
    /// `ETag`
    pub etag: Option<String>,
    /// `Last-Modified`
    pub last_modified: Option<String>,
    /// Every other header, lower-cased name to value
    pub other: BTreeMap<String, String>,
}

impl ResponseHeaders {
    /// Build from (name, value) pairs
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut headers = Self::default();
        for (name, value) in pairs {
            let name = name.to_ascii_lowercase();
            let value = value.to_string();
            match name.as_str() {
                "content-type" => headers.content_type = Some(value),
                "content-length" => headers.content_length = value.trim().parse().ok(),
                "content-disposition" => headers.content_disposition = Some(value),
                "etag" => headers.etag = Some(value),
                "last-modified" => headers.last_modified = Some(value),
                _ => {
                    headers.other.insert(name, value);
                }
            }
        }
        headers
    }
}

/// A completed HTTP response
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResult {
    /// HTTP status code (always 2xx; other statuses become errors)
    pub status: u16,
    /// Parsed response headers
    pub headers: ResponseHeaders,
    /// Response body
    pub body: Vec<u8>,
}

impl FetchResult {
    /// Body as text (lossy for invalid UTF-8)
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Body length in bytes
    pub fn size_bytes(&self) -> u64 {
        self.body.len() as u64
    }
}

/// Descriptive metadata stored alongside each object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    /// RFC 3339 upload time
    pub upload_date: String,
    /// Filename before sanitization
    pub original_name: String,
}

impl UploadMetadata {
    /// Metadata as the `upload-date` / `original-name` pairs object stores expect
    pub fn to_pairs(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("upload-date".to_string(), self.upload_date.clone()),
            ("original-name".to_string(), self.original_name.clone()),
        ])
    }
}

/// Result of a successful upload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    /// Key the object was stored under
    pub storage_key: String,
    /// Bucket the object was stored in
    pub bucket: String,
    /// Backend version tag (ETag)
    pub version_tag: Option<String>,
}

/// One successfully stored document
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
    /// URL the document was downloaded from
    pub original_url: String,
    /// Display filename (unsanitized)
    pub filename: String,
    /// Key in the blob store
    pub storage_key: String,
    /// Size of the stored body in bytes
    pub size_bytes: u64,
}

/// One candidate that could not be stored
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemError {
    /// URL of the failed candidate
    pub url: String,
    /// Human-readable reason
    pub error_message: String,
}

/// Aggregate counts for a run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BatchSummary {
    /// Candidates processed (after bounding)
    pub total: usize,
    /// Candidates stored
    pub successful: usize,
    /// Candidates that failed
    pub failed: usize,
}

/// The single return value of a completed harvest
///
/// `success` is true whenever the run got past page fetch and extraction, even
/// if every item failed. Callers distinguish a fatal run (an `Err`) from a run
/// with item failures (`success: true`, non-null `errors`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BatchReport {
    /// The batch mechanism completed
    pub success: bool,
    /// Authoritative counts
    pub summary: BatchSummary,
    /// Stored documents, in candidate order
    pub results: Vec<ItemResult>,
    /// Failed candidates in candidate order; `null` when there were none
    pub errors: Option<Vec<ItemError>>,
}

impl BatchReport {
    /// Failed items, treating `None` as empty
    pub fn errors(&self) -> &[ItemError] {
        self.errors.as_deref().unwrap_or_default()
    }
}

/// Request body for a harvest invocation
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct HarvestRequest {
    /// Page to scan for documents
    #[serde(default)]
    pub url: Option<String>,
}

/// Pipeline states, in order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Not started
    Idle,
    /// Downloading the target page
    FetchingPage,
    /// Parsing the page for links
    Extracting,
    /// Capping the candidate set
    Bounding,
    /// Working through candidates
    ProcessingItems,
    /// Building the report
    Finalizing,
    /// Report returned
    Done,
    /// Aborted by a fatal error
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::FetchingPage => "fetching_page",
            PipelineState::Extracting => "extracting",
            PipelineState::Bounding => "bounding",
            PipelineState::ProcessingItems => "processing_items",
            PipelineState::Finalizing => "finalizing",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Progress events broadcast while a harvest runs
///
/// Item indices are 1-based to match the `i/N` progress convention.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A run started
    HarvestStarted {
        /// Target page
        url: String,
    },

    /// Links were extracted and bounded
    LinksDiscovered {
        /// Candidates found on the page
        found: usize,
        /// Candidates that will be processed
        selected: usize,
    },

    /// An item started processing
    ItemStarted {
        /// 1-based position
        index: usize,
        /// Items in this run
        total: usize,
        /// Document URL
        url: String,
    },

    /// An item was stored
    ItemStored {
        /// 1-based position
        index: usize,
        /// Items in this run
        total: usize,
        /// Document URL
        url: String,
        /// Key in the blob store
        storage_key: String,
        /// Bytes stored
        size_bytes: u64,
    },

    /// An item failed
    ItemFailed {
        /// 1-based position
        index: usize,
        /// Items in this run
        total: usize,
        /// Document URL
        url: String,
        /// Reason
        error: String,
    },

    /// A run produced its report
    HarvestComplete {
        /// Target page
        url: String,
        /// Final counts
        summary: BatchSummary,
    },

    /// A run aborted with a fatal error
    HarvestFailed {
        /// Target page (as supplied)
        url: String,
        /// Reason
        error: String,
    },
}
