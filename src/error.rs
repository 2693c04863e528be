//! Error types for doc-harvester
//!
//! Errors fall into two groups:
//! - Fatal run errors ([`Error`]) that abort a harvest before any report exists
//!   (bad input, unreachable page, no documents on the page).
//! - Per-item failures ([`ItemFailure`]) that are recorded in the report and never
//!   abort the batch.
//!
//! The module also provides HTTP status mapping and a structured JSON error body
//! for the REST API.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for doc-harvester operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for doc-harvester
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid invocation input
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    /// The page could not be fetched, parsed, or held no documents
    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "batch.max_items")
        key: Option<String>,
    },

    /// HTTP client could not be built or used outside of a per-item fetch
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Invocation input errors
#[derive(Debug, Error)]
pub enum InputError {
    /// No URL was supplied, or it was blank
    #[error("URL is required")]
    MissingUrl,

    /// The URL could not be parsed or uses an unsupported scheme
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Page-level failures that make a harvest impossible
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The target page could not be fetched
    #[error("failed to fetch page: {0}")]
    PageUnreachable(#[source] FetchError),

    /// The base URL for link resolution is not an absolute URL
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The base URL that failed to parse
        url: String,
        /// Parser message
        reason: String,
    },

    /// The page parsed but contained no matching document links
    #[error("no {kind} links found on the page {url}")]
    NoDocumentsFound {
        /// The page that was scanned
        url: String,
        /// Human-readable document kind (e.g. "PDF")
        kind: String,
    },
}

/// A failed HTTP GET, for either the page or a single document
#[derive(Debug, Clone, Error, PartialEq)]
#[error("failed to fetch {url}: {cause}")]
pub struct FetchError {
    /// The URL that was requested
    pub url: String,
    /// What went wrong
    pub cause: FetchFailure,
}

impl FetchError {
    /// Create a new fetch error for `url`
    pub fn new(url: impl Into<String>, cause: FetchFailure) -> Self {
        Self {
            url: url.into(),
            cause,
        }
    }

    /// True if the request exceeded its timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self.cause, FetchFailure::Timeout(_))
    }
}

/// Cause of a [`FetchError`]
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchFailure {
    /// The request did not complete within its timeout
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with a non-success status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Connection, DNS, TLS, or protocol failure
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be read
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Response metadata did not match the expected document kind
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid content type: {}. expected {expected}", .observed.as_deref().unwrap_or("<missing>"))]
pub struct ValidationError {
    /// The marker that was required (e.g. "pdf")
    pub expected: String,
    /// The content type the server sent, if any
    pub observed: Option<String>,
}

/// Blob storage failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The backend rejected the object (e.g. HTTP 403 from an object gateway)
    #[error("storage backend rejected {key}: {reason}")]
    Rejected {
        /// Object key
        key: String,
        /// Backend message
        reason: String,
    },

    /// The backend could not be reached
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    /// Local I/O failure (filesystem backend)
    #[error("storage I/O error for {key}: {reason}")]
    Io {
        /// Object key
        key: String,
        /// Underlying I/O message
        reason: String,
    },

    /// The key or bucket cannot be stored by this backend
    #[error("invalid object key '{key}': {reason}")]
    InvalidKey {
        /// Object key
        key: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Why a single candidate could not be stored
///
/// Item failures are data, not control flow: the pipeline turns each into an
/// [`ItemError`](crate::types::ItemError) entry and moves on to the next candidate.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ItemFailure {
    /// Downloading the document failed
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// The response was not the expected document kind
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Uploading to the blob store failed
    #[error("failed to upload to storage: {0}")]
    Storage(#[from] StorageError),

    /// The batch deadline passed before this item finished
    #[error("timed out: batch deadline exceeded")]
    DeadlineExceeded,
}

/// API error response format
///
/// Returned by API endpoints when a harvest fails fatally.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "no_documents_found",
///     "message": "no PDF links found on the page https://example.com/",
///     "details": { "url": "https://example.com/" }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "missing_url", "page_unreachable")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - caller supplied bad input
            Error::Input(_) => 400,
            Error::Extraction(ExtractionError::InvalidBaseUrl { .. }) => 400,

            // 422 Unprocessable Entity - page fine, nothing to harvest
            Error::Extraction(ExtractionError::NoDocumentsFound { .. }) => 422,

            // 502 Bad Gateway - upstream page or HTTP client failed
            Error::Extraction(ExtractionError::PageUnreachable(_)) => 502,
            Error::Network(_) => 502,

            // 500 Internal Server Error
            Error::Config { .. } => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Input(e) => match e {
                InputError::MissingUrl => "missing_url",
                InputError::InvalidUrl { .. } => "invalid_url",
            },
            Error::Extraction(e) => match e {
                ExtractionError::PageUnreachable(_) => "page_unreachable",
                ExtractionError::InvalidBaseUrl { .. } => "invalid_base_url",
                ExtractionError::NoDocumentsFound { .. } => "no_documents_found",
            },
            Error::Config { .. } => "config_error",
            Error::Network(_) => "network_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Input(InputError::InvalidUrl { url, .. }) => Some(serde_json::json!({
                "url": url,
            })),
            Error::Extraction(ExtractionError::PageUnreachable(fetch)) => {
                Some(serde_json::json!({
                    "url": fetch.url,
                    "cause": fetch.cause.to_string(),
                }))
            }
            Error::Extraction(ExtractionError::NoDocumentsFound { url, .. })
            | Error::Extraction(ExtractionError::InvalidBaseUrl { url, .. }) => {
                Some(serde_json::json!({
                    "url": url,
                }))
            }
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
