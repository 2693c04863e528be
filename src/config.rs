//! Configuration types for doc-harvester

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

/// Environment variable naming the destination bucket
pub const BUCKET_ENV: &str = "DOC_HARVESTER_BUCKET";

/// Environment variable overriding the API bind address
pub const BIND_ADDRESS_ENV: &str = "DOC_HARVESTER_BIND_ADDRESS";

/// Browser identity sent with every request; some sites reject unidentified clients
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration for [`DocHarvester`](crate::DocHarvester)
///
/// Every field has a default, so an empty JSON object `{}` is a valid config
/// apart from the storage bucket, which must come from the config file or
/// [`BUCKET_ENV`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP fetch settings (timeouts, user agent)
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Which kind of document to harvest
    #[serde(default)]
    pub document: DocumentKind,

    /// Batch bounding, concurrency, and deadline
    #[serde(default)]
    pub batch: BatchConfig,

    /// Object storage destination
    #[serde(default)]
    pub storage: StorageConfig,

    /// Upload retry policy (disabled by default)
    #[serde(default)]
    pub retry: RetryConfig,

    /// Embedded REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load a JSON config file
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Apply overrides from the process environment
    ///
    /// - [`BUCKET_ENV`] replaces `storage.bucket`
    /// - [`BIND_ADDRESS_ENV`] replaces `api.bind_address`
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(bucket) = std::env::var(BUCKET_ENV)
            && !bucket.trim().is_empty()
        {
            self.storage.bucket = bucket.trim().to_string();
        }

        if let Ok(addr) = std::env::var(BIND_ADDRESS_ENV) {
            self.api.bind_address = addr.parse().map_err(|e| {
                Error::config(
                    "api.bind_address",
                    format!("{BIND_ADDRESS_ENV}='{addr}' is not a socket address: {e}"),
                )
            })?;
        }

        Ok(self)
    }

    /// Check the configuration for values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.batch.max_items == 0 {
            return Err(Error::config("batch.max_items", "must be at least 1"));
        }
        if self.batch.max_concurrent_items == 0 {
            return Err(Error::config(
                "batch.max_concurrent_items",
                "must be at least 1",
            ));
        }
        if self.batch.deadline.is_zero() {
            return Err(Error::config("batch.deadline", "must be greater than zero"));
        }
        if self.fetch.page_timeout.is_zero() || self.fetch.item_timeout.is_zero() {
            return Err(Error::config(
                "fetch",
                "page_timeout and item_timeout must be greater than zero",
            ));
        }
        if self.document.extension.trim().is_empty() {
            return Err(Error::config("document.extension", "must not be empty"));
        }
        if self.document.content_type_marker.trim().is_empty() {
            return Err(Error::config(
                "document.content_type_marker",
                "must not be empty",
            ));
        }
        let retry = &self.retry;
        if !retry.backoff_multiplier.is_finite() || retry.backoff_multiplier < 1.0 {
            return Err(Error::config(
                "retry.backoff_multiplier",
                format!("must be a finite number >= 1.0, got {}", retry.backoff_multiplier),
            ));
        }
        if retry.initial_delay > retry.max_delay {
            return Err(Error::config(
                "retry.initial_delay",
                format!(
                    "{:?} exceeds retry.max_delay {:?}",
                    retry.initial_delay, retry.max_delay
                ),
            ));
        }
        if self.storage.bucket.trim().is_empty() {
            return Err(Error::config(
                "storage.bucket",
                format!("no bucket configured (set it in the config or via {BUCKET_ENV})"),
            ));
        }
        Ok(())
    }
}

/// HTTP fetch configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Timeout for fetching the target page (default: 30 seconds)
    #[serde(default = "default_fetch_timeout", with = "duration_serde")]
    pub page_timeout: Duration,

    /// Timeout for each document download (default: 30 seconds)
    #[serde(default = "default_fetch_timeout", with = "duration_serde")]
    pub item_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_timeout: default_fetch_timeout(),
            item_timeout: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// The document kind being harvested
///
/// Defaults describe PDFs. Link selection, content validation, and fallback
/// filenames all derive from these values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentKind {
    /// Display name used in messages (default: "PDF")
    #[serde(default = "default_kind_name")]
    pub name: String,

    /// Extension matched against anchor hrefs (default: ".pdf")
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Case-insensitive marker the response content-type must contain (default: "pdf")
    #[serde(default = "default_content_type_marker")]
    pub content_type_marker: String,

    /// Content type recorded on stored objects (default: "application/pdf")
    #[serde(default = "default_stored_content_type")]
    pub stored_content_type: String,

    /// Suffix appended to label-derived filenames (default: ".pdf")
    #[serde(default = "default_extension")]
    pub file_suffix: String,

    /// Label used when an anchor has no visible text (default: "Unnamed PDF")
    #[serde(default = "default_fallback_label")]
    pub fallback_label: String,
}

impl Default for DocumentKind {
    fn default() -> Self {
        Self {
            name: default_kind_name(),
            extension: default_extension(),
            content_type_marker: default_content_type_marker(),
            stored_content_type: default_stored_content_type(),
            file_suffix: default_extension(),
            fallback_label: default_fallback_label(),
        }
    }
}

/// Batch bounding and scheduling configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of candidates processed per run (default: 10)
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Number of items processed concurrently (default: 1 = strictly sequential)
    #[serde(default = "default_max_concurrent_items")]
    pub max_concurrent_items: usize,

    /// Wall-clock budget for the whole run, page fetch included (default: 300 seconds)
    ///
    /// Items that have not finished when the deadline passes are recorded as failed.
    #[serde(default = "default_deadline", with = "duration_serde")]
    pub deadline: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
            max_concurrent_items: default_max_concurrent_items(),
            deadline: default_deadline(),
        }
    }
}

/// How storage keys are derived
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// `prefix + millis + "_" + filename` (default)
    ///
    /// Two items with the same filename stored in the same millisecond collide.
    #[default]
    Timestamp,
    /// `prefix + sha256(body)[..16] + "_" + filename`
    ContentHash,
}

/// Which blob store backend to use
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageBackend {
    /// Objects written under `root/<bucket>/<key>` with a JSON metadata sidecar
    Filesystem {
        /// Root directory
        root: PathBuf,
    },
    /// Amazon S3 (or a SigV4-speaking clone) through `object_store`
    ///
    /// Credentials come from the standard `AWS_*` environment variables or the
    /// instance profile.
    S3 {
        /// Region; falls back to `AWS_REGION`/`AWS_DEFAULT_REGION`
        #[serde(default)]
        region: Option<String>,
        /// Custom endpoint for S3-compatible services (e.g. MinIO)
        #[serde(default)]
        endpoint: Option<String>,
        /// Per-request timeout (default: 60 seconds)
        #[serde(default = "default_storage_timeout", with = "duration_serde")]
        timeout: Duration,
    },
    /// Unsigned object gateway accepting `PUT {endpoint}/{bucket}/{key}`
    Http {
        /// Base endpoint, e.g. `https://objects.example.com`
        endpoint: String,
        /// Optional Authorization header value
        #[serde(default)]
        auth_header: Option<String>,
        /// Prefix for user metadata headers (default: "x-amz-meta-")
        #[serde(default = "default_metadata_header_prefix")]
        metadata_header_prefix: String,
        /// Per-request timeout (default: 60 seconds)
        #[serde(default = "default_storage_timeout", with = "duration_serde")]
        timeout: Duration,
    },
    /// In-process map; contents are lost at exit
    Memory,
}

impl Default for StorageBackend {
    fn default() -> Self {
        StorageBackend::Filesystem {
            root: PathBuf::from("./objects"),
        }
    }
}

/// Object storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Destination bucket (required; may come from [`BUCKET_ENV`])
    #[serde(default)]
    pub bucket: String,

    /// Logical prefix for every key (default: "pdfs/")
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Key derivation strategy
    #[serde(default)]
    pub key_strategy: KeyStrategy,

    /// Backend selection
    #[serde(default)]
    pub backend: StorageBackend,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            key_prefix: default_key_prefix(),
            key_strategy: KeyStrategy::default(),
            backend: StorageBackend::default(),
        }
    }
}

/// Retry configuration for transient upload failures
///
/// `max_attempts` counts retries after the first try; the default of 0 means
/// uploads are attempted exactly once.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 0)
    #[serde(default)]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// REST API server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:6790)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser-based front ends (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_kind_name() -> String {
    "PDF".to_string()
}

fn default_extension() -> String {
    ".pdf".to_string()
}

fn default_content_type_marker() -> String {
    "pdf".to_string()
}

fn default_stored_content_type() -> String {
    "application/pdf".to_string()
}

fn default_fallback_label() -> String {
    "Unnamed PDF".to_string()
}

fn default_max_items() -> usize {
    10
}

fn default_max_concurrent_items() -> usize {
    1
}

fn default_deadline() -> Duration {
    Duration::from_secs(300)
}

fn default_key_prefix() -> String {
    "pdfs/".to_string()
}

fn default_metadata_header_prefix() -> String {
    "x-amz-meta-".to_string()
}

fn default_storage_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6790))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Durations are integer milliseconds on the wire
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
