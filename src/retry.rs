//! Retrying blob store writes
//!
//! Uploads are retried only when [`RetryConfig::max_attempts`] is non-zero.
//! The wait between attempts starts at `initial_delay`, is multiplied by
//! `backoff_multiplier` after each attempt and never exceeds `max_delay`.
//! With `jitter` on, each wait is stretched by a random factor in `[1, 2]`.
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use doc_harvester::config::RetryConfig;
//! use doc_harvester::retry::with_retry;
//! use doc_harvester::storage::{BlobStore, MemoryBlobStore};
//!
//! # async fn example() -> Result<(), doc_harvester::StorageError> {
//! let store = MemoryBlobStore::new();
//! let config = RetryConfig {
//!     max_attempts: 3,
//!     ..RetryConfig::default()
//! };
//! let metadata = BTreeMap::new();
//! let stored = with_retry(&config, || {
//!     store.put("documents", "pdfs/1_a.pdf", b"%PDF", "application/pdf", &metadata)
//! })
//! .await?;
//! println!("etag: {:?}", stored.etag);
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::StorageError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Classifies a failure as transient (worth another attempt) or permanent
pub trait IsRetryable {
    /// Returns true if repeating the same request could succeed
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for StorageError {
    fn is_retryable(&self) -> bool {
        match self {
            // Unreachable backend, timeouts, 5xx, throttling
            StorageError::Unavailable(_) => true,
            // Interrupted or temporarily full local writes
            StorageError::Io { .. } => true,
            // The backend answered and said no
            StorageError::Rejected { .. } => false,
            StorageError::InvalidKey { .. } => false,
        }
    }
}

/// Wait schedule for one retried operation
#[derive(Debug)]
struct Backoff<'a> {
    config: &'a RetryConfig,
    current: Duration,
}

impl<'a> Backoff<'a> {
    fn new(config: &'a RetryConfig) -> Self {
        Self {
            config,
            current: config.initial_delay.min(config.max_delay),
        }
    }

    /// The wait before the next attempt; advances the schedule
    fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = scale(delay, self.config.backoff_multiplier, self.config.max_delay);
        if self.config.jitter {
            let factor = 1.0 + rand::thread_rng().gen_range(0.0..=1.0);
            scale(delay, factor, self.config.max_delay.max(delay) * 2)
        } else {
            delay
        }
    }
}

/// `delay * factor`, capped at `cap`
///
/// A factor that yields a negative, NaN or overflowing duration maps to `cap`.
fn scale(delay: Duration, factor: f64, cap: Duration) -> Duration {
    Duration::try_from_secs_f64(delay.as_secs_f64() * factor)
        .unwrap_or(cap)
        .min(cap)
}

/// Run `operation`, retrying transient failures per `config`
///
/// `operation` runs once, then up to `config.max_attempts` more times while it
/// fails with a retryable error. Returns the first success or the last error.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut backoff = Backoff::new(config);
    let mut retries = 0;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if retries > 0 {
                    tracing::info!(attempts = retries + 1, "store write succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if !err.is_retryable() {
            return Err(err);
        }
        if retries >= config.max_attempts {
            if config.max_attempts > 0 {
                tracing::warn!(
                    error = %err,
                    attempts = retries + 1,
                    "giving up on store write"
                );
            }
            return Err(err);
        }

        retries += 1;
        let delay = backoff.next_delay();
        tracing::warn!(
            error = %err,
            retry = retries,
            max_attempts = config.max_attempts,
            delay_ms = delay.as_millis(),
            "store write failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
