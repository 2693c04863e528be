//! HTTP fetching for pages and documents
//!
//! [`HttpFetcher`] is the capability the pipeline depends on; [`ReqwestFetcher`]
//! is the production implementation. Every request carries the configured
//! browser `User-Agent` and is bounded by the per-call timeout in
//! [`FetchOptions`], which covers connecting, headers, and the body.

use crate::config::FetchConfig;
use crate::error::{FetchError, FetchFailure, Result};
use crate::types::{FetchOptions, FetchResult, ResponseHeaders, ResponseKind};
use async_trait::async_trait;
use std::time::Duration;

/// Default per-call timeout used when a caller has no configuration at hand
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP GET capability
///
/// Implementations must treat any non-2xx status as a failure and must honor
/// `options.timeout` for the entire exchange.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Fetch `url`
    async fn get(
        &self,
        url: &str,
        options: FetchOptions,
    ) -> std::result::Result<FetchResult, FetchError>;
}

/// [`HttpFetcher`] backed by a shared reqwest client
///
/// The client is built once and reused, but keeps no idle connections between
/// requests so no connection state outlives a harvest.
#[derive(Clone, Debug)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Build a fetcher from the fetch configuration
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self { client })
    }

    async fn send(
        &self,
        url: &str,
        kind: ResponseKind,
    ) -> std::result::Result<FetchResult, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchFailure::Network(describe_send_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let headers = ResponseHeaders::from_pairs(
            response
                .headers()
                .iter()
                .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v))),
        );

        let body = match kind {
            // Decodes using the charset from Content-Type, falling back to UTF-8
            ResponseKind::Text => response
                .text()
                .await
                .map_err(|e| FetchFailure::Body(e.to_string()))?
                .into_bytes(),
            ResponseKind::Binary => response
                .bytes()
                .await
                .map_err(|e| FetchFailure::Body(e.to_string()))?
                .to_vec(),
        };

        Ok(FetchResult {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(
        &self,
        url: &str,
        options: FetchOptions,
    ) -> std::result::Result<FetchResult, FetchError> {
        match tokio::time::timeout(options.timeout, self.send(url, options.kind)).await {
            Ok(Ok(result)) => {
                tracing::debug!(
                    url = %url,
                    status = result.status,
                    size_bytes = result.body.len(),
                    "fetched"
                );
                Ok(result)
            }
            Ok(Err(cause)) => Err(FetchError::new(url, cause)),
            Err(_) => Err(FetchError::new(url, FetchFailure::Timeout(options.timeout))),
        }
    }
}

fn describe_send_error(e: &reqwest::Error) -> String {
    if e.is_connect() {
        format!("connection failed: {}", e)
    } else if e.is_builder() {
        format!("invalid request: {}", e)
    } else {
        e.to_string()
    }
}
