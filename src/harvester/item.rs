//! Per-candidate processing
//!
//! Each candidate runs fetch → validate → name → upload. The first failing step
//! ends that candidate only. Candidates run through a buffered stream bounded by
//! `batch.max_concurrent_items`; outcomes carry their candidate index so the
//! ledger can restore candidate order afterwards.

use super::DocHarvester;
use crate::error::ItemFailure;
use crate::types::{CandidateLink, Event, FetchOptions, ItemResult, UploadMetadata};
use crate::validate::validate;
use chrono::{SecondsFormat, Utc};
use futures::stream::{self, StreamExt};
use tokio::time::Instant;

/// Outcome of one candidate, tagged with its position
#[derive(Debug, Clone)]
pub(crate) struct ItemOutcome {
    /// 0-based candidate index
    pub(crate) index: usize,
    /// Candidate URL
    pub(crate) url: String,
    /// Stored document or failure reason
    pub(crate) result: Result<ItemResult, ItemFailure>,
}

impl DocHarvester {
    /// Process every candidate, never failing as a whole
    ///
    /// Work still running at `deadline` is cancelled, and candidates not yet
    /// started are not attempted; both are recorded as
    /// [`ItemFailure::DeadlineExceeded`].
    pub(crate) async fn process_items(
        &self,
        candidates: &[CandidateLink],
        deadline: Instant,
    ) -> Vec<ItemOutcome> {
        let total = candidates.len();
        let concurrency = self.config.batch.max_concurrent_items.max(1);

        stream::iter(candidates.iter().cloned().enumerate())
            .map(|(index, candidate)| async move {
                let result = if Instant::now() >= deadline {
                    Err(ItemFailure::DeadlineExceeded)
                } else {
                    // Dropping the item future on expiry cancels its in-flight request
                    tokio::time::timeout_at(deadline, self.process_item(index, total, &candidate))
                        .await
                        .unwrap_or(Err(ItemFailure::DeadlineExceeded))
                };

                if let Err(e) = &result {
                    tracing::warn!(
                        index = index + 1,
                        total = total,
                        url = %candidate.url,
                        error = %e,
                        "document failed"
                    );
                    self.emit_event(Event::ItemFailed {
                        index: index + 1,
                        total,
                        url: candidate.url.clone(),
                        error: e.to_string(),
                    });
                }

                ItemOutcome {
                    index,
                    url: candidate.url,
                    result,
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await
    }

    async fn process_item(
        &self,
        index: usize,
        total: usize,
        candidate: &CandidateLink,
    ) -> Result<ItemResult, ItemFailure> {
        tracing::info!(
            index = index + 1,
            total = total,
            url = %candidate.url,
            "downloading document"
        );
        self.emit_event(Event::ItemStarted {
            index: index + 1,
            total,
            url: candidate.url.clone(),
        });

        let response = self
            .fetcher
            .get(
                &candidate.url,
                FetchOptions::binary(self.config.fetch.item_timeout),
            )
            .await?;

        validate(&response, &self.config.document)?;

        let now = Utc::now();
        let name = self
            .namer
            .name_for(candidate, &response, now.timestamp_millis());
        let metadata = UploadMetadata {
            upload_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            original_name: name.filename.clone(),
        };

        let outcome = self
            .uploader
            .put(
                &response.body,
                &name.storage_key,
                &self.config.document.stored_content_type,
                &metadata,
            )
            .await?;

        let size_bytes = response.size_bytes();
        tracing::info!(
            index = index + 1,
            total = total,
            url = %candidate.url,
            key = %outcome.storage_key,
            size_bytes = size_bytes,
            "document stored"
        );
        self.emit_event(Event::ItemStored {
            index: index + 1,
            total,
            url: candidate.url.clone(),
            storage_key: outcome.storage_key.clone(),
            size_bytes,
        });

        Ok(ItemResult {
            original_url: candidate.url.clone(),
            filename: name.filename,
            storage_key: outcome.storage_key,
            size_bytes,
        })
    }
}
