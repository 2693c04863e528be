//! Run orchestration
//!
//! A run moves through `Idle → FetchingPage → Extracting → Bounding →
//! ProcessingItems → Finalizing → Done`. `Failed` is only reachable before any
//! item is processed; once items start, every failure is recorded per item and
//! the run always produces a report.

use super::DocHarvester;
use super::ledger::Ledger;
use crate::error::{Error, ExtractionError, FetchError, FetchFailure, InputError, Result};
use crate::types::{BatchReport, Event, FetchOptions, HarvestRequest, PipelineState};
use tokio::time::Instant;
use url::Url;

/// Check a caller-supplied page URL
///
/// The URL must be non-blank and an absolute `http` or `https` URL.
pub fn validate_input_url(raw: &str) -> std::result::Result<Url, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::MissingUrl);
    }

    let url = Url::parse(trimmed).map_err(|e| InputError::InvalidUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(InputError::InvalidUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    tracing::debug!(from = %state, to = %next, "pipeline state");
    *state = next;
}

impl DocHarvester {
    /// Harvest documents linked from the page at `url`
    ///
    /// Returns a [`BatchReport`] once items have been processed, even if every
    /// item failed. Returns `Err` only for run-level failures: a missing or
    /// invalid URL, an unreachable page, or a page with no document links.
    pub async fn harvest(&self, url: &str) -> Result<BatchReport> {
        let deadline = Instant::now() + self.config.batch.deadline;
        let mut state = PipelineState::Idle;

        tracing::info!(url = %url, "starting harvest");
        self.emit_event(Event::HarvestStarted {
            url: url.to_string(),
        });

        match self.run(url, deadline, &mut state).await {
            Ok(report) => {
                tracing::info!(
                    url = %url,
                    total = report.summary.total,
                    successful = report.summary.successful,
                    failed = report.summary.failed,
                    "harvest complete"
                );
                self.emit_event(Event::HarvestComplete {
                    url: url.to_string(),
                    summary: report.summary,
                });
                Ok(report)
            }
            Err(e) => {
                tracing::error!(url = %url, state = %state, error = %e, "harvest failed");
                advance(&mut state, PipelineState::Failed);
                self.emit_event(Event::HarvestFailed {
                    url: url.to_string(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Harvest from an invocation payload; a missing `url` is an input error
    pub async fn harvest_request(&self, request: &HarvestRequest) -> Result<BatchReport> {
        match request.url.as_deref() {
            Some(url) => self.harvest(url).await,
            None => {
                let err = Error::Input(InputError::MissingUrl);
                tracing::error!(error = %err, "harvest rejected");
                self.emit_event(Event::HarvestFailed {
                    url: String::new(),
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        url: &str,
        deadline: Instant,
        state: &mut PipelineState,
    ) -> Result<BatchReport> {
        advance(state, PipelineState::FetchingPage);
        let page_url = validate_input_url(url)?;

        let options = FetchOptions::text(self.config.fetch.page_timeout);
        let page = match tokio::time::timeout_at(
            deadline,
            self.fetcher.get(page_url.as_str(), options),
        )
        .await
        {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => return Err(ExtractionError::PageUnreachable(e).into()),
            Err(_) => {
                return Err(ExtractionError::PageUnreachable(FetchError::new(
                    page_url.as_str(),
                    FetchFailure::Timeout(self.config.batch.deadline),
                ))
                .into());
            }
        };

        advance(state, PipelineState::Extracting);
        let candidates = self.extractor.extract(&page.text(), page_url.as_str())?;
        if candidates.is_empty() {
            return Err(ExtractionError::NoDocumentsFound {
                url: page_url.to_string(),
                kind: self.config.document.name.clone(),
            }
            .into());
        }

        advance(state, PipelineState::Bounding);
        let found = candidates.len();
        let selected: Vec<_> = candidates
            .into_iter()
            .take(self.config.batch.max_items)
            .collect();

        tracing::info!(
            url = %page_url,
            found = found,
            selected = selected.len(),
            "found {} links",
            self.config.document.name
        );
        self.emit_event(Event::LinksDiscovered {
            found,
            selected: selected.len(),
        });

        advance(state, PipelineState::ProcessingItems);
        let outcomes = self.process_items(&selected, deadline).await;

        advance(state, PipelineState::Finalizing);
        let report = Ledger::from_outcomes(outcomes).into_report();

        advance(state, PipelineState::Done);
        Ok(report)
    }
}
