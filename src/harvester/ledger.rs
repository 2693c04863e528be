//! Outcome ledger and report assembly

use super::item::ItemOutcome;
use crate::types::{BatchReport, BatchSummary, ItemError, ItemResult};

/// Successes and failures in candidate order
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    results: Vec<ItemResult>,
    errors: Vec<ItemError>,
}

impl Ledger {
    /// Sort outcomes by candidate index and split them
    pub(crate) fn from_outcomes(mut outcomes: Vec<ItemOutcome>) -> Self {
        outcomes.sort_by_key(|o| o.index);

        let mut ledger = Self::default();
        for outcome in outcomes {
            match outcome.result {
                Ok(result) => ledger.results.push(result),
                Err(failure) => ledger.errors.push(ItemError {
                    url: outcome.url,
                    error_message: failure.to_string(),
                }),
            }
        }
        ledger
    }

    /// Build the final report; `errors` is `None` when nothing failed
    pub(crate) fn into_report(self) -> BatchReport {
        let summary = BatchSummary {
            total: self.results.len() + self.errors.len(),
            successful: self.results.len(),
            failed: self.errors.len(),
        };

        BatchReport {
            success: true,
            summary,
            results: self.results,
            errors: if self.errors.is_empty() {
                None
            } else {
                Some(self.errors)
            },
        }
    }
}
