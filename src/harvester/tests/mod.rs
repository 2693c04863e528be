use super::test_helpers::*;
use super::*;
use crate::error::{Error, ExtractionError, FetchFailure, InputError};
use crate::types::{BatchReport, Event};
use std::sync::Arc;
use std::time::Duration;


/// Every bounded candidate appears exactly once across results and errors
fn assert_each_candidate_accounted_for(report: &BatchReport, expected_urls: &[String]) {
    let mut seen: Vec<&str> = report
        .results
        .iter()
        .map(|r| r.original_url.as_str())
        .chain(report.errors().iter().map(|e| e.url.as_str()))
        .collect();
    seen.sort();

    let mut expected: Vec<&str> = expected_urls.iter().map(String::as_str).collect();
    expected.sort();

    assert_eq!(seen, expected);
    assert_eq!(
        report.summary.total,
        report.summary.successful + report.summary.failed
    );
}
