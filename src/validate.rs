//! Content validation for downloaded documents

use crate::config::DocumentKind;
use crate::error::ValidationError;
use crate::types::FetchResult;

/// Check that a response is the expected document kind
///
/// Accepts when the `Content-Type` header contains `kind.content_type_marker`,
/// compared case-insensitively. A missing header is rejected.
///
/// Only response metadata is inspected, never the body: a server that labels
/// HTML as `application/pdf` passes, and a real PDF served as
/// `application/octet-stream` is rejected.
pub fn validate(result: &FetchResult, kind: &DocumentKind) -> Result<(), ValidationError> {
    let marker = kind.content_type_marker.to_ascii_lowercase();

    match result.headers.content_type.as_deref() {
        Some(content_type) if content_type.to_ascii_lowercase().contains(&marker) => Ok(()),
        observed => Err(ValidationError {
            expected: kind.content_type_marker.clone(),
            observed: observed.map(str::to_string),
        }),
    }
}
