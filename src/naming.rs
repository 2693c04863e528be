//! Display filenames and storage keys

use crate::config::{KeyStrategy, StorageConfig};
use crate::storage::hex_sha256;
use crate::types::{CandidateLink, FetchResult};

/// Hex characters of the body digest used by [`KeyStrategy::ContentHash`]
const CONTENT_HASH_LEN: usize = 16;

/// Names chosen for one stored document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectName {
    /// Full key in the blob store
    pub storage_key: String,
    /// Display filename, before sanitization
    pub filename: String,
}

/// Replace characters outside `[A-Za-z0-9.-]` with `_`, collapse runs of `_`,
/// and lowercase the result
///
/// ```
/// use doc_harvester::naming::sanitize_filename;
///
/// assert_eq!(sanitize_filename("My Report (2023)!!.pdf"), "my_report_2023_.pdf");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out
}

/// Derives filenames and keys from the storage configuration
#[derive(Clone, Debug)]
pub struct KeyNamer {
    key_prefix: String,
    strategy: KeyStrategy,
    file_suffix: String,
}

impl KeyNamer {
    /// Create a namer; `file_suffix` is appended to label-derived filenames
    pub fn new(storage: &StorageConfig, file_suffix: impl Into<String>) -> Self {
        Self {
            key_prefix: storage.key_prefix.clone(),
            strategy: storage.key_strategy,
            file_suffix: file_suffix.into(),
        }
    }

    /// Name a fetched candidate
    ///
    /// The filename is the last path segment of the candidate URL (query and
    /// fragment excluded). When that segment is empty, it is built from the
    /// sanitized label plus the document suffix. The key is the prefix, a
    /// strategy-dependent discriminator, `_`, and the sanitized filename.
    pub fn name_for(
        &self,
        candidate: &CandidateLink,
        result: &FetchResult,
        now_millis: i64,
    ) -> ObjectName {
        let filename = match last_path_segment(&candidate.url) {
            Some(segment) => segment.to_string(),
            None => format!("{}{}", sanitize_filename(&candidate.label), self.file_suffix),
        };

        let discriminator = match self.strategy {
            KeyStrategy::Timestamp => now_millis.to_string(),
            KeyStrategy::ContentHash => content_hash(&result.body),
        };

        ObjectName {
            storage_key: format!(
                "{}{}_{}",
                self.key_prefix,
                discriminator,
                sanitize_filename(&filename)
            ),
            filename,
        }
    }
}

fn last_path_segment(url: &str) -> Option<&str> {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..end];
    let segment = path.rsplit('/').next().unwrap_or_default();
    if segment.is_empty() {
        None
    } else {
        Some(segment)
    }
}

fn content_hash(body: &[u8]) -> String {
    let mut hex = hex_sha256(body);
    hex.truncate(CONTENT_HASH_LEN);
    hex
}
