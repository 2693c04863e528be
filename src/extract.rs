//! Document link extraction from HTML pages
//!
//! Finds anchors whose `href` ends with or contains the document extension,
//! resolves each against the page URL, and pairs it with its visible text.
//! Output preserves document order and is not deduplicated: the same URL linked
//! twice yields two candidates.

use crate::config::DocumentKind;
use crate::error::{Error, ExtractionError, Result};
use crate::types::CandidateLink;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

/// Extracts [`CandidateLink`]s for one document kind
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    selector: Selector,
    fallback_label: String,
}

impl LinkExtractor {
    /// Build an extractor for `kind`
    ///
    /// Fails with a configuration error if the extension cannot be embedded in a
    /// CSS attribute selector.
    pub fn new(kind: &DocumentKind) -> Result<Self> {
        let css = format!(
            r#"a[href$="{ext}"], a[href*="{ext}"]"#,
            ext = kind.extension
        );
        let selector = Selector::parse(&css).map_err(|e| {
            Error::config(
                "document.extension",
                format!("'{}' does not form a valid selector: {e}", kind.extension),
            )
        })?;

        Ok(Self {
            selector,
            fallback_label: kind.fallback_label.clone(),
        })
    }

    /// Extract candidate links from `html`, resolving hrefs against `base_url`
    ///
    /// Parsing never fails; malformed markup is handled the way browsers handle
    /// it. Hrefs that cannot be resolved are skipped. An empty result is not an
    /// error here; the pipeline decides what zero candidates means.
    pub fn extract(
        &self,
        html: &str,
        base_url: &str,
    ) -> std::result::Result<Vec<CandidateLink>, ExtractionError> {
        let base = Url::parse(base_url).map_err(|e| ExtractionError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ExtractionError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base for relative links".to_string(),
            });
        }

        let document = Html::parse_document(html);
        let mut candidates = Vec::new();

        // A selector group yields each element once, in document order
        for anchor in document.select(&self.selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };

            let url = match base.join(href.trim()) {
                Ok(url) => url,
                Err(e) => {
                    warn!(href = %href, base = %base, error = %e, "skipping unresolvable link");
                    continue;
                }
            };

            let text = anchor.text().collect::<String>();
            let text = text.trim();
            let label = if text.is_empty() {
                self.fallback_label.clone()
            } else {
                text.to_string()
            };

            candidates.push(CandidateLink {
                url: url.to_string(),
                label,
            });
        }

        debug!(base = %base, found = candidates.len(), "extracted document links");
        Ok(candidates)
    }
}
