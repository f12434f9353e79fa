//! Batch URL enrichment.
//!
//! Turns raw URLs into [`ProcessedUrl`] records by scraping each page through
//! the shared [`AdmissionQueue`](crate::admission::AdmissionQueue). Pages that
//! cannot be scraped still produce a successful record built from the URL
//! alone, so the output always has one entry per input URL.

mod fallback;
mod pipeline;

pub use fallback::{fallback_title, favicon_url};
pub use pipeline::{BatchConfig, DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE, Enricher};

use serde::{Deserialize, Serialize};

/// Enrichment outcome for a single URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedUrl {
    /// The input URL, unchanged.
    pub url: String,
    /// Scraped or derived title.
    pub title: String,
    /// Scraped description, first heading, or empty.
    pub description: String,
    /// Derived favicon service URL (empty for malformed URLs).
    pub favicon_url: String,
    /// False when the queued call itself failed (for example it was cancelled).
    pub success: bool,
    /// Queue failure message when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
