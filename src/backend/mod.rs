//! Remote collaborators: page scraping, AI text generation and session state.
//!
//! The enrichment pipeline and search only see the [`Scraper`] and
//! [`TextGenerator`] traits, so tests can substitute in-process fakes while
//! the binary wires up [`HttpScraper`] and [`HttpTextGenerator`].

mod error;
mod http_client;
mod scraper;
mod session;
mod text;

pub use error::BackendError;
pub use http_client::{HttpTimeouts, build_http_client};
pub use scraper::{HttpScraper, extract_page};
pub use session::{SessionHub, SessionState, Subscription, User};
pub use text::{DEFAULT_AI_ENDPOINT, HttpTextGenerator};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::admission::CallError;

/// Metadata block of a scraped page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Page title, if one was found.
    pub title: Option<String>,
    /// Page description, if one was found.
    pub description: Option<String>,
}

/// Content extracted from a scraped page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageExtract {
    /// `h1`-`h3` heading texts in document order.
    pub headings: Vec<String>,
}

/// Result of scraping a single URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedPage {
    /// Title and description.
    pub metadata: PageMetadata,
    /// Extracted page content.
    pub extract: PageExtract,
}

/// Fetches a page and extracts its title, description and headings.
///
/// A failure whose [`CallError`] is rate-limit shaped (for example HTTP 429)
/// is retried by the admission queue.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Scrapes `url`.
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, CallError>;
}

/// Request to the AI text generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRequest {
    /// Full prompt text.
    pub prompt: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Model identifier.
    pub model: String,
}

/// Text produced by the AI text generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedText {
    /// Generated text.
    pub text: String,
}

/// Generates text from a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Runs one generation request.
    async fn generate_text(&self, request: &TextRequest) -> Result<GeneratedText, CallError>;
}
