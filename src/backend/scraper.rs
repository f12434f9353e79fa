//! HTTP page scraper with regex-based metadata extraction.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use super::{BackendError, HttpTimeouts, PageExtract, PageMetadata, ScrapedPage, Scraper};
use super::build_http_client;
use crate::admission::CallError;
use crate::html::{attributes, clean_text, compile_static_regex};
use crate::user_agent;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<title[^>]*>(.*?)</title\s*>"));

static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<meta\s+([^>]*?)/?>"));

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<h[1-3](?:\s[^>]*)?>(.*?)</h[1-3]\s*>"));

/// Scrapes pages over HTTP.
pub struct HttpScraper {
    client: Client,
}

impl HttpScraper {
    /// Creates a scraper using the shared client policy.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if HTTP client construction fails.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, BackendError> {
        let client = build_http_client(timeouts, user_agent::default_user_agent())?;
        Ok(Self { client })
    }
}

impl std::fmt::Debug for HttpScraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpScraper").finish_non_exhaustive()
    }
}

#[async_trait]
impl Scraper for HttpScraper {
    #[instrument(skip(self), fields(url = %url))]
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, CallError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, "page request failed");
            CallError::remote(format!("Cannot reach {url}: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "page returned error status");
            return Err(CallError::with_status(
                format!("HTTP {} fetching {url}", status.as_u16()),
                status.as_u16(),
            ));
        }

        let html = response.text().await.map_err(|e| {
            warn!(error = %e, "failed to read page body");
            CallError::remote(format!("Failed to read page body: {e}"))
        })?;

        let page = extract_page(&html);
        debug!(
            has_title = page.metadata.title.is_some(),
            headings = page.extract.headings.len(),
            "page scraped"
        );
        Ok(page)
    }
}

/// Extracts title, description and `h1`-`h3` headings from raw HTML.
///
/// Title prefers `og:title` over `<title>`; description prefers the
/// `description` meta tag over `og:description`. Blank values count as missing.
#[must_use]
pub fn extract_page(html: &str) -> ScrapedPage {
    let title = meta_content(html, "og:title").or_else(|| {
        TITLE_RE
            .captures(html)
            .and_then(|caps| caps.get(1))
            .and_then(|m| clean_text(m.as_str()))
    });
    let description =
        meta_content(html, "description").or_else(|| meta_content(html, "og:description"));
    let headings = HEADING_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).and_then(|m| clean_text(m.as_str())))
        .collect();

    ScrapedPage {
        metadata: PageMetadata { title, description },
        extract: PageExtract { headings },
    }
}

/// Returns the `content` of the first `<meta>` whose `name` or `property` is `key`.
fn meta_content(html: &str, key: &str) -> Option<String> {
    META_TAG_RE.captures_iter(html).find_map(|tag| {
        let mut matches_key = false;
        let mut content = None;
        for (name, value) in attributes(tag.get(1)?.as_str()) {
            match name.as_str() {
                "name" | "property" if value.eq_ignore_ascii_case(key) => matches_key = true,
                "content" => content = Some(value),
                _ => {}
            }
        }
        if matches_key {
            content.as_deref().and_then(clean_text)
        } else {
            None
        }
    })
}
