//! Shared User-Agent string for scraper and AI traffic.

/// Project URL for User-Agent identification (RFC 9308 good citizenship).
const PROJECT_UA_URL: &str = "https://github.com/fierce/bookmarks";

/// Default User-Agent for every outbound request.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("bookmarks/{version} (bookmark-enricher; +{PROJECT_UA_URL})")
}
