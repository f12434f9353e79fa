//! Titles and favicons derived from the URL alone.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::html::compile_static_regex;

static EXTENSION_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"\.[^.]+$"));
static WORD_START_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"\b\w"));

/// Derives a human-readable title from a URL.
///
/// ```
/// use bookmarks_core::enrich::fallback_title;
///
/// assert_eq!(
///     fallback_title("https://www.example.com/guides/my-cool-post.html"),
///     "My Cool Post - example.com"
/// );
/// assert_eq!(fallback_title("https://www.example.com/"), "example.com");
/// assert_eq!(fallback_title("not a url"), "not a url");
/// ```
#[must_use]
pub fn fallback_title(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let host = parsed.host_str().unwrap_or_default();
    let hostname = host.strip_prefix("www.").unwrap_or(host);

    let path = parsed.path();
    if path.is_empty() || path == "/" {
        return hostname.to_string();
    }

    let last = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "index.html")
        .next_back();

    match last {
        Some(segment) => {
            let stem = EXTENSION_RE.replace(segment, "");
            let spaced = stem.replace(['-', '_'], " ");
            let titled = WORD_START_RE.replace_all(&spaced, |caps: &regex::Captures<'_>| {
                caps[0].to_uppercase()
            });
            format!("{titled} - {hostname}")
        }
        None => hostname.to_string(),
    }
}

/// Returns the favicon service URL for the URL's host, or `""` when there is none.
#[must_use]
pub fn favicon_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .filter(|host| !host.is_empty())
        .map(|host| format!("https://www.google.com/s2/favicons?domain={host}&sz=16"))
        .unwrap_or_default()
}
