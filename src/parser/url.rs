//! Line-oriented URL validation for pasted URL lists.

use tracing::{debug, instrument, trace};
use url::Url;

use super::error::ParseError;

/// Result of checking one non-empty input line.
pub type LineResult = Result<String, ParseError>;

/// Checks every non-empty line of `text` and reports each outcome in input order.
///
/// Each line is trimmed; blank lines produce no entry. A line is accepted when:
/// - it parses as an absolute URL with an `http` or `https` scheme, or
/// - it does not parse, contains a `.`, contains no space, does not start
///   with `http`, and `https://` + line parses as an absolute URL.
///
/// Accepted lines are returned in normalized form (`https://example.com`
/// becomes `https://example.com/`).
#[instrument(skip(text), fields(text_len = text.len()))]
#[must_use]
pub fn check_url_lines(text: &str) -> Vec<LineResult> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let result = check_line(line);
            match &result {
                Ok(url) => trace!(%url, "accepted line"),
                Err(error) => debug!(%error, "rejected line"),
            }
            result
        })
        .collect()
}

/// Extracts the valid web URLs from multi-line text, preserving order and duplicates.
///
/// # Examples
///
/// ```
/// use bookmarks_core::parser::validate_urls;
///
/// let urls = validate_urls("https://a.com/x\n\n  b.org/page  \nnot a url\nftp://c.com");
/// assert_eq!(urls, vec!["https://a.com/x", "https://b.org/page"]);
/// ```
#[must_use]
pub fn validate_urls(text: &str) -> Vec<String> {
    check_url_lines(text).into_iter().flatten().collect()
}

fn check_line(line: &str) -> LineResult {
    match Url::parse(line) {
        Ok(parsed) => web_url(line, &parsed),
        Err(error) => {
            if !looks_like_bare_domain(line) {
                return Err(ParseError::not_url_like(line));
            }
            let prefixed = format!("https://{line}");
            let parsed = Url::parse(&prefixed).map_err(|retry_error| {
                debug!(%error, %retry_error, "bare domain did not parse");
                ParseError::malformed(line, &retry_error.to_string())
            })?;
            web_url(line, &parsed)
        }
    }
}

fn looks_like_bare_domain(line: &str) -> bool {
    line.contains('.') && !line.contains(' ') && !line.starts_with("http")
}

fn web_url(line: &str, parsed: &Url) -> LineResult {
    match parsed.scheme() {
        "http" | "https" => Ok(parsed.to_string()),
        scheme => Err(ParseError::unsupported_scheme(line, scheme)),
    }
}
