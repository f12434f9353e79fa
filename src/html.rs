//! Regex helpers shared by page scraping and bookmark-file parsing.

use std::sync::LazyLock;

use regex::Regex;

/// Compiles a regex at static init; panics on invalid pattern.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?is)([a-z][a-z0-9:_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
});

static INNER_TAG_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?s)<[^>]+>"));

/// Parses quoted `name="value"` pairs; names are lowercased, values entity-decoded.
pub(crate) fn attributes(raw: &str) -> Vec<(String, String)> {
    ATTRIBUTE_RE
        .captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps.get(2).or_else(|| caps.get(3))?.as_str();
            Some((name, decode_entities(value)))
        })
        .collect()
}

/// Returns the value of attribute `name` (case-insensitive), if present.
pub(crate) fn attribute(raw: &str, name: &str) -> Option<String> {
    attributes(raw)
        .into_iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// Decodes the handful of entities common in titles and URLs.
pub(crate) fn decode_entities(raw: &str) -> String {
    raw.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Strips inner tags, decodes entities and collapses whitespace; `None` if blank.
pub(crate) fn clean_text(raw: &str) -> Option<String> {
    let stripped = INNER_TAG_RE.replace_all(raw, " ");
    let collapsed = decode_entities(&stripped)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if collapsed.is_empty() { None } else { Some(collapsed) }
}
