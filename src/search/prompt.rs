//! Prompt construction and response parsing for AI search.

use crate::store::Bookmark;

/// Maximum number of bookmarks included in one prompt.
pub const AI_BOOKMARK_LIMIT: usize = 50;

/// Sentinel the model returns when nothing matches.
pub const NO_MATCHES: &str = "NO_MATCHES";

/// Builds the search prompt from the first [`AI_BOOKMARK_LIMIT`] bookmarks.
#[must_use]
pub fn build_prompt(query: &str, bookmarks: &[Bookmark]) -> String {
    let listing = bookmarks
        .iter()
        .take(AI_BOOKMARK_LIMIT)
        .map(|bookmark| {
            let description = bookmark
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or("No description");
            let tags = if bookmark.tags.is_empty() {
                "No tags".to_string()
            } else {
                bookmark.tags.join(", ")
            };
            format!(
                "Title: {}\nDescription: {description}\nTags: {tags}",
                bookmark.title
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "User query: \"{query}\"\n\n\
         Find relevant bookmarks from this list:\n\
         {listing}\n\n\
         Return only the exact titles of matching bookmarks, one per line. \
         If no matches, return \"{NO_MATCHES}\"."
    )
}

/// Splits a model response into candidate titles.
///
/// Returns `None` when the response contains [`NO_MATCHES`]; otherwise the
/// trimmed non-empty lines.
#[must_use]
pub fn parse_ai_response(text: &str) -> Option<Vec<String>> {
    if text.contains(NO_MATCHES) {
        return None;
    }
    Some(
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
    )
}
