//! Case-insensitive substring matching over bookmark fields.

use crate::store::Bookmark;

/// Returns the bookmarks whose title, description, tags or URL contain `query`
/// (case-insensitive), preserving input order.
#[must_use]
pub fn keyword_matches(bookmarks: &[Bookmark], query: &str) -> Vec<Bookmark> {
    let needle = query.to_lowercase();
    bookmarks
        .iter()
        .filter(|bookmark| matches_bookmark(bookmark, &needle))
        .cloned()
        .collect()
}

fn matches_bookmark(bookmark: &Bookmark, needle: &str) -> bool {
    bookmark.title.to_lowercase().contains(needle)
        || bookmark
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || bookmark
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
        || bookmark.url.to_lowercase().contains(needle)
}

/// Decides whether a query warrants an AI lookup.
///
/// True when keyword matching found nothing, or the query contains `?`,
/// `about` or `related to`, or has more than three space-separated words.
#[must_use]
pub fn should_use_ai(query: &str, keyword_hits: usize) -> bool {
    keyword_hits == 0
        || query.contains('?')
        || query.contains("about")
        || query.contains("related to")
        || query.split(' ').count() > 3
}
