//! Plain-text rendering of records and summaries for terminal output.

use bookmarks_core::transfer::ExportStats;
use bookmarks_core::{Bookmark, Category, ImportSummary};

/// Renders one bookmark as a two-line listing entry.
pub(crate) fn render_bookmark_row(bookmark: &Bookmark) -> String {
    let star = if bookmark.is_favorite { " *" } else { "" };
    let mut details = vec![bookmark.url.clone()];
    if let Some(category) = bookmark.category.as_deref().filter(|c| !c.is_empty()) {
        details.push(format!("[{category}]"));
    }
    if !bookmark.tags.is_empty() {
        let tags: Vec<String> = bookmark.tags.iter().map(|t| format!("#{t}")).collect();
        details.push(tags.join(" "));
    }
    format!(
        "{:>5}  {}{star}\n       {}",
        bookmark.id,
        bookmark.title,
        details.join("  ")
    )
}

pub(crate) fn render_category_row(category: &Category) -> String {
    format!("{}  ({}, {})", category.name, category.color, category.icon)
}

pub(crate) fn render_import_summary(summary: &ImportSummary) -> String {
    format!(
        "Imported {} of {} bookmarks ({} duplicates skipped, {} errors)",
        summary.imported, summary.total, summary.duplicates, summary.errors
    )
}

pub(crate) fn render_stats(stats: &ExportStats) -> String {
    format!(
        "Bookmarks:  {}\nCategories: {}\nFavorites:  {}",
        stats.total_bookmarks, stats.categories, stats.favorites
    )
}
