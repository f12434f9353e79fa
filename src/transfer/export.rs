//! Bookmark export in JSON, Netscape HTML and CSV.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::instrument;

use super::TransferError;
use crate::store::{Bookmark, BookmarkQuery, Category, RecordStore};

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Html,
    Csv,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Html => "html",
            Self::Csv => "csv",
        }
    }

    /// MIME type of the rendered document.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Html => "text/html",
            Self::Csv => "text/csv",
        }
    }

    /// `bookmarks.{extension}`.
    #[must_use]
    pub fn default_file_name(self) -> String {
        format!("bookmarks.{}", self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            "csv" => Ok(Self::Csv),
            _ => Err(TransferError::UnknownFormat(s.to_string())),
        }
    }
}

/// Summary counts shown before exporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStats {
    pub total_bookmarks: usize,
    pub categories: usize,
    pub favorites: usize,
}

impl ExportStats {
    /// Counts bookmarks, categories and favorites.
    #[must_use]
    pub fn compute(bookmarks: &[Bookmark], categories: &[Category]) -> Self {
        Self {
            total_bookmarks: bookmarks.len(),
            categories: categories.len(),
            favorites: bookmarks.iter().filter(|b| b.is_favorite).count(),
        }
    }
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    bookmarks: &'a [Bookmark],
}

/// Renders `bookmarks` in `format`.
///
/// # Errors
///
/// Returns [`TransferError::Json`] if JSON serialization fails.
pub fn export_bookmarks(format: ExportFormat, bookmarks: &[Bookmark]) -> Result<String, TransferError> {
    match format {
        ExportFormat::Json => export_json(bookmarks),
        ExportFormat::Html => Ok(export_html(bookmarks)),
        ExportFormat::Csv => Ok(export_csv(bookmarks)),
    }
}

/// `{ "bookmarks": [...] }`, pretty-printed with two-space indentation.
///
/// # Errors
///
/// Returns [`TransferError::Json`] if serialization fails.
pub fn export_json(bookmarks: &[Bookmark]) -> Result<String, TransferError> {
    Ok(serde_json::to_string_pretty(&JsonDocument { bookmarks })?)
}

/// Netscape bookmark file. Titles and URLs are written verbatim.
#[must_use]
pub fn export_html(bookmarks: &[Bookmark]) -> String {
    let entries = bookmarks
        .iter()
        .map(|b| format!("    <DT><A HREF=\"{}\">{}</A>", b.url, b.title))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<!DOCTYPE NETSCAPE-Bookmark-file-1>\n\
         <META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n\
         <TITLE>Bookmarks</TITLE>\n\
         <H1>Bookmarks</H1>\n\
         <DL><p>\n\
         {entries}\n\
         </DL><p>"
    )
}

/// CSV with a `Title,URL,Description,Category,Tags` header.
///
/// Every field is wrapped in double quotes; embedded quotes are not escaped.
/// Tags are written as their JSON array text.
#[must_use]
pub fn export_csv(bookmarks: &[Bookmark]) -> String {
    let rows = bookmarks
        .iter()
        .map(|b| {
            let tags = serde_json::to_string(&b.tags).unwrap_or_else(|_| "[]".to_string());
            format!(
                "\"{}\",\"{}\",\"{}\",\"{}\",\"{}\"",
                b.title,
                b.url,
                b.description.as_deref().unwrap_or_default(),
                b.category.as_deref().unwrap_or_default(),
                tags
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("Title,URL,Description,Category,Tags\n{rows}")
}

/// Lists a user's bookmarks newest first and renders them.
///
/// # Errors
///
/// Returns [`TransferError`] if listing or rendering fails.
#[instrument(skip(store))]
pub async fn export_for_user(
    store: &dyn RecordStore,
    user_id: &str,
    format: ExportFormat,
) -> Result<String, TransferError> {
    let bookmarks = store.list_bookmarks(&BookmarkQuery::for_user(user_id)).await?;
    export_bookmarks(format, &bookmarks)
}

/// Computes [`ExportStats`] for a user.
///
/// # Errors
///
/// Returns [`TransferError::Store`] if listing fails.
#[instrument(skip(store))]
pub async fn export_stats(store: &dyn RecordStore, user_id: &str) -> Result<ExportStats, TransferError> {
    let bookmarks = store.list_bookmarks(&BookmarkQuery::for_user(user_id)).await?;
    let categories = store.list_categories(user_id).await?;
    Ok(ExportStats::compute(&bookmarks, &categories))
}
