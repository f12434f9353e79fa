//! Bookmark import from files and pasted URL lists.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, instrument, warn};

use super::{Progress, TransferError};
use crate::enrich::Enricher;
use crate::html::{attribute, clean_text, compile_static_regex};
use crate::parser::validate_urls;
use crate::store::{BookmarkQuery, NewBookmark, RecordStore};

/// Category assigned to imported bookmarks that carry none.
pub const IMPORTED_CATEGORY: &str = "imported";

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<a\s([^>]*)>(.*?)</a\s*>"));

/// Bookmark file format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Html,
    Csv,
}

impl ImportFormat {
    /// Picks the format from a `.json`, `.html` or `.csv` file name.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::UnsupportedFile`] for any other extension.
    pub fn from_file_name(name: &str) -> Result<Self, TransferError> {
        match Path::new(name).extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("html") => Ok(Self::Html),
            Some("csv") => Ok(Self::Csv),
            _ => Err(TransferError::UnsupportedFile(name.to_string())),
        }
    }
}

/// One bookmark read from an import file, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportCandidate {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub favicon_url: Option<String>,
    #[serde(deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
}

impl ImportCandidate {
    fn has_url_and_title(&self) -> bool {
        is_present(self.url.as_deref()) && is_present(self.title.as_deref())
    }
}

fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Accepts tags as a JSON array or as a string holding one.
fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let array = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::String(text) => {
            serde_json::from_str::<Vec<serde_json::Value>>(&text).unwrap_or_default()
        }
        _ => Vec::new(),
    };
    Ok(array
        .into_iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect())
}

/// Counts reported after an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Candidates read (files) or valid URLs found (URL lists).
    pub total: usize,
    /// Records created.
    pub imported: usize,
    /// Candidates skipped as already stored or incomplete.
    pub duplicates: usize,
    /// Records that failed to save.
    pub errors: usize,
}

/// Parses a JSON export: either an array or `{ "bookmarks": [...] }`.
///
/// Entries that are not objects become empty candidates, which are later
/// counted as skipped.
///
/// # Errors
///
/// Returns [`TransferError::Json`] if `content` is not JSON.
pub fn parse_json(content: &str) -> Result<Vec<ImportCandidate>, TransferError> {
    let document: serde_json::Value = serde_json::from_str(content)?;
    let items = match document {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("bookmarks") {
            Some(serde_json::Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

/// Parses every `<a href>` anchor of a Netscape bookmark file.
#[must_use]
pub fn parse_html(content: &str) -> Vec<ImportCandidate> {
    ANCHOR_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let attrs = caps.get(1)?.as_str();
            let url = attribute(attrs, "href")?;
            Some((url, attrs, caps.get(2).map_or("", |m| m.as_str())))
        })
        .enumerate()
        .map(|(index, (url, attrs, text))| ImportCandidate {
            title: Some(clean_text(text).unwrap_or_else(|| format!("Bookmark {}", index + 1))),
            url: Some(url),
            description: Some(attribute(attrs, "description").unwrap_or_default()),
            category: Some(IMPORTED_CATEGORY.to_string()),
            favicon_url: None,
            tags: Vec::new(),
        })
        .collect()
}

/// Parses a CSV file by naive comma splitting.
///
/// Columns are mapped by header name: any header containing `title`, `url`,
/// `description` or `category` (case-insensitive) feeds that field, with
/// later matching columns overriding earlier ones. Surrounding double quotes
/// are stripped from values.
#[must_use]
pub fn parse_csv(content: &str) -> Vec<ImportCandidate> {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header_line
        .split(',')
        .map(|h| h.trim().to_lowercase())
        .collect();

    lines
        .map(|line| {
            let values: Vec<&str> = line.split(',').collect();
            let mut candidate = ImportCandidate::default();
            for (index, header) in headers.iter().enumerate() {
                let value = values.get(index).map(|v| unquote(v));
                if header.contains("title") {
                    candidate.title.clone_from(&value);
                }
                if header.contains("url") {
                    candidate.url.clone_from(&value);
                }
                if header.contains("description") {
                    candidate.description.clone_from(&value);
                }
                if header.contains("category") {
                    candidate.category.clone_from(&value);
                }
            }
            candidate
        })
        .collect()
}

fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('"').unwrap_or(trimmed);
    trimmed.to_string()
}

/// Parses `content` in `format`.
///
/// # Errors
///
/// Returns [`TransferError::Json`] for malformed JSON files.
pub fn parse_import(format: ImportFormat, content: &str) -> Result<Vec<ImportCandidate>, TransferError> {
    match format {
        ImportFormat::Json => parse_json(content),
        ImportFormat::Html => Ok(parse_html(content)),
        ImportFormat::Csv => Ok(parse_csv(content)),
    }
}

/// Imports a bookmark file's contents for `user_id`.
///
/// Reports progress 10, 20 and 40 while parsing, then continues as
/// [`import_candidates`].
///
/// # Errors
///
/// Returns [`TransferError`] for unsupported extensions, malformed JSON, or
/// when existing bookmarks cannot be listed.
#[instrument(skip(store, content, progress), fields(content_len = content.len()))]
pub async fn import_file(
    store: &dyn RecordStore,
    user_id: &str,
    file_name: &str,
    content: &str,
    progress: Progress<'_>,
) -> Result<ImportSummary, TransferError> {
    progress(10);
    let format = ImportFormat::from_file_name(file_name)?;
    progress(20);
    let candidates = parse_import(format, content)?;
    debug!(?format, candidates = candidates.len(), "import file parsed");
    progress(40);
    import_candidates(store, user_id, candidates, progress).await
}

/// Stores every candidate that has a URL and title and is not already saved.
///
/// `duplicates` counts all skipped candidates, incomplete ones included.
/// Reports progress 60, 80 and 100.
///
/// # Errors
///
/// Returns [`TransferError::Store`] if existing bookmarks cannot be listed.
/// Individual insert failures are counted in `errors` instead.
#[instrument(skip(store, candidates, progress), fields(candidates = candidates.len()))]
pub async fn import_candidates(
    store: &dyn RecordStore,
    user_id: &str,
    candidates: Vec<ImportCandidate>,
    progress: Progress<'_>,
) -> Result<ImportSummary, TransferError> {
    let total = candidates.len();
    let existing = existing_urls(store, user_id).await?;
    progress(60);

    let valid: Vec<ImportCandidate> = candidates
        .into_iter()
        .filter(|c| c.has_url_and_title())
        .filter(|c| c.url.as_ref().is_some_and(|url| !existing.contains(url)))
        .collect();
    progress(80);

    let mut summary = ImportSummary {
        total,
        duplicates: total - valid.len(),
        ..ImportSummary::default()
    };
    for candidate in valid {
        let bookmark = NewBookmark {
            user_id: user_id.to_string(),
            title: candidate.title.unwrap_or_default(),
            url: candidate.url.unwrap_or_default(),
            description: Some(candidate.description.unwrap_or_default()),
            favicon_url: Some(candidate.favicon_url.unwrap_or_default()),
            category: Some(
                candidate
                    .category
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| IMPORTED_CATEGORY.to_string()),
            ),
            tags: candidate.tags,
            is_favorite: false,
        };
        save(store, &bookmark, &mut summary).await;
    }
    progress(100);

    info!(
        total = summary.total,
        imported = summary.imported,
        duplicates = summary.duplicates,
        errors = summary.errors,
        "file import complete"
    );
    Ok(summary)
}

/// Validates, enriches and stores a pasted URL list.
///
/// Progress: 10 after start, 20 after validation, 30 after duplicate
/// filtering, `30 + floor(processed / total * 60)` per enrichment batch, then
/// 90 and 100.
///
/// # Errors
///
/// Returns [`TransferError::NoValidUrls`] when `text` holds no acceptable URL,
/// or [`TransferError::Store`] if existing bookmarks cannot be listed.
#[instrument(skip(store, enricher, text, progress), fields(text_len = text.len()))]
pub async fn import_urls(
    store: &dyn RecordStore,
    enricher: &Enricher,
    user_id: &str,
    text: &str,
    progress: Progress<'_>,
) -> Result<ImportSummary, TransferError> {
    progress(10);
    let urls = validate_urls(text);
    if urls.is_empty() {
        return Err(TransferError::NoValidUrls);
    }
    progress(20);

    let existing = existing_urls(store, user_id).await?;
    let new_urls: Vec<String> = urls
        .iter()
        .filter(|url| !existing.contains(*url))
        .cloned()
        .collect();
    progress(30);

    let duplicates = urls.len() - new_urls.len();
    if new_urls.is_empty() {
        info!(total = urls.len(), "every URL is already saved");
        return Ok(ImportSummary {
            total: urls.len(),
            imported: 0,
            duplicates,
            errors: 0,
        });
    }

    let mut on_batch = |processed: usize, total: usize| {
        let percent = 30 + processed * 60 / total.max(1);
        progress(u8::try_from(percent).unwrap_or(90));
    };
    let processed = enricher
        .process_urls_in_batches(&new_urls, Some(&mut on_batch))
        .await;
    progress(90);

    let mut summary = ImportSummary {
        total: urls.len(),
        duplicates,
        ..ImportSummary::default()
    };
    for page in processed {
        let bookmark = NewBookmark {
            user_id: user_id.to_string(),
            title: page.title,
            url: page.url,
            description: Some(page.description),
            favicon_url: Some(page.favicon_url),
            category: Some(IMPORTED_CATEGORY.to_string()),
            tags: Vec::new(),
            is_favorite: false,
        };
        save(store, &bookmark, &mut summary).await;
    }
    progress(100);

    info!(
        total = summary.total,
        imported = summary.imported,
        duplicates = summary.duplicates,
        errors = summary.errors,
        "URL import complete"
    );
    Ok(summary)
}

async fn existing_urls(store: &dyn RecordStore, user_id: &str) -> Result<HashSet<String>, TransferError> {
    Ok(store
        .list_bookmarks(&BookmarkQuery::for_user(user_id))
        .await?
        .into_iter()
        .map(|b| b.url)
        .collect())
}

async fn save(store: &dyn RecordStore, bookmark: &NewBookmark, summary: &mut ImportSummary) {
    match store.create_bookmark(bookmark).await {
        Ok(_) => summary.imported += 1,
        Err(error) => {
            warn!(url = %bookmark.url, %error, "failed to save bookmark");
            summary.errors += 1;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ==================== Format Detection ====================

    #[test]
    fn test_import_format_from_extension() {
        assert_eq!(ImportFormat::from_file_name("x.json").unwrap(), ImportFormat::Json);
        assert_eq!(ImportFormat::from_file_name("/tmp/b.html").unwrap(), ImportFormat::Html);
        assert_eq!(ImportFormat::from_file_name("list.csv").unwrap(), ImportFormat::Csv);
        assert!(matches!(
            ImportFormat::from_file_name("notes.txt"),
            Err(TransferError::UnsupportedFile(_))
        ));
        assert!(ImportFormat::from_file_name("noext").is_err());
    }

    // ==================== JSON ====================

    #[test]
    fn test_parse_json_accepts_array_and_wrapper() {
        let array = parse_json(r#"[{"title":"A","url":"https://a.com/"}]"#).unwrap();
        let wrapped =
            parse_json(r#"{"bookmarks":[{"title":"A","url":"https://a.com/"}]}"#).unwrap();
        assert_eq!(array, wrapped);
        assert_eq!(array[0].title.as_deref(), Some("A"));
    }

    #[test]
    fn test_parse_json_object_without_bookmarks_is_empty() {
        assert!(parse_json(r#"{"other":1}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_json_tags_as_array_or_encoded_string() {
        let candidates = parse_json(
            r#"[{"title":"A","url":"u","tags":["x","y"]},{"title":"B","url":"v","tags":"[\"z\"]"}]"#,
        )
        .unwrap();
        assert_eq!(candidates[0].tags, vec!["x", "y"]);
        assert_eq!(candidates[1].tags, vec!["z"]);
    }

    #[test]
    fn test_parse_json_non_object_entry_becomes_empty_candidate() {
        let candidates = parse_json(r#"[42, {"title":"A","url":"u"}]"#).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0], ImportCandidate::default());
    }

    #[test]
    fn test_parse_json_rejects_invalid_document() {
        assert!(matches!(parse_json("{not json"), Err(TransferError::Json(_))));
    }

    // ==================== HTML ====================

    #[test]
    fn test_parse_html_anchors() {
        let html = r#"<DL><p>
            <DT><A HREF="https://a.com/" ADD_DATE="1" description="First one">Alpha</A>
            <DT><a name="anchor-only">skip</a>
            <DT><A HREF="https://b.com/"></A>
        </DL>"#;

        let candidates = parse_html(html);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title.as_deref(), Some("Alpha"));
        assert_eq!(candidates[0].url.as_deref(), Some("https://a.com/"));
        assert_eq!(candidates[0].description.as_deref(), Some("First one"));
        assert_eq!(candidates[0].category.as_deref(), Some("imported"));
        assert_eq!(candidates[1].title.as_deref(), Some("Bookmark 2"));
        assert_eq!(candidates[1].description.as_deref(), Some(""));
    }

    // ==================== CSV ====================

    #[test]
    fn test_parse_csv_maps_columns_by_header() {
        let csv = "Category,Title,Link URL,Notes\n\
                   \"dev\",\"Rust\",\"https://rust-lang.org/\",x\n\
                   \n\
                   home,Garden,https://garden.example/";

        let candidates = parse_csv(csv);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title.as_deref(), Some("Rust"));
        assert_eq!(candidates[0].url.as_deref(), Some("https://rust-lang.org/"));
        assert_eq!(candidates[0].category.as_deref(), Some("dev"));
        assert_eq!(candidates[0].description, None);
        assert_eq!(candidates[1].title.as_deref(), Some("Garden"));
    }

    #[test]
    fn test_parse_csv_short_rows_leave_fields_missing() {
        let candidates = parse_csv("title,url\nOnly Title");
        assert_eq!(candidates[0].title.as_deref(), Some("Only Title"));
        assert_eq!(candidates[0].url, None);
    }

    #[test]
    fn test_parse_csv_empty_content() {
        assert!(parse_csv("").is_empty());
        assert!(parse_csv("title,url\n").is_empty());
    }
}
