//! Integration tests for import and export against a real SQLite database.
//!
//! These tests verify the transfer flows across the store, the enrichment
//! pipeline and the file formats.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bookmarks_core::admission::{AdmissionConfig, AdmissionQueue, CallError, RetryPolicy};
use bookmarks_core::backend::{PageExtract, PageMetadata, ScrapedPage, Scraper};
use bookmarks_core::enrich::{BatchConfig, Enricher};
use bookmarks_core::store::{
    BookmarkQuery, NewBookmark, NewCategory, RecordStore, SqliteStore,
};
use bookmarks_core::transfer::{
    ExportFormat, IMPORTED_CATEGORY, TransferError, export_for_user, export_stats, import_file,
    import_urls,
};
use bookmarks_core::Database;
use tempfile::TempDir;

/// Scraper that titles pages after their path and fails any URL containing `fail`.
struct PathScraper;

#[async_trait]
impl Scraper for PathScraper {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, CallError> {
        if url.contains("fail") {
            return Err(CallError::with_status("HTTP 500", 500));
        }
        let title = url.rsplit('/').find(|s| !s.is_empty()).map(str::to_uppercase);
        Ok(ScrapedPage {
            metadata: PageMetadata {
                title,
                description: Some(format!("About {url}")),
            },
            extract: PageExtract::default(),
        })
    }
}

/// Helper to create a store over a file database with migrations applied.
async fn setup_store() -> (SqliteStore, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db = Database::new(&temp_dir.path().join("bookmarks.db"))
        .await
        .expect("Failed to create database");
    (SqliteStore::new(db), temp_dir)
}

fn enricher(batch_size: usize) -> Enricher {
    let queue = AdmissionQueue::new(AdmissionConfig::new(
        Duration::ZERO,
        RetryPolicy::new(0, Duration::from_millis(1)),
    ));
    Enricher::new(
        queue,
        Arc::new(PathScraper),
        BatchConfig {
            batch_size,
            batch_delay: Duration::ZERO,
        },
    )
}

async fn add(store: &SqliteStore, user: &str, title: &str, url: &str) {
    store
        .create_bookmark(&NewBookmark {
            user_id: user.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            ..NewBookmark::default()
        })
        .await
        .expect("Failed to create bookmark");
}

// ==================== URL Import ====================

#[tokio::test]
async fn test_import_urls_enriches_and_skips_existing() {
    let (store, _temp_dir) = setup_store().await;
    add(&store, "u", "Existing", "https://a.com/").await;

    let mut progress = Vec::new();
    let mut sink = |p: u8| progress.push(p);
    let summary = import_urls(
        &store,
        &enricher(2),
        "u",
        "https://a.com\nb.com/first\nnot a url\nhttps://c.com/fail-here\nhttps://d.com/last\n",
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.imported, 3);
    assert_eq!(summary.errors, 0);
    assert_eq!(progress, vec![10, 20, 30, 70, 90, 90, 100]);

    let saved = store
        .list_bookmarks(&BookmarkQuery::for_user("u").in_category(IMPORTED_CATEGORY))
        .await
        .unwrap();
    let mut titles: Vec<&str> = saved.iter().map(|b| b.title.as_str()).collect();
    titles.sort_unstable();
    assert_eq!(titles, vec!["FIRST", "Fail Here - c.com", "LAST"]);

    let failed = saved
        .iter()
        .find(|b| b.url == "https://c.com/fail-here")
        .unwrap();
    assert_eq!(failed.description.as_deref(), Some(""));
    assert_eq!(
        failed.favicon_url.as_deref(),
        Some("https://www.google.com/s2/favicons?domain=c.com&sz=16")
    );
}

#[tokio::test]
async fn test_import_urls_all_duplicates_skips_enrichment() {
    let (store, _temp_dir) = setup_store().await;
    add(&store, "u", "A", "https://a.com/").await;

    let mut progress = Vec::new();
    let mut sink = |p: u8| progress.push(p);
    let summary = import_urls(&store, &enricher(3), "u", "a.com", &mut sink)
        .await
        .unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.imported, 0);
    assert_eq!(progress, vec![10, 20, 30]);
}

#[tokio::test]
async fn test_import_urls_without_valid_urls_fails() {
    let (store, _temp_dir) = setup_store().await;
    let mut sink = |_: u8| {};
    let err = import_urls(&store, &enricher(3), "u", "nope\nftp://x.com", &mut sink)
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::NoValidUrls));
    assert_eq!(err.to_string(), "No valid URLs found");
}

// ==================== File Import ====================

#[tokio::test]
async fn test_import_html_file_reports_progress_and_defaults() {
    let (store, _temp_dir) = setup_store().await;
    let html = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<DL><p>
    <DT><A HREF="https://tokio.rs/" ADD_DATE="1">Tokio</A>
    <DT><A HREF="https://serde.rs/">  </A>
</DL><p>"#;

    let mut progress = Vec::new();
    let mut sink = |p: u8| progress.push(p);
    let summary = import_file(&store, "u", "bookmarks.html", html, &mut sink)
        .await
        .unwrap();

    assert_eq!(progress, vec![10, 20, 40, 60, 80, 100]);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.imported, 2);

    let saved = store
        .list_bookmarks(&BookmarkQuery::for_user("u"))
        .await
        .unwrap();
    assert!(saved.iter().all(|b| b.category.as_deref() == Some(IMPORTED_CATEGORY)));
    assert!(saved.iter().any(|b| b.title == "Bookmark 2"));
}

#[tokio::test]
async fn test_import_csv_file_with_quoted_fields() {
    let (store, _temp_dir) = setup_store().await;
    let csv = "Title,URL,Description,Category,Tags\n\
               \"Rust\",\"https://www.rust-lang.org/\",\"Systems language\",\"dev\",\"[\"lang\"]\"\n\
               \"Broken\"\n";

    let mut sink = |_: u8| {};
    let summary = import_file(&store, "u", "export.csv", csv, &mut sink)
        .await
        .unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.duplicates, 1);

    let saved = store
        .list_bookmarks(&BookmarkQuery::for_user("u").in_category("dev"))
        .await
        .unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].description.as_deref(), Some("Systems language"));
}

#[tokio::test]
async fn test_import_file_unsupported_extension() {
    let (store, _temp_dir) = setup_store().await;
    let mut sink = |_: u8| {};
    let err = import_file(&store, "u", "notes.txt", "", &mut sink)
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::UnsupportedFile(_)));
}

// ==================== Export ====================

#[tokio::test]
async fn test_export_json_reimports_for_another_user() {
    let (store, _temp_dir) = setup_store().await;
    add(&store, "alice", "Rust", "https://www.rust-lang.org/").await;
    add(&store, "alice", "Tokio", "https://tokio.rs/").await;
    add(&store, "bob", "Serde", "https://serde.rs/").await;

    let json = export_for_user(&store, "alice", ExportFormat::Json)
        .await
        .unwrap();
    let document: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(document["bookmarks"].as_array().unwrap().len(), 2);

    let mut sink = |_: u8| {};
    let summary = import_file(&store, "bob", "alice.json", &json, &mut sink)
        .await
        .unwrap();
    assert_eq!(summary.imported, 2);

    let bob = store
        .list_bookmarks(&BookmarkQuery::for_user("bob"))
        .await
        .unwrap();
    assert_eq!(bob.len(), 3);
}

#[tokio::test]
async fn test_export_stats_counts_user_records() {
    let (store, _temp_dir) = setup_store().await;
    add(&store, "u", "A", "https://a.com/").await;
    store
        .create_bookmark(&NewBookmark {
            user_id: "u".to_string(),
            title: "Fav".to_string(),
            url: "https://fav.com/".to_string(),
            is_favorite: true,
            ..NewBookmark::default()
        })
        .await
        .unwrap();
    store
        .create_category(&NewCategory::named("u", "dev"))
        .await
        .unwrap();
    add(&store, "other", "X", "https://x.com/").await;

    let stats = export_stats(&store, "u").await.unwrap();
    assert_eq!(stats.total_bookmarks, 2);
    assert_eq!(stats.categories, 1);
    assert_eq!(stats.favorites, 1);
}
