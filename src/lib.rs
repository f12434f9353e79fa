//! Bookmarks Core Library
//!
//! This library provides the core functionality for the bookmarks tool,
//! which saves, enriches, searches and moves personal bookmark collections.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`admission`] - Rate-limited, retrying FIFO queue for throttled remote calls
//! - [`backend`] - Page scraper, AI text generator and session state
//! - [`db`] - Database connection and schema management
//! - [`enrich`] - Batch URL enrichment with fallback titles and favicons
//! - [`parser`] - URL list validation
//! - [`search`] - Keyword search with AI fallback
//! - [`store`] - Bookmark and category persistence
//! - [`transfer`] - JSON/HTML/CSV import and export

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod admission;
pub mod backend;
pub mod db;
pub mod enrich;
mod html;
pub mod parser;
pub mod search;
pub mod store;
pub mod transfer;
mod user_agent;

// Re-export commonly used types
pub use admission::{
    AdmissionConfig, AdmissionQueue, CallError, FailureType, QueueStatus, RetryDecision,
    RetryPolicy, classify_error,
};
pub use backend::{HttpScraper, HttpTextGenerator, HttpTimeouts, SessionHub, User};
pub use db::{Database, DbError};
pub use enrich::{BatchConfig, Enricher, ProcessedUrl, fallback_title, favicon_url};
pub use parser::validate_urls;
pub use search::{SearchOutcome, SearchService};
pub use store::{Bookmark, BookmarkQuery, Category, RecordStore, SqliteStore, StoreError};
pub use transfer::{ExportFormat, ImportSummary, TransferError};
