//! Moving bookmark collections in and out of the store.
//!
//! # Export
//!
//! [`export_bookmarks`] renders JSON, Netscape HTML or CSV. The byte layout of
//! each format is fixed so exports can be diffed and re-imported by browsers.
//!
//! # Import
//!
//! - [`import_file`] - JSON, HTML or CSV bookmark files, picked by extension
//! - [`import_urls`] - pasted URL lists, enriched through the scraping pipeline
//!
//! Both skip URLs the user already has and report an [`ImportSummary`].

mod error;
mod export;
mod import;

pub use error::TransferError;
pub use export::{
    ExportFormat, ExportStats, export_bookmarks, export_csv, export_for_user, export_html,
    export_json, export_stats,
};
pub use import::{
    IMPORTED_CATEGORY, ImportCandidate, ImportFormat, ImportSummary, import_candidates,
    import_file, import_urls, parse_csv, parse_html, parse_import, parse_json,
};

/// Progress sink receiving whole percentages (0-100).
pub type Progress<'a> = &'a mut (dyn FnMut(u8) + Send);
