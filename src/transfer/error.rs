//! Error types for import and export.

use thiserror::Error;

use crate::store::StoreError;

/// Failure of an import or export flow.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Pasted text contained no acceptable URL.
    #[error("No valid URLs found")]
    NoValidUrls,

    /// File extension is not one of `.json`, `.html`, `.csv`.
    #[error("unsupported import file '{0}': expected .json, .html or .csv")]
    UnsupportedFile(String),

    /// Export format name not recognized.
    #[error("unknown export format '{0}': expected json, html or csv")]
    UnknownFormat(String),

    /// JSON could not be parsed or produced.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading existing records failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
