//! Error types for record store operations.

use thiserror::Error;

/// Failure of a record store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored `tags` column is not a JSON string array.
    #[error("bookmark {id} has malformed tags: {source}")]
    MalformedTags {
        /// Bookmark row id
        id: i64,
        /// JSON decoding failure
        source: serde_json::Error,
    },

    /// Tags could not be encoded for storage.
    #[error("failed to encode tags: {0}")]
    TagEncoding(#[source] serde_json::Error),

    /// A category with this name already exists for the user.
    #[error("category '{0}' already exists")]
    DuplicateCategory(String),
}

impl StoreError {
    /// Maps an insert failure, turning unique violations into [`StoreError::DuplicateCategory`].
    pub(crate) fn from_category_insert(error: sqlx::Error, name: &str) -> Self {
        match &error {
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                Self::DuplicateCategory(name.to_string())
            }
            _ => Self::Database(error),
        }
    }
}
