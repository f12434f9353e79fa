//! Persistent bookmark and category records.
//!
//! Every record is scoped by `user_id`; callers only ever see the records of
//! the user they pass in. [`RecordStore`] is the seam the import, export and
//! search flows depend on; [`SqliteStore`] is the production implementation.

mod error;
mod model;
mod sqlite;

pub use error::StoreError;
pub use model::{
    Bookmark, BookmarkOrder, BookmarkQuery, Category, DEFAULT_CATEGORY_COLOR,
    DEFAULT_CATEGORY_ICON, NewBookmark, NewCategory,
};
pub use sqlite::SqliteStore;

use async_trait::async_trait;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Data-access contract for bookmark and category records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Lists a user's bookmarks, optionally filtered by category.
    async fn list_bookmarks(&self, query: &BookmarkQuery) -> Result<Vec<Bookmark>>;

    /// Inserts a bookmark and returns the stored record.
    async fn create_bookmark(&self, bookmark: &NewBookmark) -> Result<Bookmark>;

    /// Lists a user's categories ordered by name.
    async fn list_categories(&self, user_id: &str) -> Result<Vec<Category>>;

    /// Inserts a category and returns the stored record.
    async fn create_category(&self, category: &NewCategory) -> Result<Category>;
}
