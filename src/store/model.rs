//! Bookmark and category record types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::StoreError;

/// Color given to categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#6b7280";

/// Icon given to categories created without one.
pub const DEFAULT_CATEGORY_ICON: &str = "folder";

/// A stored bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub favicon_url: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    /// ISO-8601 UTC creation time.
    pub created_at: String,
    /// ISO-8601 UTC last update time.
    pub updated_at: String,
    pub is_favorite: bool,
    pub visit_count: i64,
    pub last_visited: Option<String>,
}

/// Raw `bookmarks` row; `tags` is still JSON text.
#[derive(Debug, FromRow)]
pub(crate) struct BookmarkRow {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub favicon_url: Option<String>,
    pub category: Option<String>,
    pub tags: String,
    pub created_at: String,
    pub updated_at: String,
    pub is_favorite: bool,
    pub visit_count: i64,
    pub last_visited: Option<String>,
}

impl TryFrom<BookmarkRow> for Bookmark {
    type Error = StoreError;

    fn try_from(row: BookmarkRow) -> Result<Self, Self::Error> {
        let tags = serde_json::from_str(&row.tags).map_err(|source| StoreError::MalformedTags {
            id: row.id,
            source,
        })?;
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            url: row.url,
            description: row.description,
            favicon_url: row.favicon_url,
            category: row.category,
            tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
            is_favorite: row.is_favorite,
            visit_count: row.visit_count,
            last_visited: row.last_visited,
        })
    }
}

/// Insert payload for a bookmark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBookmark {
    pub user_id: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub favicon_url: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// A stored category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Insert payload for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub user_id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
}

impl NewCategory {
    /// Creates a payload with the default color and icon.
    #[must_use]
    pub fn named(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            color: DEFAULT_CATEGORY_COLOR.to_string(),
            icon: DEFAULT_CATEGORY_ICON.to_string(),
        }
    }
}

/// Sort order for bookmark listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookmarkOrder {
    /// Newest first.
    #[default]
    CreatedDesc,
    /// Oldest first.
    CreatedAsc,
}

/// Filter for [`RecordStore::list_bookmarks`](super::RecordStore::list_bookmarks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkQuery {
    pub user_id: String,
    /// Exact category name to match.
    pub category: Option<String>,
    pub order: BookmarkOrder,
}

impl BookmarkQuery {
    /// All of a user's bookmarks, newest first.
    #[must_use]
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            category: None,
            order: BookmarkOrder::CreatedDesc,
        }
    }

    /// Restricts the listing to `category`.
    #[must_use]
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bookmark_serializes_camel_case() {
        let bookmark = Bookmark {
            id: 1,
            user_id: "u".to_string(),
            title: "T".to_string(),
            url: "https://a.com/".to_string(),
            description: None,
            favicon_url: Some(String::new()),
            category: None,
            tags: vec!["rust".to_string()],
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
            is_favorite: true,
            visit_count: 0,
            last_visited: None,
        };
        let json = serde_json::to_value(&bookmark).unwrap();
        assert_eq!(json["userId"], "u");
        assert_eq!(json["faviconUrl"], "");
        assert_eq!(json["isFavorite"], true);
        assert_eq!(json["tags"][0], "rust");
    }

    #[test]
    fn test_malformed_tags_row_is_rejected() {
        let row = BookmarkRow {
            id: 9,
            user_id: "u".to_string(),
            title: "T".to_string(),
            url: "https://a.com/".to_string(),
            description: None,
            favicon_url: None,
            category: None,
            tags: "rust,async".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
            is_favorite: false,
            visit_count: 0,
            last_visited: None,
        };
        let err = Bookmark::try_from(row).unwrap_err();
        assert!(matches!(err, StoreError::MalformedTags { id: 9, .. }));
    }

    #[test]
    fn test_new_category_defaults() {
        let category = NewCategory::named("u", "Reading");
        assert_eq!(category.color, DEFAULT_CATEGORY_COLOR);
        assert_eq!(category.icon, DEFAULT_CATEGORY_ICON);
    }
}
