//! `SQLite` implementation of [`RecordStore`].

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::model::BookmarkRow;
use super::{
    Bookmark, BookmarkOrder, BookmarkQuery, Category, NewBookmark, NewCategory, RecordStore,
    Result, StoreError,
};
use crate::db::Database;

const BOOKMARK_COLUMNS: &str = "id, user_id, title, url, description, favicon_url, category, tags, \
     created_at, updated_at, is_favorite, visit_count, last_visited";

const CATEGORY_COLUMNS: &str = "id, user_id, name, color, icon, created_at, updated_at";

/// Record store backed by the bookmark database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Creates a store over an opened, migrated database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns the underlying database handle.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    #[instrument(skip(self), fields(user_id = %query.user_id, category = ?query.category))]
    async fn list_bookmarks(&self, query: &BookmarkQuery) -> Result<Vec<Bookmark>> {
        let order = match query.order {
            BookmarkOrder::CreatedDesc => "created_at DESC, id DESC",
            BookmarkOrder::CreatedAsc => "created_at ASC, id ASC",
        };
        let sql = format!(
            "SELECT {BOOKMARK_COLUMNS} FROM bookmarks \
             WHERE user_id = ? AND (? IS NULL OR category = ?) \
             ORDER BY {order}"
        );

        let rows = sqlx::query_as::<_, BookmarkRow>(&sql)
            .bind(&query.user_id)
            .bind(query.category.as_deref())
            .bind(query.category.as_deref())
            .fetch_all(self.db.pool())
            .await?;

        debug!(count = rows.len(), "listed bookmarks");
        rows.into_iter().map(Bookmark::try_from).collect()
    }

    #[instrument(skip(self, bookmark), fields(user_id = %bookmark.user_id, url = %bookmark.url))]
    async fn create_bookmark(&self, bookmark: &NewBookmark) -> Result<Bookmark> {
        let tags = serde_json::to_string(&bookmark.tags).map_err(StoreError::TagEncoding)?;
        let sql = format!(
            "INSERT INTO bookmarks \
             (user_id, title, url, description, favicon_url, category, tags, is_favorite) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {BOOKMARK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, BookmarkRow>(&sql)
            .bind(&bookmark.user_id)
            .bind(&bookmark.title)
            .bind(&bookmark.url)
            .bind(bookmark.description.as_deref())
            .bind(bookmark.favicon_url.as_deref())
            .bind(bookmark.category.as_deref())
            .bind(tags)
            .bind(bookmark.is_favorite)
            .fetch_one(self.db.pool())
            .await?;

        debug!(id = row.id, "bookmark created");
        Bookmark::try_from(row)
    }

    #[instrument(skip(self))]
    async fn list_categories(&self, user_id: &str) -> Result<Vec<Category>> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE user_id = ? ORDER BY name ASC"
        );
        let categories = sqlx::query_as::<_, Category>(&sql)
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(categories)
    }

    #[instrument(skip(self, category), fields(user_id = %category.user_id, name = %category.name))]
    async fn create_category(&self, category: &NewCategory) -> Result<Category> {
        let sql = format!(
            "INSERT INTO categories (user_id, name, color, icon) VALUES (?, ?, ?, ?) \
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(&category.user_id)
            .bind(&category.name)
            .bind(&category.color)
            .bind(&category.icon)
            .fetch_one(self.db.pool())
            .await
            .map_err(|e| StoreError::from_category_insert(e, &category.name))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn store() -> SqliteStore {
        SqliteStore::new(Database::new_in_memory().await.unwrap())
    }

    fn new_bookmark(user: &str, title: &str, category: Option<&str>) -> NewBookmark {
        NewBookmark {
            user_id: user.to_string(),
            title: title.to_string(),
            url: format!("https://example.com/{}", title.to_lowercase()),
            category: category.map(str::to_string),
            tags: vec!["t1".to_string(), "t2".to_string()],
            ..NewBookmark::default()
        }
    }

    // ==================== Bookmarks ====================

    #[tokio::test]
    async fn test_create_bookmark_round_trips_fields() {
        let store = store().await;
        let mut input = new_bookmark("u1", "Rust", Some("dev"));
        input.description = Some("The book".to_string());
        input.is_favorite = true;

        let created = store.create_bookmark(&input).await.unwrap();

        assert!(created.id > 0);
        assert_eq!(created.user_id, "u1");
        assert_eq!(created.url, "https://example.com/rust");
        assert_eq!(created.description.as_deref(), Some("The book"));
        assert_eq!(created.category.as_deref(), Some("dev"));
        assert_eq!(created.tags, vec!["t1", "t2"]);
        assert!(created.is_favorite);
        assert_eq!(created.visit_count, 0);
        assert_eq!(created.created_at, created.updated_at);
    }

    #[tokio::test]
    async fn test_list_bookmarks_scoped_by_user() {
        let store = store().await;
        store.create_bookmark(&new_bookmark("u1", "A", None)).await.unwrap();
        store.create_bookmark(&new_bookmark("u2", "B", None)).await.unwrap();

        let listed = store
            .list_bookmarks(&BookmarkQuery::for_user("u1"))
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "A");
    }

    #[tokio::test]
    async fn test_list_bookmarks_orders_by_creation() {
        let store = store().await;
        for title in ["First", "Second", "Third"] {
            store.create_bookmark(&new_bookmark("u", title, None)).await.unwrap();
        }

        let newest_first = store
            .list_bookmarks(&BookmarkQuery::for_user("u"))
            .await
            .unwrap();
        let titles: Vec<_> = newest_first.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Third", "Second", "First"]);

        let mut query = BookmarkQuery::for_user("u");
        query.order = BookmarkOrder::CreatedAsc;
        let oldest_first = store.list_bookmarks(&query).await.unwrap();
        let titles: Vec<_> = oldest_first.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_list_bookmarks_filters_category() {
        let store = store().await;
        store.create_bookmark(&new_bookmark("u", "A", Some("work"))).await.unwrap();
        store.create_bookmark(&new_bookmark("u", "B", Some("home"))).await.unwrap();
        store.create_bookmark(&new_bookmark("u", "C", None)).await.unwrap();

        let work = store
            .list_bookmarks(&BookmarkQuery::for_user("u").in_category("work"))
            .await
            .unwrap();

        assert_eq!(work.len(), 1);
        assert_eq!(work[0].title, "A");
    }

    // ==================== Categories ====================

    #[tokio::test]
    async fn test_categories_listed_by_name() {
        let store = store().await;
        for name in ["Zeta", "Alpha", "Mid"] {
            store
                .create_category(&NewCategory::named("u", name))
                .await
                .unwrap();
        }
        store
            .create_category(&NewCategory::named("other", "Beta"))
            .await
            .unwrap();

        let names: Vec<_> = store
            .list_categories("u")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
    }

    #[tokio::test]
    async fn test_duplicate_category_is_reported() {
        let store = store().await;
        store
            .create_category(&NewCategory::named("u", "Work"))
            .await
            .unwrap();

        let err = store
            .create_category(&NewCategory::named("u", "Work"))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::DuplicateCategory(name) if name == "Work"));
    }
}
