//! SQLite storage backend

use super::traits::{ContextStore, OpenStore, StorageError, StorageResult, TaggableStore};
use crate::model::{Category, Collection, Context, ContextId, Tag, TaggableId};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed classification store
///
/// Uses a single SQLite database file with one table for contexts and one
/// per taggable kind. Thread-safe via internal mutex on the connection.
/// Enumeration returns rows in insertion order (`rowid`); upserts keep the
/// original row.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Initialize the database schema
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- Enable WAL mode for concurrent reads during writes
            PRAGMA journal_mode = WAL;

            CREATE TABLE IF NOT EXISTS contexts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                enabled INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tags (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL,
                enabled INTEGER NOT NULL,
                context_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (context_id) REFERENCES contexts(id)
            );

            CREATE TABLE IF NOT EXISTS collections (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL,
                description TEXT,
                enabled INTEGER NOT NULL,
                context_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (context_id) REFERENCES contexts(id)
            );

            CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL,
                description TEXT,
                enabled INTEGER NOT NULL,
                parent_id TEXT,
                position INTEGER NOT NULL DEFAULT 0,
                context_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (context_id) REFERENCES contexts(id),
                FOREIGN KEY (parent_id) REFERENCES categories(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tags_context ON tags(context_id);
            CREATE INDEX IF NOT EXISTS idx_collections_context ON collections(context_id);
            CREATE INDEX IF NOT EXISTS idx_categories_context ON categories(context_id);
            "#,
        )?;

        Ok(())
    }

    fn parse_time(raw: &str) -> StorageResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| StorageError::DateParse(e.to_string()))
    }

    fn parse_id(raw: &str) -> StorageResult<TaggableId> {
        raw.parse()
            .map_err(|e: uuid::Error| StorageError::InvalidId(format!("{}: {}", raw, e)))
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let conn = self.conn.lock().unwrap();
        f(&conn)
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

// === Context Operations ===

type ContextRow = (String, String, bool, String, String);

fn row_to_context((id, name, enabled, created_at, updated_at): ContextRow) -> StorageResult<Context> {
    Ok(Context {
        id: ContextId::from_string(id),
        name,
        enabled,
        created_at: SqliteStore::parse_time(&created_at)?,
        updated_at: SqliteStore::parse_time(&updated_at)?,
    })
}

impl ContextStore for SqliteStore {
    fn find_context(&self, id: &ContextId) -> StorageResult<Option<Context>> {
        self.with_conn(|conn| {
            let row: Option<ContextRow> = conn
                .query_row(
                    "SELECT id, name, enabled, created_at, updated_at FROM contexts WHERE id = ?1",
                    params![id.as_str()],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
                )
                .optional()?;

            row.map(row_to_context).transpose()
        })
    }

    fn save_context(&self, context: &Context) -> StorageResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO contexts (id, name, enabled, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    enabled = excluded.enabled,
                    updated_at = excluded.updated_at
                "#,
                params![
                    context.id.as_str(),
                    context.name,
                    context.enabled,
                    context.created_at.to_rfc3339(),
                    context.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }

    fn list_contexts(&self) -> StorageResult<Vec<Context>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, enabled, created_at, updated_at FROM contexts ORDER BY rowid",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })?;

            let mut contexts = Vec::new();
            for row in rows {
                contexts.push(row_to_context(row?)?);
            }
            Ok(contexts)
        })
    }
}

// === Tag Operations ===

impl TaggableStore<Tag> for SqliteStore {
    fn find_all(&self) -> StorageResult<Vec<Tag>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, slug, enabled, context_id, created_at, updated_at
                 FROM tags ORDER BY rowid",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, bool>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?;

            let mut tags = Vec::new();
            for row in rows {
                let (id, name, slug, enabled, context_id, created_at, updated_at) = row?;
                tags.push(Tag {
                    id: Self::parse_id(&id)?,
                    name,
                    slug,
                    enabled,
                    context: context_id.map(ContextId::from),
                    created_at: Self::parse_time(&created_at)?,
                    updated_at: Self::parse_time(&updated_at)?,
                });
            }
            Ok(tags)
        })
    }

    fn save(&self, tag: &Tag) -> StorageResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO tags (id, name, slug, enabled, context_id, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    slug = excluded.slug,
                    enabled = excluded.enabled,
                    context_id = excluded.context_id,
                    updated_at = excluded.updated_at
                "#,
                params![
                    tag.id.to_string(),
                    tag.name,
                    tag.slug,
                    tag.enabled,
                    tag.context.as_ref().map(|c| c.as_str()),
                    tag.created_at.to_rfc3339(),
                    tag.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }
}

// === Collection Operations ===

impl TaggableStore<Collection> for SqliteStore {
    fn find_all(&self) -> StorageResult<Vec<Collection>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, slug, description, enabled, context_id, created_at, updated_at
                 FROM collections ORDER BY rowid",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, bool>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })?;

            let mut collections = Vec::new();
            for row in rows {
                let (id, name, slug, description, enabled, context_id, created_at, updated_at) = row?;
                collections.push(Collection {
                    id: Self::parse_id(&id)?,
                    name,
                    slug,
                    description,
                    enabled,
                    context: context_id.map(ContextId::from),
                    created_at: Self::parse_time(&created_at)?,
                    updated_at: Self::parse_time(&updated_at)?,
                });
            }
            Ok(collections)
        })
    }

    fn save(&self, collection: &Collection) -> StorageResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO collections (id, name, slug, description, enabled, context_id, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    slug = excluded.slug,
                    description = excluded.description,
                    enabled = excluded.enabled,
                    context_id = excluded.context_id,
                    updated_at = excluded.updated_at
                "#,
                params![
                    collection.id.to_string(),
                    collection.name,
                    collection.slug,
                    collection.description,
                    collection.enabled,
                    collection.context.as_ref().map(|c| c.as_str()),
                    collection.created_at.to_rfc3339(),
                    collection.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }
}

// === Category Operations ===

impl TaggableStore<Category> for SqliteStore {
    fn find_all(&self) -> StorageResult<Vec<Category>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, slug, description, enabled, parent_id, position, context_id,
                        created_at, updated_at
                 FROM categories ORDER BY rowid",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, bool>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, i64>(6)?,
                    row.get::<_, Option<String>>(7)?,
                    row.get::<_, String>(8)?,
                    row.get::<_, String>(9)?,
                ))
            })?;

            let mut categories = Vec::new();
            for row in rows {
                let (id, name, slug, description, enabled, parent_id, position, context_id, created_at, updated_at) =
                    row?;
                categories.push(Category {
                    id: Self::parse_id(&id)?,
                    name,
                    slug,
                    description,
                    enabled,
                    parent: parent_id.as_deref().map(Self::parse_id).transpose()?,
                    position,
                    context: context_id.map(ContextId::from),
                    created_at: Self::parse_time(&created_at)?,
                    updated_at: Self::parse_time(&updated_at)?,
                });
            }
            Ok(categories)
        })
    }

    fn save(&self, category: &Category) -> StorageResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO categories (id, name, slug, description, enabled, parent_id, position,
                                        context_id, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    slug = excluded.slug,
                    description = excluded.description,
                    enabled = excluded.enabled,
                    parent_id = excluded.parent_id,
                    position = excluded.position,
                    context_id = excluded.context_id,
                    updated_at = excluded.updated_at
                "#,
                params![
                    category.id.to_string(),
                    category.name,
                    category.slug,
                    category.description,
                    category.enabled,
                    category.parent.map(|p| p.to_string()),
                    category.position,
                    category.context.as_ref().map(|c| c.as_str()),
                    category.created_at.to_rfc3339(),
                    category.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Taggable;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_save_and_find_context() {
        let store = create_test_store();
        let ctx = Context::with_id(ContextId::from("news"), "News").with_enabled(false);
        store.save_context(&ctx).unwrap();

        let loaded = store.find_context(&ctx.id).unwrap().unwrap();
        assert_eq!(loaded.name, "News");
        assert!(!loaded.enabled);
        assert_eq!(loaded.created_at, ctx.created_at);

        assert!(store.find_context(&ContextId::default_context()).unwrap().is_none());
    }

    #[test]
    fn test_save_context_upserts_without_duplicating() {
        let store = create_test_store();
        let mut ctx = Context::with_id(ContextId::default_context(), "Default");
        store.save_context(&ctx).unwrap();

        ctx.name = "Renamed".to_string();
        ctx.touch();
        store.save_context(&ctx).unwrap();

        let all = store.list_contexts().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Renamed");
    }

    #[test]
    fn test_tag_round_trip_with_and_without_context() {
        let store = create_test_store();
        let ctx = Context::with_id(ContextId::from("x"), "X");
        store.save_context(&ctx).unwrap();

        let orphan = Tag::new("Orphan Tag");
        let placed = Tag::new("Placed").in_context(ctx.id.clone());
        store.save(&orphan).unwrap();
        store.save(&placed).unwrap();

        let tags: Vec<Tag> = store.find_all().unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0], orphan);
        assert_eq!(tags[0].slug, "orphan-tag");
        assert!(tags[0].context().is_none());
        assert_eq!(tags[1].context(), Some(&ctx.id));
    }

    #[test]
    fn test_collection_round_trip() {
        let store = create_test_store();
        let collection = Collection::new("Summer 2024").with_description("Seasonal picks");
        store.save(&collection).unwrap();

        let loaded: Vec<Collection> = store.find_all().unwrap();
        assert_eq!(loaded, vec![collection]);
    }

    #[test]
    fn test_category_round_trip_with_parent() {
        let store = create_test_store();
        let root = Category::new("Root");
        let mut child = Category::new("Child").with_parent(root.id);
        child.position = 3;
        store.save(&root).unwrap();
        store.save(&child).unwrap();

        let loaded: Vec<Category> = store.find_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].parent, Some(root.id));
        assert_eq!(loaded[1].position, 3);
    }

    #[test]
    fn test_update_keeps_enumeration_order() {
        let store = create_test_store();
        let first = Tag::new("first");
        let mut second = Tag::new("second");
        store.save(&first).unwrap();
        store.save(&second).unwrap();

        store.save_context(&Context::with_id(ContextId::default_context(), "Default")).unwrap();
        second.set_context(Some(ContextId::default_context()));
        store.save(&second).unwrap();

        let tags: Vec<Tag> = store.find_all().unwrap();
        assert_eq!(tags[0].slug, "first");
        assert_eq!(tags[1].slug, "second");
        assert_eq!(tags[1].context, Some(ContextId::default_context()));
    }

    #[test]
    fn test_unknown_context_reference_is_rejected() {
        let store = create_test_store();
        let tag = Tag::new("dangling").in_context(ContextId::from("missing"));

        let err = store.save(&tag).unwrap_err();
        assert!(matches!(err, StorageError::Database(_)));
    }

    #[test]
    fn test_wal_mode_enabled_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("nested/classification.db")).unwrap();

        let mode: String = store
            .with_conn(|conn| Ok(conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }
}
