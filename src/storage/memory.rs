//! In-process storage backend
//!
//! Keeps contexts and taggable entities in `DashMap`s. Enumeration order is
//! first-insertion order, matching what `SqliteStore` returns.

use super::traits::{ContextStore, OpenStore, StorageResult, TaggableStore};
use crate::model::{Category, Collection, Context, ContextId, Tag, Taggable, TaggableId};
use dashmap::DashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Entities of one kind, tagged with their insertion sequence number
struct Table<T> {
    rows: DashMap<TaggableId, (u64, T)>,
}

impl<T: Taggable + Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: DashMap::new(),
        }
    }

    fn all(&self) -> Vec<T> {
        let mut rows: Vec<(u64, T)> = self.rows.iter().map(|r| r.value().clone()).collect();
        rows.sort_by_key(|(seq, _)| *seq);
        rows.into_iter().map(|(_, entity)| entity).collect()
    }

    fn upsert(&self, entity: &T, next_seq: &AtomicU64) {
        let mut slot = self
            .rows
            .entry(entity.id())
            .or_insert_with(|| (next_seq.fetch_add(1, Ordering::Relaxed), entity.clone()));
        slot.1 = entity.clone();
    }
}

/// Store backed by concurrent hash maps; contents vanish with the value
pub struct MemoryStore {
    contexts: DashMap<ContextId, (u64, Context)>,
    tags: Table<Tag>,
    collections: Table<Collection>,
    categories: Table<Category>,
    seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            contexts: DashMap::new(),
            tags: Table::new(),
            collections: Table::new(),
            categories: Table::new(),
            seq: AtomicU64::new(0),
        }
    }

    /// Number of stored contexts
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenStore for MemoryStore {
    /// Memory stores have nothing on disk; the path is ignored.
    fn open(_path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self::new())
    }

    fn open_in_memory() -> StorageResult<Self> {
        Ok(Self::new())
    }
}

impl ContextStore for MemoryStore {
    fn find_context(&self, id: &ContextId) -> StorageResult<Option<Context>> {
        Ok(self.contexts.get(id).map(|r| r.value().1.clone()))
    }

    fn save_context(&self, context: &Context) -> StorageResult<()> {
        let mut slot = self
            .contexts
            .entry(context.id.clone())
            .or_insert_with(|| (self.seq.fetch_add(1, Ordering::Relaxed), context.clone()));
        slot.1 = context.clone();
        Ok(())
    }

    fn list_contexts(&self) -> StorageResult<Vec<Context>> {
        let mut rows: Vec<(u64, Context)> =
            self.contexts.iter().map(|r| r.value().clone()).collect();
        rows.sort_by_key(|(seq, _)| *seq);
        Ok(rows.into_iter().map(|(_, ctx)| ctx).collect())
    }
}

impl TaggableStore<Tag> for MemoryStore {
    fn find_all(&self) -> StorageResult<Vec<Tag>> {
        Ok(self.tags.all())
    }

    fn save(&self, entity: &Tag) -> StorageResult<()> {
        self.tags.upsert(entity, &self.seq);
        Ok(())
    }
}

impl TaggableStore<Collection> for MemoryStore {
    fn find_all(&self) -> StorageResult<Vec<Collection>> {
        Ok(self.collections.all())
    }

    fn save(&self, entity: &Collection) -> StorageResult<()> {
        self.collections.upsert(entity, &self.seq);
        Ok(())
    }
}

impl TaggableStore<Category> for MemoryStore {
    fn find_all(&self) -> StorageResult<Vec<Category>> {
        Ok(self.categories.all())
    }

    fn save(&self, entity: &Category) -> StorageResult<()> {
        self.categories.upsert(entity, &self.seq);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_all_keeps_insertion_order() {
        let store = MemoryStore::new();
        let tags: Vec<Tag> = ["zeta", "alpha", "mid"].iter().map(|n| Tag::new(*n)).collect();
        for tag in &tags {
            TaggableStore::<Tag>::save(&store, tag).unwrap();
        }

        let loaded: Vec<Tag> = store.find_all().unwrap();
        let slugs: Vec<&str> = loaded.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_save_updates_in_place() {
        let store = MemoryStore::new();
        let first = Category::new("first");
        let mut second = Category::new("second");
        store.save(&first).unwrap();
        store.save(&second).unwrap();

        second.set_context(Some(ContextId::default_context()));
        store.save(&second).unwrap();

        let loaded: Vec<Category> = store.find_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].slug, "second");
        assert_eq!(loaded[1].context, Some(ContextId::default_context()));
    }

    #[test]
    fn test_context_round_trip() {
        let store = MemoryStore::new();
        assert!(store.find_context(&ContextId::default_context()).unwrap().is_none());

        let ctx = Context::with_id(ContextId::default_context(), "Default");
        store.save_context(&ctx).unwrap();

        let loaded = store.find_context(&ctx.id).unwrap().unwrap();
        assert_eq!(loaded, ctx);
        assert_eq!(store.context_count(), 1);
        assert_eq!(store.list_contexts().unwrap().len(), 1);
    }
}
