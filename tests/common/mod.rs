//! Common test utilities for context backfill tests
//!
//! `FaultyStore` wraps a `MemoryStore` and fails a chosen save so tests can
//! observe how a run behaves when persistence breaks halfway.

use classification::{
    Category, Collection, Context, ContextId, ContextStore, MemoryStore, StorageError,
    StorageResult, Tag, Taggable, TaggableKind, TaggableStore,
};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Where the injected failure fires
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    /// `save_context` always fails
    ContextSave,
    /// the n-th save (zero-based) of the given kind fails
    NthSave(TaggableKind, usize),
}

pub struct FaultyStore {
    pub inner: MemoryStore,
    fault: Fault,
    saves: AtomicUsize,
}

impl FaultyStore {
    pub fn new(inner: MemoryStore, fault: Fault) -> Self {
        Self {
            inner,
            fault,
            saves: AtomicUsize::new(0),
        }
    }

    fn check<T: Taggable>(&self) -> StorageResult<()> {
        if let Fault::NthSave(kind, n) = self.fault {
            if kind == T::KIND {
                let seen = self.saves.fetch_add(1, Ordering::SeqCst);
                if seen == n {
                    return Err(StorageError::Backend(format!("injected failure saving {}", kind)));
                }
            }
        }
        Ok(())
    }
}

impl ContextStore for FaultyStore {
    fn find_context(&self, id: &ContextId) -> StorageResult<Option<Context>> {
        self.inner.find_context(id)
    }

    fn save_context(&self, context: &Context) -> StorageResult<()> {
        if let Fault::ContextSave = self.fault {
            return Err(StorageError::Backend("injected failure saving context".into()));
        }
        self.inner.save_context(context)
    }

    fn list_contexts(&self) -> StorageResult<Vec<Context>> {
        self.inner.list_contexts()
    }
}

macro_rules! delegate_taggable {
    ($ty:ty) => {
        impl TaggableStore<$ty> for FaultyStore {
            fn find_all(&self) -> StorageResult<Vec<$ty>> {
                TaggableStore::<$ty>::find_all(&self.inner)
            }

            fn save(&self, entity: &$ty) -> StorageResult<()> {
                self.check::<$ty>()?;
                self.inner.save(entity)
            }
        }
    };
}

delegate_taggable!(Tag);
delegate_taggable!(Collection);
delegate_taggable!(Category);

/// Save a context with the given id and name
pub fn seed_context<S: ContextStore>(store: &S, id: &str, name: &str) -> Context {
    let ctx = Context::with_id(ContextId::from(id), name);
    store.save_context(&ctx).unwrap();
    ctx
}
