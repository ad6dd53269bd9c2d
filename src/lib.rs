//! Classification: tags, collections and categories partitioned by context
//!
//! Every taggable entity belongs to a context. Older data may carry entities
//! with no context at all; `ContextBackfill` repairs that by ensuring the
//! well-known `"default"` context exists and attaching it wherever a context
//! is missing.
//!
//! # Core Concepts
//!
//! - **Contexts**: named partitions, one of which is the default
//! - **Taggables**: tags, collections and categories, each referencing a context
//! - **Stores**: `ContextStore` and `TaggableStore<T>` traits, backed by SQLite or memory
//!
//! # Example
//!
//! ```
//! use classification::{ContextBackfill, MemoryStore, Tag, TaggableStore};
//!
//! let store = MemoryStore::new();
//! store.save(&Tag::new("unfiled")).unwrap();
//!
//! let mut out = Vec::new();
//! let report = ContextBackfill::with_store(&store).run(&mut out).unwrap();
//! assert!(report.context_created);
//! assert_eq!(report.tags.attached, 1);
//! ```

pub mod config;
pub mod fix_context;
pub mod logging;
mod model;
pub mod storage;

pub use fix_context::{BackfillError, BackfillReport, BackfillResult, ContextBackfill, KindReport};
pub use model::{
    slugify, Category, Collection, Context, ContextId, Tag, Taggable, TaggableId, TaggableKind,
    DEFAULT_CONTEXT,
};
pub use storage::{
    ClassificationStore, ContextStore, MemoryStore, OpenStore, SqliteStore, StorageError,
    StorageResult, TaggableStore,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
