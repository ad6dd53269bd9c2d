//! Storage backends for classification data
//!
//! Every backend implements `ContextStore` plus one `TaggableStore` per
//! entity kind. `SqliteStore` is the persistent implementation used by the
//! CLI; `MemoryStore` keeps everything in process.

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{ContextStore, OpenStore, StorageError, StorageResult, TaggableStore};

use crate::model::{Category, Collection, Tag};

/// A single backend providing every store the classification model needs
pub trait ClassificationStore:
    ContextStore + TaggableStore<Tag> + TaggableStore<Collection> + TaggableStore<Category>
{
}

impl<S> ClassificationStore for S where
    S: ContextStore + TaggableStore<Tag> + TaggableStore<Collection> + TaggableStore<Category>
{
}
