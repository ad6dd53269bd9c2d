//! Storage trait definitions

use crate::model::{Context, ContextId, Taggable};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Context not found: {0}")]
    ContextNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for contexts
///
/// Implementations must be thread-safe (Send + Sync).
pub trait ContextStore: Send + Sync {
    /// Load a context by ID
    fn find_context(&self, id: &ContextId) -> StorageResult<Option<Context>>;

    /// Hand out a new, unsaved context for the caller to fill in
    fn create_context(&self) -> Context {
        Context::default()
    }

    /// Create or update a context
    fn save_context(&self, context: &Context) -> StorageResult<()>;

    /// List all contexts
    fn list_contexts(&self) -> StorageResult<Vec<Context>>;
}

/// Persistence for one kind of taggable entity
pub trait TaggableStore<T: Taggable>: Send + Sync {
    /// Enumerate every entity of this kind, unfiltered
    fn find_all(&self) -> StorageResult<Vec<T>>;

    /// Save an entity (insert or update)
    fn save(&self, entity: &T) -> StorageResult<()>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
