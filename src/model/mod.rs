//! Classification data model

mod context;
mod taggable;

pub use context::{Context, ContextId, DEFAULT_CONTEXT};
pub use taggable::{slugify, Category, Collection, Tag, Taggable, TaggableId, TaggableKind};
