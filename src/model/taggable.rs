//! Taggable entities: tags, collections and categories
//!
//! The three kinds differ in a few descriptive fields but share the same
//! identity, slug and context reference. The `Taggable` trait exposes that
//! shared surface so context maintenance can treat them uniformly.

use super::context::ContextId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tag, collection or category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaggableId(Uuid);

impl TaggableId {
    /// Create a new random TaggableId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a TaggableId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaggableId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaggableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaggableId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Which kind of taggable entity a value is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaggableKind {
    Tag,
    Collection,
    Category,
}

impl TaggableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaggableKind::Tag => "tag",
            TaggableKind::Collection => "collection",
            TaggableKind::Category => "category",
        }
    }
}

impl std::fmt::Display for TaggableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared surface of tags, collections and categories
pub trait Taggable {
    const KIND: TaggableKind;

    fn id(&self) -> TaggableId;
    fn slug(&self) -> &str;
    fn context(&self) -> Option<&ContextId>;
    fn set_context(&mut self, context: Option<ContextId>);
}

/// Derive a URL-safe slug from a display name.
///
/// ASCII alphanumerics are lowercased and kept; every other run of
/// characters collapses into a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// A free-form label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TaggableId,
    pub name: String,
    pub slug: String,
    pub enabled: bool,
    pub context: Option<ContextId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: TaggableId::new(),
            slug: slugify(&name),
            name,
            enabled: true,
            context: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn in_context(mut self, context: ContextId) -> Self {
        self.context = Some(context);
        self
    }
}

/// A flat grouping of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: TaggableId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub context: Option<ContextId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: TaggableId::new(),
            slug: slugify(&name),
            name,
            description: None,
            enabled: true,
            context: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn in_context(mut self, context: ContextId) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A node in the category tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: TaggableId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub enabled: bool,
    /// Parent category, `None` for a root
    pub parent: Option<TaggableId>,
    /// Ordering among siblings
    pub position: i64,
    pub context: Option<ContextId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: TaggableId::new(),
            slug: slugify(&name),
            name,
            description: None,
            enabled: true,
            parent: None,
            position: 0,
            context: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn in_context(mut self, context: ContextId) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_parent(mut self, parent: TaggableId) -> Self {
        self.parent = Some(parent);
        self
    }
}

macro_rules! impl_taggable {
    ($ty:ty, $kind:expr) => {
        impl Taggable for $ty {
            const KIND: TaggableKind = $kind;

            fn id(&self) -> TaggableId {
                self.id
            }

            fn slug(&self) -> &str {
                &self.slug
            }

            fn context(&self) -> Option<&ContextId> {
                self.context.as_ref()
            }

            fn set_context(&mut self, context: Option<ContextId>) {
                self.context = context;
                self.updated_at = Utc::now();
            }
        }
    };
}

impl_taggable!(Tag, TaggableKind::Tag);
impl_taggable!(Collection, TaggableKind::Collection);
impl_taggable!(Category, TaggableKind::Category);
