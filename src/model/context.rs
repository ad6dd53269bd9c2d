//! Context: a named partition that taggable entities belong to

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of the context every unassigned entity falls back to.
pub const DEFAULT_CONTEXT: &str = "default";

/// Unique identifier for a context
///
/// Serializes as a plain string (UUID or semantic ID like "default")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(String);

impl ContextId {
    /// Create a new random ContextId (UUID-based)
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a ContextId from a string (semantic ID)
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The well-known default context identifier
    pub fn default_context() -> Self {
        Self(DEFAULT_CONTEXT.to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_CONTEXT
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContextId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ContextId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A named partition of tags, collections and categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Unique identifier
    pub id: ContextId,
    /// Human-readable name
    pub name: String,
    /// Disabled contexts are kept but hidden from consumers
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Context {
    /// Create a new enabled context with a specific ID and name
    pub fn with_id(id: ContextId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the enabled flag
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Update the last modified timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Context {
    /// A blank, disabled context with a random ID, as handed out by
    /// `ContextStore::create_context` before the caller fills it in.
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: ContextId::new(),
            name: String::new(),
            enabled: false,
            created_at: now,
            updated_at: now,
        }
    }
}
