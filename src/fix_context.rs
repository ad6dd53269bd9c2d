//! Default-context repair
//!
//! Ensures the well-known `"default"` context exists, then attaches it to
//! every tag, collection and category that has no context yet. Entities that
//! already point at some context are never touched, whichever context that is.
//!
//! The run is a single linear pass. It stops at the first store error;
//! entities saved before the failure keep their new context, so a later run
//! simply picks up the rest.

use crate::model::{Category, Collection, Context, ContextId, Taggable, TaggableKind, Tag};
use crate::storage::{ClassificationStore, ContextStore, StorageError, TaggableStore};
use std::io::Write;
use thiserror::Error;
use tracing::{debug, info};

/// Name given to the default context when it has to be created
pub const DEFAULT_CONTEXT_NAME: &str = "Default";

/// Errors that abort a backfill run
#[derive(Debug, Error)]
pub enum BackfillError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to write progress: {0}")]
    Output(#[from] std::io::Error),
}

/// Result type for backfill runs
pub type BackfillResult<T> = Result<T, BackfillError>;

/// Per-kind tally of a backfill step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindReport {
    /// Entities enumerated
    pub scanned: usize,
    /// Entities that received the default context
    pub attached: usize,
    /// Entities left alone because they already had a context
    pub skipped: usize,
}

/// Outcome of a completed backfill run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillReport {
    pub default_context: ContextId,
    /// True when this run had to create the default context
    pub context_created: bool,
    pub tags: KindReport,
    pub collections: KindReport,
    pub categories: KindReport,
}

impl BackfillReport {
    pub fn total_attached(&self) -> usize {
        self.tags.attached + self.collections.attached + self.categories.attached
    }

    /// True when the run changed nothing
    pub fn is_noop(&self) -> bool {
        !self.context_created && self.total_attached() == 0
    }

    pub fn kind(&self, kind: TaggableKind) -> &KindReport {
        match kind {
            TaggableKind::Tag => &self.tags,
            TaggableKind::Collection => &self.collections,
            TaggableKind::Category => &self.categories,
        }
    }
}

/// The default-context repair procedure over four stores
pub struct ContextBackfill<'a> {
    contexts: &'a dyn ContextStore,
    tags: &'a dyn TaggableStore<Tag>,
    collections: &'a dyn TaggableStore<Collection>,
    categories: &'a dyn TaggableStore<Category>,
}

impl<'a> ContextBackfill<'a> {
    pub fn new(
        contexts: &'a dyn ContextStore,
        tags: &'a dyn TaggableStore<Tag>,
        collections: &'a dyn TaggableStore<Collection>,
        categories: &'a dyn TaggableStore<Category>,
    ) -> Self {
        Self {
            contexts,
            tags,
            collections,
            categories,
        }
    }

    /// Use one backend for all four stores
    pub fn with_store<S: ClassificationStore>(store: &'a S) -> Self {
        Self::new(store, store, store, store)
    }

    /// Run the repair, writing progress lines to `out`
    pub fn run(&self, out: &mut dyn Write) -> BackfillResult<BackfillReport> {
        writeln!(out, "1. Checking default context")?;
        let (default_context, context_created) = self.ensure_default_context(out)?;

        writeln!(out, "2. Find tag without default context")?;
        let tags = backfill(self.tags, &default_context, out)?;

        writeln!(out, "3. Find collection without default context")?;
        let collections = backfill(self.collections, &default_context, out)?;

        writeln!(out, "4. Find category without default context")?;
        let categories = backfill(self.categories, &default_context, out)?;

        writeln!(out, "Done!")?;

        let report = BackfillReport {
            default_context: default_context.id,
            context_created,
            tags,
            collections,
            categories,
        };
        info!(
            context_created = report.context_created,
            attached = report.total_attached(),
            "context backfill complete"
        );
        Ok(report)
    }

    /// Find the default context, creating and saving it when missing.
    /// An existing default context is returned as-is.
    fn ensure_default_context(&self, out: &mut dyn Write) -> BackfillResult<(Context, bool)> {
        let id = ContextId::default_context();
        if let Some(existing) = self.contexts.find_context(&id)? {
            writeln!(out, " > default context exists")?;
            debug!(context = %existing.id, "default context found");
            return Ok((existing, false));
        }

        writeln!(out, " > default context is missing, creating one")?;
        let mut context = self.contexts.create_context();
        context.id = id;
        context.name = DEFAULT_CONTEXT_NAME.to_string();
        context.enabled = true;
        self.contexts.save_context(&context)?;
        info!(context = %context.id, "created default context");

        Ok((context, true))
    }
}

/// Attach `default_context` to every entity of one kind that has none
fn backfill<T: Taggable>(
    store: &dyn TaggableStore<T>,
    default_context: &Context,
    out: &mut dyn Write,
) -> BackfillResult<KindReport> {
    let mut report = KindReport::default();

    for mut entity in store.find_all()? {
        report.scanned += 1;
        if entity.context().is_some() {
            report.skipped += 1;
            debug!(kind = %T::KIND, id = %entity.id(), "context already set");
            continue;
        }

        writeln!(
            out,
            " > attach default context to {}: {} ({})",
            T::KIND,
            entity.slug(),
            entity.id()
        )?;
        entity.set_context(Some(default_context.id.clone()));
        store.save(&entity)?;
        report.attached += 1;
        info!(kind = %T::KIND, id = %entity.id(), slug = entity.slug(), "attached default context");
    }

    Ok(report)
}
