//! Get-or-load stores for the four resource kinds.
//!
//! Entries are never evicted: a resource loaded once is handed out (as the
//! same `Arc`) for the lifetime of the engine. The lock is released while a
//! loader runs, since loading one resource may look up others.

use crate::error::Result;
use crate::resource::{Chunk, Document, Template, Widget};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Document,
    Template,
    Chunk,
    Widget,
}

/// One keyed store.
pub struct Store<T> {
    entries: Mutex<FxHashMap<String, Arc<T>>>,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
        }
    }
}

impl<T> Store<T> {
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.entries.lock().get(key).cloned()
    }

    /// Return the cached entry for `key`, or run `load` and cache its result.
    ///
    /// A failed load caches nothing.
    pub fn get_or_load(&self, key: &str, load: impl FnOnce() -> Result<T>) -> Result<Arc<T>> {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }
        let loaded = Arc::new(load()?);
        // First insert wins if the loader re-entered with the same key.
        let entry = self
            .entries
            .lock()
            .entry(key.to_owned())
            .or_insert(loaded)
            .clone();
        Ok(entry)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
pub struct ResourceCache {
    pub docs: Store<Document>,
    pub templates: Store<Template>,
    pub chunks: Store<Chunk>,
    pub widgets: Store<Widget>,
}

impl ResourceCache {
    pub fn len(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Document => self.docs.len(),
            ResourceKind::Template => self.templates.len(),
            ResourceKind::Chunk => self.chunks.len(),
            ResourceKind::Widget => self.widgets.len(),
        }
    }
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("docs", &self.docs.len())
            .field("templates", &self.templates.len())
            .field("chunks", &self.chunks.len())
            .field("widgets", &self.widgets.len())
            .finish()
    }
}
