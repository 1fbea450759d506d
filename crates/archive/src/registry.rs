use std::sync::Arc;

use parking_lot::Mutex;

use crate::handler::ArchiveHandler;

const HANDLER_CACHE_CAPACITY: usize = 512;

/// Ordered list of handlers, queried by path string (spec component C2).
///
/// `get_handler` is cheap to call repeatedly: the winning handler for a path
/// is memoized in a small bounded LRU so repeated lookups for the same
/// archive (e.g. one per navigation step) don't re-run every handler's
/// `can_handle`.
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn ArchiveHandler>>,
    cache: Mutex<lru::LruCache<String, usize>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            cache: Mutex::new(lru::LruCache::new(
                std::num::NonZeroUsize::new(HANDLER_CACHE_CAPACITY).expect("nonzero"),
            )),
        }
    }

    pub fn register(&mut self, handler: Arc<dyn ArchiveHandler>) {
        self.handlers.push(handler);
    }

    /// Returns the first registered handler whose `can_handle(path)` is true.
    pub fn get_handler(&self, path: &str) -> Option<Arc<dyn ArchiveHandler>> {
        if let Some(&idx) = self.cache.lock().get(path) {
            return self.handlers.get(idx).cloned();
        }
        for (idx, handler) in self.handlers.iter().enumerate() {
            if handler.can_handle(path) {
                self.cache.lock().put(path.to_string(), idx);
                return Some(handler.clone());
            }
        }
        None
    }

    /// True iff some registered archive-capable handler claims this
    /// extension; used by entry-cache finalization to promote `File` to
    /// `Archive`.
    pub fn is_archive_path(&self, path: &str) -> bool {
        self.handlers
            .iter()
            .any(|h| h.can_archive() && h.can_handle(path))
    }

    pub fn handlers(&self) -> &[Arc<dyn ArchiveHandler>] {
        &self.handlers
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
