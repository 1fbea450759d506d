//! Archive manager façade (spec component C5).

use archive::HandlerRegistry;
use bytes::Bytes;
use parking_lot::RwLock;
use tracing::{info, instrument};
use types::{EntryInfo, ErrorKind, Result};

use crate::cache::{self, EntryCache};
use crate::temp_file_manager::TempFileManager;

struct OpenState {
    root: String,
    cache: EntryCache,
}

/// Owns the current root, its entry cache, and the temp files materialized
/// while resolving nested archives. The cache is replaced atomically on
/// `open()`; reads never block each other.
pub struct ArchiveManager {
    registry: HandlerRegistry,
    state: RwLock<Option<OpenState>>,
    temp_mgr: TempFileManager,
}

impl ArchiveManager {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry,
            state: RwLock::new(None),
            temp_mgr: TempFileManager::new(),
        }
    }

    #[instrument(skip(self), fields(root = %root))]
    pub fn open(&self, root: &str) -> Result<()> {
        let root = paths::normalize_display(root)?;
        let cache = cache::build(&root, &self.registry, &self.temp_mgr)?;
        info!(entries = cache.len(), "opened root");
        *self.state.write() = Some(OpenState { root, cache });
        Ok(())
    }

    pub fn current_root(&self) -> Option<String> {
        self.state.read().as_ref().map(|s| s.root.clone())
    }

    pub fn get_entry_info(&self, rel_path: &str) -> Option<EntryInfo> {
        self.state
            .read()
            .as_ref()
            .and_then(|s| s.cache.get(rel_path).cloned())
    }

    pub fn list_entries(&self, rel_dir: &str) -> Vec<EntryInfo> {
        self.state
            .read()
            .as_ref()
            .map(|s| s.cache.children_of(rel_dir).into_iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn image_entries_sorted(&self) -> Vec<EntryInfo> {
        self.state
            .read()
            .as_ref()
            .map(|s| s.cache.image_entries_sorted())
            .unwrap_or_default()
    }

    /// Resolves `rel_path` to its bytes, recursing through nested archive
    /// boundaries as needed. Per §4.5, materialized temp files for nested
    /// archives are cached for the manager's lifetime.
    #[instrument(skip(self), fields(rel_path = %rel_path))]
    pub fn extract_item(&self, rel_path: &str) -> Result<Bytes> {
        let guard = self.state.read();
        let state = guard
            .as_ref()
            .ok_or_else(|| ErrorKind::NotFound("no root is open".to_string()))?;

        let _entry = state
            .cache
            .get(rel_path)
            .ok_or_else(|| ErrorKind::NotFound(rel_path.to_string()))?;

        // Walk up through archive ancestors to find the nearest one whose
        // bytes are already resolvable directly (the root, or a nested
        // archive already materialized by cache::build).
        let mut containing = rel_path;
        loop {
            match paths::parent_of(containing) {
                Some(parent) => {
                    let parent_entry = state
                        .cache
                        .get(parent)
                        .ok_or_else(|| ErrorKind::NotFound(parent.to_string()))?;
                    if parent_entry.entry_type == types::EntryType::Archive {
                        return self.extract_within_archive(state, parent, rel_path);
                    }
                    containing = parent;
                }
                None => {
                    // rel_path is a top-level child of the root itself.
                    let handler = self
                        .registry
                        .get_handler(&state.root)
                        .ok_or_else(|| ErrorKind::UnsupportedFormat(state.root.clone()))?;
                    let entry = state.cache.get(rel_path).unwrap();
                    return handler.read_file(&state.root, &entry.name_in_arc);
                }
            }
        }
    }

    fn extract_within_archive(
        &self,
        state: &OpenState,
        archive_rel_path: &str,
        item_rel_path: &str,
    ) -> Result<Bytes> {
        let archive_temp_path = if archive_rel_path.is_empty() {
            // The root itself is the archive; no materialized temp file
            // exists (or is needed) for it.
            state.root.clone()
        } else {
            self.temp_mgr
                .path_for(archive_rel_path)
                .ok_or_else(|| ErrorKind::NotFound(archive_rel_path.to_string()))?
        };
        let handler = self
            .registry
            .get_handler(&archive_temp_path)
            .ok_or_else(|| ErrorKind::UnsupportedFormat(archive_temp_path.clone()))?;
        let entry = state
            .cache
            .get(item_rel_path)
            .ok_or_else(|| ErrorKind::NotFound(item_rel_path.to_string()))?;
        handler.read_file(&archive_temp_path, &entry.name_in_arc)
    }

    pub fn close(&self) {
        *self.state.write() = None;
        self.temp_mgr.clear();
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn open_then_extract_nested_zip_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let inner_path = dir.path().join("inner.zip");
        {
            let file = std::fs::File::create(&inner_path).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            zip.start_file("pics/cat.png", zip::write::FileOptions::default())
                .unwrap();
            let mut payload = vec![0x89, 0x50, 0x4E, 0x47];
            payload.extend(std::iter::repeat_n(b'x', 96));
            zip.write_all(&payload).unwrap();
            zip.finish().unwrap();
        }
        let outer_path = dir.path().join("archive.zip");
        {
            let file = std::fs::File::create(&outer_path).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            zip.start_file("inner.zip", zip::write::FileOptions::default())
                .unwrap();
            zip.write_all(&std::fs::read(&inner_path).unwrap()).unwrap();
            zip.finish().unwrap();
        }

        let manager = ArchiveManager::new(archive::default_registry());
        manager.open(outer_path.to_str().unwrap()).unwrap();

        let bytes = manager.extract_item("inner.zip/pics/cat.png").unwrap();
        assert_eq!(bytes.len(), 100);
        assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);

        manager.close();
        assert!(manager.current_root().is_none());
    }

    #[test]
    fn open_failure_leaves_previous_state_intact() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("a.zip");
        std::fs::write(&plain, b"not a zip").unwrap();

        let manager = ArchiveManager::new(archive::default_registry());
        let prior_root_dir = tempfile::tempdir().unwrap();
        manager.open(prior_root_dir.path().to_str().unwrap()).unwrap();
        let before = manager.current_root();

        assert!(manager.open(plain.to_str().unwrap()).is_err());
        assert_eq!(manager.current_root(), before);
    }
}
