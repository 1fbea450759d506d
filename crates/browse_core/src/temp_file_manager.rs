//! RAII ownership of materialized nested-archive temp files (part of C5).
//!
//! Every temp file created for this process lives as long as the owning
//! `TempFileManager`; dropping it (on `close()` or process exit) removes the
//! files. Materialization is memoized by the nested archive's `rel_path` so a
//! deeply-nested path that is visited repeatedly during one `open()` cycle
//! only extracts once.

use std::collections::HashMap;
use std::io::Write;

use parking_lot::Mutex;
use tempfile::NamedTempFile;
use types::{ErrorKind, Result};

pub struct TempFileManager {
    files: Mutex<HashMap<String, NamedTempFile>>,
}

impl TempFileManager {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the on-disk path already materialized for `rel_path`, if any.
    pub fn path_for(&self, rel_path: &str) -> Option<String> {
        self.files
            .lock()
            .get(rel_path)
            .map(|f| f.path().to_string_lossy().into_owned())
    }

    /// Writes `bytes` to a fresh temp file suffixed like `hint_name` (so
    /// extension-based handler dispatch still works on the materialized
    /// path), memoized under `rel_path`.
    pub fn materialize(&self, rel_path: &str, hint_name: &str, bytes: &[u8]) -> Result<String> {
        if let Some(existing) = self.path_for(rel_path) {
            return Ok(existing);
        }

        let suffix = std::path::Path::new(hint_name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let mut file = tempfile::Builder::new()
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| ErrorKind::io(std::env::temp_dir(), e))?;
        file.write_all(bytes)
            .map_err(|e| ErrorKind::io(file.path(), e))?;
        file.flush().map_err(|e| ErrorKind::io(file.path(), e))?;

        let path = file.path().to_string_lossy().into_owned();
        self.files.lock().insert(rel_path.to_string(), file);
        Ok(path)
    }

    /// Drops every temp file, removing them from disk.
    pub fn clear(&self) {
        self.files.lock().clear();
    }
}

impl Default for TempFileManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn materialize_is_memoized_per_rel_path() {
        let mgr = TempFileManager::new();
        let p1 = mgr.materialize("a/b.zip", "b.zip", b"hello").unwrap();
        let p2 = mgr.materialize("a/b.zip", "b.zip", b"different-bytes").unwrap();
        assert_eq!(p1, p2);
        assert_eq!(std::fs::read(&p1).unwrap(), b"hello");
    }

    #[test]
    fn clear_removes_files_from_disk() {
        let mgr = TempFileManager::new();
        let path = mgr.materialize("x.zip", "x.zip", b"data").unwrap();
        assert!(std::path::Path::new(&path).exists());
        mgr.clear();
        assert!(!std::path::Path::new(&path).exists());
    }
}
