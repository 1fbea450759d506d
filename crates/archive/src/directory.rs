use std::path::Path;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use types::{EntryInfo, EntryType, ErrorKind, Result};

/// Walks an ordinary filesystem directory. Every other handler treats a
/// directory's contents as the natural recursion base case; this one has no
/// container format to parse.
pub struct DirectoryHandler;

impl DirectoryHandler {
    pub fn new() -> Self {
        Self
    }

    fn walk(root: &Path, dir: &Path, out: &mut Vec<EntryInfo>) -> Result<()> {
        let read_dir = std::fs::read_dir(dir).map_err(|e| ErrorKind::io(dir, e))?;
        for entry in read_dir {
            let entry = entry.map_err(|e| ErrorKind::io(dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| ErrorKind::io(&path, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let rel_path = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");

            let metadata = entry.metadata().ok();
            let modified_time = metadata
                .as_ref()
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Utc>::from);
            let size = if file_type.is_dir() {
                0
            } else {
                metadata.map(|m| m.len()).unwrap_or(0)
            };

            let entry_type = if file_type.is_dir() {
                EntryType::Directory
            } else {
                EntryType::File
            };

            out.push(EntryInfo {
                name,
                rel_path: rel_path.clone(),
                abs_path: path.to_string_lossy().replace('\\', "/"),
                entry_type,
                size,
                modified_time,
                name_in_arc: rel_path,
            });

            if file_type.is_dir() {
                Self::walk(root, &path, out)?;
            }
        }
        Ok(())
    }
}

impl Default for DirectoryHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl super::ArchiveHandler for DirectoryHandler {
    fn can_handle(&self, path: &str) -> bool {
        Path::new(path).is_dir()
    }

    fn list_all_entries(&self, archive_path: &str) -> Result<Vec<EntryInfo>> {
        let root = Path::new(archive_path);
        let mut out = Vec::new();
        Self::walk(root, root, &mut out)?;
        Ok(out)
    }

    fn read_file(&self, archive_path: &str, name_in_arc: &str) -> Result<Bytes> {
        let path = Path::new(archive_path).join(name_in_arc);
        let bytes = std::fs::read(&path).map_err(|e| ErrorKind::io(&path, e))?;
        Ok(Bytes::from(bytes))
    }

    fn can_archive(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}
