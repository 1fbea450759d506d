use chrono::{DateTime, Utc};

/// Classification of a single cache entry.
///
/// A `File` is promoted to `Archive` during finalization when its extension
/// is claimed by a registered handler (see `archive::registry`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Directory,
    File,
    Archive,
    Other,
}

impl EntryType {
    pub fn is_container(self) -> bool {
        matches!(self, Self::Directory | Self::Archive)
    }
}

/// Immutable-after-finalize record describing one path reachable from the
/// current root, whether that root is a directory or a (possibly nested)
/// archive.
#[derive(Debug, Clone)]
pub struct EntryInfo {
    /// Leaf name, no path separator.
    pub name: String,
    /// Canonical forward-slash path relative to the root; `""` denotes the
    /// root itself.
    pub rel_path: String,
    /// Root joined with `rel_path`, kept only for display.
    pub abs_path: String,
    pub entry_type: EntryType,
    /// Bytes; always 0 for directories.
    pub size: u64,
    pub modified_time: Option<DateTime<Utc>>,
    /// Handler-internal path, opaque above the archive handler that produced
    /// it (e.g. the literal path stored inside a zip's central directory).
    pub name_in_arc: String,
}

impl EntryInfo {
    pub fn is_root(&self) -> bool {
        self.rel_path.is_empty()
    }

    /// Parent rel_path, or `None` if this entry is the root.
    pub fn parent_rel_path(&self) -> Option<&str> {
        if self.rel_path.is_empty() {
            return None;
        }
        match self.rel_path.rfind('/') {
            Some(idx) => Some(&self.rel_path[..idx]),
            None => Some(""),
        }
    }
}
