use bytes::Bytes;
use types::{EntryInfo, Result};

/// One format implementation: enumerate, read, stream (spec component C3).
///
/// Implementors own whatever state they need to re-open an archive cheaply
/// (a cached file handle, a parsed central directory, ...); `set_current_path`
/// is the hook that lets them prime that state before the first enumeration.
pub trait ArchiveHandler: Send + Sync {
    /// Cheap, signature-free classification by path string (extension match).
    fn can_handle(&self, path: &str) -> bool;

    /// Enumerates every entry in the archive at `archive_path`.
    ///
    /// Returned entries are **raw**: `rel_path` is the handler-internal path
    /// (forward-slash, no leading slash) and `entry_type` is only ever
    /// `Directory` or `File` — promotion to `Archive` and root-relative path
    /// rewriting happen later, in the entry cache's finalize step.
    fn list_all_entries(&self, archive_path: &str) -> Result<Vec<EntryInfo>>;

    /// Reads one entry's content in full, addressed by its handler-internal
    /// path (`EntryInfo::name_in_arc`).
    fn read_file(&self, archive_path: &str, name_in_arc: &str) -> Result<Bytes>;

    /// Opens a streaming reader for one entry, if the format supports it
    /// without reading the whole entry into memory first. Returning `None`
    /// is always legal (§4.3) and forces the caller back onto `read_file`;
    /// none of this workspace's handlers need streaming reads for their
    /// entry sizes, so the default (and every provided handler) is `None`.
    fn open_stream(
        &self,
        _archive_path: &str,
        _name_in_arc: &str,
    ) -> Option<Box<dyn std::io::Read + Send>> {
        None
    }

    /// Advisory: lets a handler cache an opened archive for `root`.
    fn set_current_path(&self, _root: &str) {}

    /// True iff this handler reads container (archive) formats, as opposed
    /// to the directory handler walking the plain filesystem.
    fn can_archive(&self) -> bool {
        true
    }

    /// Human-readable name used in diagnostics.
    fn name(&self) -> &'static str;
}
