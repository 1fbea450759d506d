use bytes::Bytes;
use types::{EntryInfo, ErrorKind, Result};

/// A handler that recognizes a format's extension (so the handler registry
/// and entry-cache finalization still classify it as `Archive`) but has no
/// decoder available in this workspace. Enumeration fails loudly with
/// `UnsupportedFormat` rather than silently misreading the container —
/// see DESIGN.md for why rar/7z stop here.
pub struct UnsupportedHandler {
    format: &'static str,
    extensions: &'static [&'static str],
}

impl UnsupportedHandler {
    pub fn rar() -> Self {
        Self {
            format: "rar",
            extensions: &[".rar", ".cbr"],
        }
    }

    pub fn sevenzip() -> Self {
        Self {
            format: "7z",
            extensions: &[".7z", ".cb7"],
        }
    }
}

impl super::ArchiveHandler for UnsupportedHandler {
    fn can_handle(&self, path: &str) -> bool {
        let lower = path.to_ascii_lowercase();
        self.extensions.iter().any(|ext| lower.ends_with(ext))
    }

    fn list_all_entries(&self, archive_path: &str) -> Result<Vec<EntryInfo>> {
        Err(ErrorKind::UnsupportedFormat(format!(
            "{} ({} decoding is not available)",
            archive_path, self.format
        )))
    }

    fn read_file(&self, archive_path: &str, _name_in_arc: &str) -> Result<Bytes> {
        Err(ErrorKind::UnsupportedFormat(format!(
            "{} ({} decoding is not available)",
            archive_path, self.format
        )))
    }

    fn name(&self) -> &'static str {
        self.format
    }
}
