use std::fs::File;
use std::io::Read;

use bytes::Bytes;
use chrono::{TimeZone, Utc};
use types::{EntryInfo, EntryType, ErrorKind, Result};

/// Which decompression, if any, sits in front of the tar stream.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Compression {
    None,
    Gzip,
    Bzip2,
}

fn compression_for(path: &str) -> Option<Compression> {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".tar") {
        Some(Compression::None)
    } else if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
        Some(Compression::Gzip)
    } else if lower.ends_with(".tar.bz2") || lower.ends_with(".tbz2") {
        Some(Compression::Bzip2)
    } else {
        None
    }
}

fn open_reader(path: &str, compression: Compression) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| ErrorKind::io(path, e))?;
    Ok(match compression {
        Compression::None => Box::new(file),
        Compression::Gzip => Box::new(flate2::read::GzDecoder::new(file)),
        Compression::Bzip2 => Box::new(bzip2::read::BzDecoder::new(file)),
    })
}

/// tar, tar.gz, tar.bz2 (and `.cbr`-style extension-only aliases are handled
/// by the zip/rar handlers respectively, not here).
pub struct TarHandler;

impl TarHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TarHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl super::ArchiveHandler for TarHandler {
    fn can_handle(&self, path: &str) -> bool {
        compression_for(path).is_some()
    }

    fn list_all_entries(&self, archive_path: &str) -> Result<Vec<EntryInfo>> {
        let compression = compression_for(archive_path)
            .ok_or_else(|| ErrorKind::UnsupportedFormat(archive_path.to_string()))?;
        let reader = open_reader(archive_path, compression)?;
        let mut archive = tar::Archive::new(reader);
        let mut out = Vec::new();
        let entries = archive
            .entries()
            .map_err(|e| ErrorKind::CorruptArchive(format!("{archive_path}: {e}")))?;
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(archive = archive_path, error = %e, "skipping unreadable tar entry");
                    continue;
                }
            };
            let header = entry.header();
            let path = match entry.path() {
                Ok(p) => p.to_string_lossy().replace('\\', "/"),
                Err(_) => continue,
            };
            let rel_path = path.trim_end_matches('/').to_string();
            if rel_path.is_empty() {
                continue;
            }
            let entry_type = if header.entry_type().is_dir() {
                EntryType::Directory
            } else {
                EntryType::File
            };
            let modified_time = header
                .mtime()
                .ok()
                .and_then(|secs| Utc.timestamp_opt(secs as i64, 0).single());
            let size = if entry_type == EntryType::Directory {
                0
            } else {
                header.size().unwrap_or(0)
            };
            out.push(EntryInfo {
                name: paths::leaf_name(&rel_path).to_string(),
                rel_path: rel_path.clone(),
                abs_path: format!("{archive_path}:/{rel_path}"),
                entry_type,
                size,
                modified_time,
                name_in_arc: rel_path,
            });
        }
        Ok(out)
    }

    fn read_file(&self, archive_path: &str, name_in_arc: &str) -> Result<Bytes> {
        let compression = compression_for(archive_path)
            .ok_or_else(|| ErrorKind::UnsupportedFormat(archive_path.to_string()))?;
        let reader = open_reader(archive_path, compression)?;
        let mut archive = tar::Archive::new(reader);
        let entries = archive
            .entries()
            .map_err(|e| ErrorKind::CorruptArchive(format!("{archive_path}: {e}")))?;
        for entry in entries {
            let mut entry = entry.map_err(|e| ErrorKind::CorruptArchive(format!("{e}")))?;
            let path = match entry.path() {
                Ok(p) => p.to_string_lossy().replace('\\', "/"),
                Err(_) => continue,
            };
            if path.trim_end_matches('/') == name_in_arc {
                let mut buf = Vec::with_capacity(entry.size() as usize);
                entry
                    .read_to_end(&mut buf)
                    .map_err(|e| ErrorKind::io(archive_path, e))?;
                return Ok(Bytes::from(buf));
            }
        }
        Err(ErrorKind::NotFound(format!("{archive_path}:/{name_in_arc}")))
    }

    fn name(&self) -> &'static str {
        "tar"
    }
}
