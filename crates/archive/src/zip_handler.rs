use std::fs::File;
use std::io::Read;
use std::path::Path;

use bytes::Bytes;
use chrono::{NaiveDate, TimeZone, Utc};
use types::{EntryInfo, EntryType, ErrorKind, Result};

use crate::encoding::decode_entry_name;

/// zip (deflate/store), including `.cbz` aliases.
pub struct ZipHandler;

impl ZipHandler {
    pub fn new() -> Self {
        Self
    }

    fn open(archive_path: &str) -> Result<zip::ZipArchive<File>> {
        let file = File::open(archive_path).map_err(|e| ErrorKind::io(archive_path, e))?;
        zip::ZipArchive::new(file)
            .map_err(|e| ErrorKind::CorruptArchive(format!("{archive_path}: {e}")))
    }
}

impl Default for ZipHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn zip_modified_time(dt: zip::DateTime) -> Option<chrono::DateTime<Utc>> {
    // Stored verbatim in the archive, no timezone recorded; treated as UTC.
    let date = NaiveDate::from_ymd_opt(dt.year() as i32, dt.month() as u32, dt.day() as u32)?;
    let time = date.and_hms_opt(dt.hour() as u32, dt.minute() as u32, dt.second() as u32)?;
    Some(Utc.from_utc_datetime(&time))
}

impl super::ArchiveHandler for ZipHandler {
    fn can_handle(&self, path: &str) -> bool {
        let lower = path.to_ascii_lowercase();
        lower.ends_with(".zip") || lower.ends_with(".cbz")
    }

    fn list_all_entries(&self, archive_path: &str) -> Result<Vec<EntryInfo>> {
        let mut archive = Self::open(archive_path)?;
        let mut out = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let file = archive
                .by_index(i)
                .map_err(|e| ErrorKind::CorruptArchive(format!("{archive_path}: {e}")))?;
            let raw_name = decode_entry_name(file.name_raw());
            let rel_path = raw_name.replace('\\', "/");
            let rel_path = rel_path.trim_end_matches('/').to_string();
            if rel_path.is_empty() {
                continue;
            }
            let name = paths::leaf_name(&rel_path).to_string();
            let entry_type = if file.is_dir() {
                EntryType::Directory
            } else {
                EntryType::File
            };
            let size = if file.is_dir() { 0 } else { file.size() };
            out.push(EntryInfo {
                name,
                rel_path: rel_path.clone(),
                abs_path: format!("{archive_path}:/{rel_path}"),
                entry_type,
                size,
                modified_time: zip_modified_time(file.last_modified()),
                name_in_arc: rel_path,
            });
        }
        Ok(out)
    }

    fn read_file(&self, archive_path: &str, name_in_arc: &str) -> Result<Bytes> {
        let mut archive = Self::open(archive_path)?;
        // Re-derive the decoded name per index rather than `by_name`: the
        // name we handed back from `list_all_entries` went through our own
        // encoding fallback chain, which does not always agree with the
        // library's own (CP437-by-default) interpretation of the raw bytes.
        let target_index = (0..archive.len()).find(|&i| {
            archive
                .by_index(i)
                .ok()
                .map(|f| {
                    decode_entry_name(f.name_raw())
                        .replace('\\', "/")
                        .trim_end_matches('/')
                        == name_in_arc
                })
                .unwrap_or(false)
        });
        let index = target_index
            .ok_or_else(|| ErrorKind::NotFound(format!("{archive_path}:/{name_in_arc}")))?;
        let mut file = archive
            .by_index(index)
            .map_err(|e| ErrorKind::CorruptArchive(format!("{archive_path}: {e}")))?;
        let mut buf = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut buf)
            .map_err(|e| ErrorKind::io(Path::new(archive_path), e))?;
        Ok(Bytes::from(buf))
    }

    fn name(&self) -> &'static str {
        "zip"
    }
}
