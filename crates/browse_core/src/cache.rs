//! Entry cache and finalization (spec component C4).
//!
//! `build` is the whole of §4.4: enumerate the root, promote archive-typed
//! files, recursively materialize and enumerate nested archives, and
//! synthesize any parent directories the underlying format left implicit.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use archive::{ArchiveHandler, HandlerRegistry};
use tracing::warn;
use types::{EntryInfo, EntryType, Result};

use crate::temp_file_manager::TempFileManager;

#[derive(Debug, Default)]
pub struct EntryCache {
    entries: HashMap<String, EntryInfo>,
}

impl EntryCache {
    pub fn get(&self, rel_path: &str) -> Option<&EntryInfo> {
        self.entries.get(rel_path)
    }

    pub fn contains(&self, rel_path: &str) -> bool {
        self.entries.contains_key(rel_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose parent is `rel_dir`, directories first then natural
    /// filename order, matching §4.5 `list_entries`.
    pub fn children_of(&self, rel_dir: &str) -> Vec<&EntryInfo> {
        let mut children: Vec<&EntryInfo> = self
            .entries
            .values()
            .filter(|e| !e.is_root() && e.parent_rel_path() == Some(rel_dir))
            .collect();
        children.sort_by(|a, b| {
            let a_dir = a.entry_type.is_container();
            let b_dir = b.entry_type.is_container();
            b_dir.cmp(&a_dir).then_with(|| natural_cmp(&a.name, &b.name))
        });
        children
    }

    /// Every image-typed entry, sorted by (folder path, then natural
    /// filename order) — the ordering C6's browser is built from.
    pub fn image_entries_sorted(&self) -> Vec<EntryInfo> {
        let mut images: Vec<EntryInfo> = self
            .entries
            .values()
            .filter(|e| e.entry_type == EntryType::File && decoder::is_image_extension(extension_of(&e.rel_path)))
            .cloned()
            .collect();
        images.sort_by(|a, b| {
            let a_parent = a.parent_rel_path().unwrap_or("");
            let b_parent = b.parent_rel_path().unwrap_or("");
            a_parent
                .cmp(b_parent)
                .then_with(|| natural_cmp(&a.name, &b.name))
        });
        images
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntryInfo> {
        self.entries.values()
    }
}

fn extension_of(rel_path: &str) -> &str {
    std::path::Path::new(rel_path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
}

/// Splits a name into alternating digit/non-digit runs so `"2.png"` sorts
/// before `"10.png"`.
fn natural_key(name: &str) -> Vec<(bool, String)> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut in_digits = false;
    for ch in name.chars() {
        let is_digit = ch.is_ascii_digit();
        if current.is_empty() {
            in_digits = is_digit;
        } else if is_digit != in_digits {
            chunks.push((in_digits, std::mem::take(&mut current)));
            in_digits = is_digit;
        }
        current.push(ch);
    }
    if !current.is_empty() {
        chunks.push((in_digits, current));
    }
    chunks
}

fn natural_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    let (ka, kb) = (natural_key(a), natural_key(b));
    for (ca, cb) in ka.iter().zip(kb.iter()) {
        let ord = match (ca.0, cb.0) {
            (true, true) => {
                let (na, nb): (u128, u128) = (
                    ca.1.parse().unwrap_or(0),
                    cb.1.parse().unwrap_or(0),
                );
                na.cmp(&nb).then_with(|| ca.1.cmp(&cb.1))
            }
            _ => ca.1.cmp(&cb.1),
        };
        if ord != std::cmp::Ordering::Equal {
            return ord;
        }
    }
    ka.len().cmp(&kb.len())
}

struct PendingContainer {
    handler: Arc<dyn ArchiveHandler>,
    archive_path: String,
    prefix: String,
}

/// Builds a finalized entry cache for `root`, per §4.4. `nested_temp_paths`
/// is filled in as a side effect so `ArchiveManager::extract_item` can reuse
/// the same materialized temp files (§4.5's caching requirement).
pub fn build(
    root: &str,
    registry: &HandlerRegistry,
    temp_mgr: &TempFileManager,
) -> Result<EntryCache> {
    let root_handler = registry
        .get_handler(root)
        .ok_or_else(|| types::ErrorKind::UnsupportedFormat(root.to_string()))?;

    let mut entries: HashMap<String, EntryInfo> = HashMap::new();

    let root_type = if root_handler.can_archive() && root_handler.name() != "directory" {
        EntryType::Archive
    } else {
        EntryType::Directory
    };
    entries.insert(
        String::new(),
        EntryInfo {
            name: paths::leaf_name(root).to_string(),
            rel_path: String::new(),
            abs_path: root.to_string(),
            entry_type: root_type,
            size: 0,
            modified_time: None,
            name_in_arc: String::new(),
        },
    );

    let mut queue: VecDeque<PendingContainer> = VecDeque::new();
    queue.push_back(PendingContainer {
        handler: root_handler,
        archive_path: root.to_string(),
        prefix: String::new(),
    });

    while let Some(container) = queue.pop_front() {
        let is_root_container = container.prefix.is_empty();
        let raw_entries = match container.handler.list_all_entries(&container.archive_path) {
            Ok(entries) => entries,
            Err(err) if is_root_container => return Err(err),
            Err(err) => {
                warn!(
                    prefix = %container.prefix,
                    error = %err,
                    "nested archive failed to enumerate; leaving as opaque Archive entry"
                );
                continue;
            }
        };

        for raw in raw_entries {
            let child_rel = paths::join_rel(&container.prefix, &raw.rel_path);
            let is_archive =
                raw.entry_type == EntryType::File && registry.is_archive_path(&raw.rel_path);
            let entry_type = if is_archive {
                EntryType::Archive
            } else {
                raw.entry_type
            };

            let entry = EntryInfo {
                name: paths::leaf_name(&child_rel).to_string(),
                rel_path: child_rel.clone(),
                abs_path: format!("{root}:/{child_rel}"),
                entry_type,
                size: raw.size,
                modified_time: raw.modified_time,
                name_in_arc: raw.name_in_arc.clone(),
            };
            entries.insert(child_rel.clone(), entry);

            if is_archive {
                match materialize_nested(
                    &container.handler,
                    &container.archive_path,
                    &raw.name_in_arc,
                    &child_rel,
                    temp_mgr,
                    registry,
                ) {
                    Ok(Some((child_handler, temp_path))) => {
                        queue.push_back(PendingContainer {
                            handler: child_handler,
                            archive_path: temp_path,
                            prefix: child_rel,
                        });
                    }
                    Ok(None) => {
                        warn!(rel_path = %child_rel, "nested archive extension recognized but no handler claimed it");
                    }
                    Err(err) => {
                        warn!(rel_path = %child_rel, error = %err, "failed to materialize nested archive; leaving opaque");
                    }
                }
            }
        }
    }

    synthesize_missing_parents(&mut entries, root);

    Ok(EntryCache { entries })
}

fn materialize_nested(
    parent_handler: &Arc<dyn ArchiveHandler>,
    parent_archive_path: &str,
    name_in_arc: &str,
    child_rel: &str,
    temp_mgr: &TempFileManager,
    registry: &HandlerRegistry,
) -> Result<Option<(Arc<dyn ArchiveHandler>, String)>> {
    if let Some(existing) = temp_mgr.path_for(child_rel) {
        if let Some(handler) = registry.get_handler(&existing) {
            return Ok(Some((handler, existing)));
        }
    }

    let bytes = parent_handler.read_file(parent_archive_path, name_in_arc)?;
    let temp_path = temp_mgr.materialize(child_rel, name_in_arc, &bytes)?;
    Ok(registry.get_handler(&temp_path).map(|h| (h, temp_path)))
}

fn synthesize_missing_parents(entries: &mut HashMap<String, EntryInfo>, root: &str) {
    let mut missing: HashSet<String> = HashSet::new();
    for rel_path in entries.keys().cloned().collect::<Vec<_>>() {
        let mut current = rel_path.as_str();
        while let Some(parent) = paths::parent_of(current) {
            if entries.contains_key(parent) || missing.contains(parent) {
                break;
            }
            missing.insert(parent.to_string());
            current = parent;
        }
    }
    for rel_path in missing {
        entries.insert(
            rel_path.clone(),
            EntryInfo {
                name: paths::leaf_name(&rel_path).to_string(),
                rel_path: rel_path.clone(),
                abs_path: format!("{root}:/{rel_path}"),
                entry_type: EntryType::Directory,
                size: 0,
                modified_time: None,
                name_in_arc: rel_path,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn natural_order_sorts_numeric_suffixes_numerically() {
        let mut names = vec!["10.png", "2.png", "1.png"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["1.png", "2.png", "10.png"]);
    }

    #[test]
    fn nested_zip_resolves_into_flat_cache() {
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

        let registry = archive::default_registry();
        let temp_mgr = TempFileManager::new();
        let cache = build(outer_path.to_str().unwrap(), &registry, &temp_mgr).unwrap();

        assert!(cache.contains(""));
        assert!(cache.contains("inner.zip"));
        assert!(cache.contains("inner.zip/pics"));
        assert!(cache.contains("inner.zip/pics/cat.png"));
        assert_eq!(
            cache.get("inner.zip/pics").unwrap().entry_type,
            EntryType::Directory
        );
        assert_eq!(
            cache.get("inner.zip").unwrap().entry_type,
            EntryType::Archive
        );
    }
}
