//! Canonical path handling (spec component C1).
//!
//! Every path that crosses an API boundary in this workspace — a root passed
//! to `open()`, a `rel_path` key in the entry cache, a `jump()` target — goes
//! through [`normalize_rel`] first. The forms are:
//!
//! - a `rel_path`: forward-slash, no leading slash, `""` for the root itself
//! - a display root: an absolute host path or archive path, drive letters
//!   preserved verbatim
//! - a `root:/internal` display string, split by [`split_root_internal`]

use types::{ErrorKind, Result};

/// Normalizes a `rel_path`-style internal navigation target.
///
/// Backslashes become slashes, repeated slashes collapse, `.` segments are
/// dropped, and `..` segments pop the previous component — but a `..` that
/// would climb above the root fails with [`ErrorKind::InvalidPath`] rather
/// than silently clamping. The result never has a leading or trailing slash
/// (the empty string denotes the root).
pub fn normalize_rel(path: &str) -> Result<String> {
    if path.contains('\0') {
        return Err(ErrorKind::InvalidPath(
            "path contains an embedded NUL byte".to_string(),
        ));
    }

    let slashed = path.replace('\\', "/");
    let stripped = slashed.strip_prefix('/').unwrap_or(&slashed);

    let mut stack: Vec<&str> = Vec::new();
    for segment in stripped.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                if stack.pop().is_none() {
                    return Err(ErrorKind::InvalidPath(format!(
                        "path escapes the root: {path}"
                    )));
                }
            }
            other => stack.push(other),
        }
    }

    Ok(stack.join("/"))
}

/// Normalizes a display-level absolute host path: separators are canonicalized
/// and `.`/`..` are resolved the same way as [`normalize_rel`], but a leading
/// drive letter (`C:`) or root slash is preserved instead of stripped.
pub fn normalize_display(path: &str) -> Result<String> {
    if path.contains('\0') {
        return Err(ErrorKind::InvalidPath(
            "path contains an embedded NUL byte".to_string(),
        ));
    }

    let slashed = path.replace('\\', "/");

    let (prefix, rest) = match slashed.split_once(':') {
        Some((drive, rest)) if drive.len() == 1 && drive.chars().all(|c| c.is_ascii_alphabetic()) => {
            (format!("{drive}:/"), rest.strip_prefix('/').unwrap_or(rest))
        }
        _ => {
            if let Some(rest) = slashed.strip_prefix('/') {
                ("/".to_string(), rest)
            } else {
                (String::new(), slashed.as_str())
            }
        }
    };

    let mut stack: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                if stack.pop().is_none() {
                    return Err(ErrorKind::InvalidPath(format!(
                        "path escapes the filesystem root: {path}"
                    )));
                }
            }
            other => stack.push(other),
        }
    }

    Ok(format!("{prefix}{}", stack.join("/")))
}

/// Splits a display-level `root:/internal` string into its two parts.
///
/// Only the first `:/` is treated as the separator, so Windows drive letters
/// (`C:/foo`) are not mistaken for the archive-root syntax: a lone drive
/// letter before `:/` is never split.
pub fn split_root_internal(path: &str) -> (String, String) {
    if let Some(idx) = path.find(":/") {
        let (root, rest) = path.split_at(idx);
        let internal = &rest[2..];
        if root.len() == 1 && root.chars().all(|c| c.is_ascii_alphabetic()) {
            return (path.to_string(), String::new());
        }
        return (root.to_string(), internal.to_string());
    }
    (path.to_string(), String::new())
}

/// Joins a parent `rel_path` and a child name into a child `rel_path`.
pub fn join_rel(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}/{child}")
    }
}

/// Returns the parent `rel_path` of `rel_path`, or `None` if it is the root.
pub fn parent_of(rel_path: &str) -> Option<&str> {
    if rel_path.is_empty() {
        return None;
    }
    match rel_path.rfind('/') {
        Some(idx) => Some(&rel_path[..idx]),
        None => Some(""),
    }
}

/// Leaf name of a `rel_path` (the part after the last `/`).
pub fn leaf_name(rel_path: &str) -> &str {
    match rel_path.rfind('/') {
        Some(idx) => &rel_path[idx + 1..],
        None => rel_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_backslashes_and_dots() {
        assert_eq!(normalize_rel("a\\b/./c").unwrap(), "a/b/c");
    }

    #[test]
    fn collapses_repeated_slashes() {
        assert_eq!(normalize_rel("a//b///c").unwrap(), "a/b/c");
    }

    #[test]
    fn resolves_dotdot_within_root() {
        assert_eq!(normalize_rel("a/b/../c").unwrap(), "a/c");
    }

    #[test]
    fn rejects_dotdot_above_root() {
        assert!(matches!(
            normalize_rel("../escape"),
            Err(ErrorKind::InvalidPath(_))
        ));
    }

    #[test]
    fn rejects_embedded_nul() {
        assert!(matches!(
            normalize_rel("a\0b"),
            Err(ErrorKind::InvalidPath(_))
        ));
    }

    #[test]
    fn empty_root_normalizes_to_empty_string() {
        assert_eq!(normalize_rel("").unwrap(), "");
        assert_eq!(normalize_rel("/").unwrap(), "");
    }

    #[test]
    fn splits_root_and_internal() {
        assert_eq!(
            split_root_internal("archive.zip:/inner/pic.png"),
            ("archive.zip".to_string(), "inner/pic.png".to_string())
        );
        assert_eq!(
            split_root_internal("plain/path"),
            ("plain/path".to_string(), String::new())
        );
    }

    #[test]
    fn drive_letter_not_mistaken_for_archive_syntax() {
        assert_eq!(
            split_root_internal("C:/Users/pic.png"),
            ("C:/Users/pic.png".to_string(), String::new())
        );
    }

    #[test]
    fn display_normalize_preserves_drive_letter() {
        assert_eq!(normalize_display("C:\\a\\..\\b").unwrap(), "C:/b");
    }

    #[test]
    fn join_and_parent_roundtrip() {
        let joined = join_rel("a/b", "c.png");
        assert_eq!(joined, "a/b/c.png");
        assert_eq!(parent_of(&joined), Some("a/b"));
        assert_eq!(leaf_name(&joined), "c.png");
    }
}
