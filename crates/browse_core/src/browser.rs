//! Total-ordered image browser and page cursor (spec component C6).

use types::{EntryInfo, ErrorKind, Result};

/// Immutable total ordering of all image-typed entries reachable from the
/// current root, plus a navigable cursor over it.
///
/// Invariant maintained by every mutator: `index` always equals the start of
/// its own display group — `group_bounds(index).0 == index`.
pub struct Browser {
    entries: Vec<String>,
    index: usize,
    pages: u8,
    shift: bool,
    rtl: bool,
}

impl Browser {
    /// `images` must already be sorted the way §4.6 requires (folder path,
    /// then natural filename order) — `EntryCache::image_entries_sorted`
    /// does that.
    pub fn new(images: &[EntryInfo], pages: u8, shift: bool, rtl: bool) -> Self {
        Self {
            entries: images.iter().map(|e| e.rel_path.clone()).collect(),
            index: 0,
            pages: pages.clamp(1, 2),
            shift,
            rtl,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_pages(&mut self, pages: u8) {
        self.pages = pages.clamp(1, 2);
        self.realign();
    }

    pub fn toggle_pages(&mut self) {
        self.set_pages(if self.pages == 1 { 2 } else { 1 });
    }

    pub fn set_shift(&mut self, shift: bool) {
        self.shift = shift;
        self.realign();
    }

    pub fn toggle_shift(&mut self) {
        self.set_shift(!self.shift);
    }

    pub fn set_rtl(&mut self, rtl: bool) {
        self.rtl = rtl;
    }

    fn realign(&mut self) {
        if !self.entries.is_empty() {
            self.index = self.group_bounds(self.index).0;
        }
    }

    /// `(start, end)` of the display group containing `index` — in single
    /// mode always `(index, index)`; in dual mode a pair, with `shift`
    /// leaving page 0 solo per §4.6.
    fn group_bounds(&self, index: usize) -> (usize, usize) {
        if self.pages != 2 || self.entries.is_empty() {
            return (index, index);
        }
        let last = self.entries.len() - 1;
        let start = if self.shift {
            if index == 0 {
                0
            } else {
                1 + ((index - 1) / 2) * 2
            }
        } else {
            (index / 2) * 2
        };
        let end = (start + 1).min(last);
        let end = if self.shift && start == 0 { start } else { end };
        (start, end)
    }

    fn current_folder(&self) -> Option<&str> {
        self.entries
            .get(self.index)
            .map(|p| paths::parent_of(p).unwrap_or(""))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Vec<String> {
        if !self.entries.is_empty() {
            let (_, end) = self.group_bounds(self.index);
            let candidate = end + 1;
            if candidate < self.entries.len() {
                self.index = self.group_bounds(candidate).0;
            }
        }
        self.get_current()
    }

    pub fn prev(&mut self) -> Vec<String> {
        if self.index > 0 {
            let (start, _) = self.group_bounds(self.index - 1);
            self.index = start;
        }
        self.get_current()
    }

    pub fn next_folder(&mut self) -> Vec<String> {
        if let Some(folder) = self.current_folder().map(|s| s.to_string()) {
            for i in (self.index + 1)..self.entries.len() {
                if paths::parent_of(&self.entries[i]).unwrap_or("") != folder {
                    self.index = self.group_bounds(i).0;
                    break;
                }
            }
        }
        self.get_current()
    }

    /// Lands on the *start* of the previous folder, not merely its last
    /// entry: scanning backward, the first entry with a different parent is
    /// that folder's tail, so walk further back to its first entry.
    pub fn prev_folder(&mut self) -> Vec<String> {
        if let Some(folder) = self.current_folder().map(|s| s.to_string()) {
            for i in (0..self.index).rev() {
                let candidate_folder = paths::parent_of(&self.entries[i]).unwrap_or("");
                if candidate_folder != folder {
                    let candidate_folder = candidate_folder.to_string();
                    let mut start = i;
                    while start > 0
                        && paths::parent_of(&self.entries[start - 1]).unwrap_or("") == candidate_folder
                    {
                        start -= 1;
                    }
                    self.index = self.group_bounds(start).0;
                    break;
                }
            }
        }
        self.get_current()
    }

    pub fn go_first(&mut self) -> Vec<String> {
        self.index = 0;
        self.get_current()
    }

    pub fn go_last(&mut self) -> Vec<String> {
        if !self.entries.is_empty() {
            self.index = self.group_bounds(self.entries.len() - 1).0;
        }
        self.get_current()
    }

    pub fn go_top(&mut self) -> Vec<String> {
        if let Some(folder) = self.current_folder().map(|s| s.to_string()) {
            if let Some(i) = self
                .entries
                .iter()
                .position(|p| paths::parent_of(p).unwrap_or("") == folder)
            {
                self.index = self.group_bounds(i).0;
            }
        }
        self.get_current()
    }

    pub fn go_end(&mut self) -> Vec<String> {
        if let Some(folder) = self.current_folder().map(|s| s.to_string()) {
            if let Some(i) = self
                .entries
                .iter()
                .rposition(|p| paths::parent_of(p).unwrap_or("") == folder)
            {
                self.index = self.group_bounds(i).0;
            }
        }
        self.get_current()
    }

    /// Locates `rel_path` and moves the cursor to it. `rel_path` is routed
    /// through [`paths::normalize_rel`] first (§4.1) so callers passing a
    /// display-ish target — backslashes, a `./` segment, doubled slashes —
    /// still resolve instead of failing `NotFound` on a literal mismatch.
    pub fn jump(&mut self, rel_path: &str) -> Result<Vec<String>> {
        let normalized = paths::normalize_rel(rel_path)?;
        let i = self
            .entries
            .iter()
            .position(|p| *p == normalized)
            .ok_or(ErrorKind::NotFound(normalized))?;
        self.index = self.group_bounds(i).0;
        Ok(self.get_current())
    }

    pub fn get_current(&self) -> Vec<String> {
        if self.entries.is_empty() {
            return Vec::new();
        }
        let (start, end) = self.group_bounds(self.index);
        let mut out = vec![self.entries[start].clone()];
        if end > start {
            out.push(self.entries[end].clone());
        }
        if self.rtl {
            out.reverse();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use types::EntryType;

    fn image(rel_path: &str) -> EntryInfo {
        EntryInfo {
            name: paths::leaf_name(rel_path).to_string(),
            rel_path: rel_path.to_string(),
            abs_path: rel_path.to_string(),
            entry_type: EntryType::File,
            size: 10,
            modified_time: Some(Utc::now()),
            name_in_arc: rel_path.to_string(),
        }
    }

    #[test]
    fn folder_boundary_navigation() {
        let images = ["a/1.png", "a/2.png", "b/1.png", "b/2.png"].map(image);
        let mut browser = Browser::new(&images, 1, false, false);
        browser.jump("a/2.png").unwrap();
        assert_eq!(browser.next_folder(), vec!["b/1.png"]);
        assert_eq!(browser.prev_folder(), vec!["a/1.png"]);
    }

    #[test]
    fn dual_mode_with_shift_matches_scenario() {
        let images = ["p0", "p1", "p2", "p3", "p4"].map(image);
        let mut browser = Browser::new(&images, 2, true, false);
        assert_eq!(browser.get_current(), vec!["p0"]);
        assert_eq!(browser.next(), vec!["p1", "p2"]);
        assert_eq!(browser.next(), vec!["p3", "p4"]);
    }

    #[test]
    fn next_then_prev_returns_to_start() {
        let images = ["a.png", "b.png", "c.png"].map(image);
        let mut browser = Browser::new(&images, 1, false, false);
        browser.next();
        assert_eq!(browser.prev(), vec!["a.png"]);
    }

    #[test]
    fn rtl_only_reverses_the_returned_order() {
        let images = ["p0", "p1"].map(image);
        let mut ltr = Browser::new(&images, 2, false, false);
        let mut rtl = Browser::new(&images, 2, false, true);
        assert_eq!(ltr.get_current(), vec!["p0", "p1"]);
        assert_eq!(rtl.get_current(), vec!["p1", "p0"]);
        // only one full pair exists, so next() clamps both cursors to the
        // same underlying index; rtl only flips the returned order.
        assert_eq!(ltr.next(), vec!["p0", "p1"]);
        assert_eq!(rtl.next(), vec!["p1", "p0"]);
        assert_eq!(ltr.index(), rtl.index());
    }

    #[test]
    fn jump_to_missing_path_errors() {
        let images = ["a.png"].map(image);
        let mut browser = Browser::new(&images, 1, false, false);
        assert!(matches!(browser.jump("missing.png"), Err(ErrorKind::NotFound(_))));
    }

    #[test]
    fn jump_normalizes_its_target_before_lookup() {
        let images = ["a/b.png"].map(image);
        let mut browser = Browser::new(&images, 1, false, false);
        // Backslashes, a `./` segment, and a doubled slash all resolve to
        // the same cached key (§4.1), not a `NotFound`.
        assert_eq!(browser.jump("a\\b.png").unwrap(), vec!["a/b.png"]);
        assert_eq!(browser.jump("./a//b.png").unwrap(), vec!["a/b.png"]);
    }
}
