use crate::file_scanner::{EntryKind, PathIndex};
use crate::utils;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Long-lived per-root state: explicit selections, fold state and the
/// modification times seen at the last output generation.
///
/// Keyed by absolute path, so it survives every rescan of the tree.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    root: PathBuf,
    explicit: HashMap<PathBuf, bool>,
    expanded: HashMap<PathBuf, bool>,
    last_mod_times: HashMap<PathBuf, Option<SystemTime>>,
}

impl SelectionStore {
    pub fn new(root: &Path) -> Self {
        SelectionStore {
            root: root.to_path_buf(),
            explicit: HashMap::new(),
            expanded: HashMap::new(),
            last_mod_times: HashMap::new(),
        }
    }

    pub fn explicit_state(&self, path: &Path) -> Option<bool> {
        self.explicit.get(path).copied()
    }

    pub fn explicit_count(&self) -> usize {
        self.explicit.len()
    }

    /// The path's own explicit state, else the nearest ancestor's (up to the root), else `false`.
    pub fn effective_state(&self, path: &Path) -> bool {
        path.ancestors()
            .take_while(|ancestor| ancestor.starts_with(&self.root))
            .find_map(|ancestor| self.explicit.get(ancestor).copied())
            .unwrap_or(false)
    }

    /// Flips the effective state of `path` and pins it explicitly.
    ///
    /// For a directory every explicit entry underneath is dropped, so the whole
    /// subtree follows the new state. Returns the new state.
    pub fn toggle(&mut self, path: &Path, kind: EntryKind) -> bool {
        let new_state = !self.effective_state(path);
        self.explicit.insert(path.to_path_buf(), new_state);
        if kind == EntryKind::Dir {
            self.explicit
                .retain(|p, _| p.as_path() == path || !p.starts_with(path));
        }
        new_state
    }

    /// Replaces every explicit state with `true` for the indexed files named in `rel_paths`.
    ///
    /// Directories never get an explicit entry. Returns how many files were selected.
    pub fn import_paths(&mut self, rel_paths: &BTreeSet<String>, index: &PathIndex) -> usize {
        self.explicit.clear();
        for (path, kind) in index.iter() {
            if kind != EntryKind::File {
                continue;
            }
            let Some(rel) = utils::relative_unix(path, &self.root) else {
                continue;
            };
            if rel_paths.contains(&rel) {
                self.explicit.insert(path.clone(), true);
            }
        }
        self.explicit.len()
    }

    pub fn clear_selections(&mut self) {
        self.explicit.clear();
    }

    /// Directories start out expanded.
    pub fn is_expanded(&self, dir: &Path) -> bool {
        self.expanded.get(dir).copied().unwrap_or(true)
    }

    pub fn set_expanded(&mut self, dir: &Path, expanded: bool) {
        self.expanded.insert(dir.to_path_buf(), expanded);
    }

    pub fn toggle_expanded(&mut self, dir: &Path) -> bool {
        let expanded = !self.is_expanded(dir);
        self.set_expanded(dir, expanded);
        expanded
    }

    /// `None` covers both "never recorded" and "was unreadable".
    pub fn last_mod_time(&self, path: &Path) -> Option<SystemTime> {
        self.last_mod_times.get(path).copied().flatten()
    }

    pub fn record_mod_time(&mut self, path: &Path, modified: Option<SystemTime>) {
        self.last_mod_times.insert(path.to_path_buf(), modified);
    }
}
