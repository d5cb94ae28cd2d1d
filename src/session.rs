use crate::error::StitchResult;
use crate::file_scanner::{self, Node, PathIndex, ScanResult};
use crate::filters::FilterConfig;
use crate::hierarchy;
use crate::output::{self, OutputMode};
use crate::poller::{self, PollOutcome, Poller, Snapshot};
use crate::selection::SelectionStore;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Everything known about one selected root.
///
/// Built when a root is chosen and dropped when another one is; the tree is
/// replaced on every refresh while selections, fold state and recorded
/// modification times carry over.
pub struct Session {
    root: PathBuf,
    filters: FilterConfig,
    store: SelectionStore,
    scan: ScanResult,
    snapshot: Snapshot,
    last_refresh: Instant,
    last_output: Option<Instant>,
}

impl Session {
    pub fn open(root: &Path, filters: FilterConfig) -> StitchResult<Self> {
        let scan = file_scanner::scan(root, &filters)?;
        let snapshot = take_snapshot(root, &filters);
        info!("opened {} ({} entries)", root.display(), scan.index.len());
        Ok(Session {
            root: root.to_path_buf(),
            store: SelectionStore::new(root),
            filters,
            scan,
            snapshot,
            last_refresh: Instant::now(),
            last_output: None,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn filters(&self) -> &FilterConfig {
        &self.filters
    }

    pub fn tree(&self) -> &Node {
        &self.scan.root
    }

    pub fn index(&self) -> &PathIndex {
        &self.scan.index
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn last_refresh(&self) -> Instant {
        self.last_refresh
    }

    pub fn last_output(&self) -> Option<Instant> {
        self.last_output
    }

    /// Rescans the root. On failure the previous tree stays in place.
    pub fn refresh(&mut self) -> StitchResult<()> {
        let scan = file_scanner::scan(&self.root, &self.filters)?;
        self.scan = scan;
        self.snapshot = take_snapshot(&self.root, &self.filters);
        self.last_refresh = Instant::now();
        Ok(())
    }

    /// Swaps the visibility rules and rescans.
    pub fn set_filters(&mut self, filters: FilterConfig) -> StitchResult<()> {
        let previous = std::mem::replace(&mut self.filters, filters);
        if let Err(e) = self.refresh() {
            self.filters = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn effective_state(&self, path: &Path) -> bool {
        self.store.effective_state(path)
    }

    /// Toggles a node of the current tree. Paths not in the tree are ignored (`None`).
    pub fn toggle(&mut self, path: &Path) -> Option<bool> {
        let kind = self.scan.index.get(path)?;
        let state = self.store.toggle(path, kind);
        debug!("toggled {} -> {}", path.display(), state);
        Some(state)
    }

    pub fn clear_selections(&mut self) {
        self.store.clear_selections();
    }

    pub fn toggle_expanded(&mut self, dir: &Path) -> bool {
        self.store.toggle_expanded(dir)
    }

    pub fn set_expanded(&mut self, dir: &Path, expanded: bool) {
        self.store.set_expanded(dir, expanded);
    }

    /// Replaces the selection with the files named in hierarchy text.
    ///
    /// The text is parsed and the tree rescanned before any state changes, so a
    /// failure leaves the previous selection intact. Returns how many files were selected.
    pub fn import_selection(&mut self, text: &str) -> StitchResult<usize> {
        let listed = hierarchy::decode(text)?;
        self.refresh()?;
        let files = self.existing_files(listed.iter());
        let selected = self.store.import_paths(&files, &self.scan.index);
        info!(
            "imported selection: {} of {} listed paths are files",
            selected,
            listed.len()
        );
        Ok(selected)
    }

    /// Relative paths named in hierarchy text that are files of the current tree.
    pub fn decode_selection_text(&self, text: &str) -> StitchResult<BTreeSet<String>> {
        let listed = hierarchy::decode(text)?;
        Ok(self.existing_files(listed.iter()))
    }

    fn existing_files<'s>(&self, rel_paths: impl Iterator<Item = &'s String>) -> BTreeSet<String> {
        rel_paths
            .filter(|rel| self.scan.index.is_file(&self.root.join(rel.as_str())))
            .cloned()
            .collect()
    }

    /// Selected files (or directories, in [`OutputMode::DirectoriesOnly`]) in tree order.
    pub fn selected_paths(&self, mode: OutputMode) -> Vec<PathBuf> {
        let want_dirs = mode == OutputMode::DirectoriesOnly;
        self.scan
            .preorder()
            .into_iter()
            .filter(|node| node.is_dir == want_dirs && self.store.effective_state(&node.path))
            .map(|node| node.path.clone())
            .collect()
    }

    /// Renders the artifact and remembers the selected files' modification times.
    pub fn generate_output(&mut self, mode: OutputMode) -> String {
        let selected = self.selected_paths(mode);
        if mode != OutputMode::DirectoriesOnly {
            for path in &selected {
                self.store.record_mod_time(path, poller::modified_time(path));
            }
        }
        self.last_output = Some(Instant::now());
        output::render_output(&self.root, &selected, mode)
    }

    /// One change-detection pass; filesystem errors count as "no change".
    pub fn poll_once(&mut self) -> PollOutcome {
        let fresh = match Snapshot::take(&self.root, &self.filters) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!("poll skipped, root unavailable: {}", e);
                return PollOutcome::Unchanged;
            }
        };

        if fresh != self.snapshot {
            return match file_scanner::scan(&self.root, &self.filters) {
                Ok(scan) => {
                    info!(
                        "paths changed under {} ({} -> {} entries)",
                        self.root.display(),
                        self.snapshot.len(),
                        fresh.len()
                    );
                    self.scan = scan;
                    self.snapshot = fresh;
                    self.last_refresh = Instant::now();
                    PollOutcome::PathsChanged
                }
                Err(e) => {
                    debug!("poll rescan failed: {}", e);
                    PollOutcome::Unchanged
                }
            };
        }

        let stale = self
            .selected_paths(OutputMode::Full)
            .iter()
            .find(|path| poller::modified_time(path) != self.store.last_mod_time(path))
            .cloned();
        match stale {
            Some(path) => {
                debug!("content changed: {}", path.display());
                PollOutcome::ContentChanged
            }
            None => PollOutcome::Unchanged,
        }
    }
}

impl Poller for Session {
    fn tick(&mut self) -> PollOutcome {
        self.poll_once()
    }
}

fn take_snapshot(root: &Path, filters: &FilterConfig) -> Snapshot {
    Snapshot::take(root, filters).unwrap_or_else(|e| {
        debug!("snapshot of {} failed: {}", root.display(), e);
        Snapshot::default()
    })
}
