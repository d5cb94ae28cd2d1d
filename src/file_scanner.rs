use crate::error::{StitchError, StitchResult};
use crate::filters::{Evaluator, FilterConfig, entry_is_dir, entry_name};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// One entry of a scanned tree. Rebuilt on every scan, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    pub children: Vec<Node>,
}

impl Node {
    fn new(path: PathBuf, name: String, is_dir: bool) -> Self {
        Node {
            path,
            name,
            is_dir,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
}

/// Absolute path -> kind for every node of a scan, so lookups skip the tree walk.
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    entries: HashMap<PathBuf, EntryKind>,
}

impl PathIndex {
    fn insert(&mut self, path: PathBuf, kind: EntryKind) {
        self.entries.insert(path, kind);
    }

    pub fn get(&self, path: &Path) -> Option<EntryKind> {
        self.entries.get(path).copied()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn is_file(&self, path: &Path) -> bool {
        self.get(path) == Some(EntryKind::File)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, EntryKind)> {
        self.entries.iter().map(|(p, k)| (p, *k))
    }
}

#[derive(Debug, Clone)]
pub struct ScanResult {
    pub root: Node,
    pub index: PathIndex,
}

impl ScanResult {
    /// All nodes in pre-order, root first.
    pub fn preorder(&self) -> Vec<&Node> {
        fn visit<'n>(node: &'n Node, out: &mut Vec<&'n Node>) {
            out.push(node);
            for child in &node.children {
                visit(child, out);
            }
        }
        let mut out = Vec::with_capacity(self.index.len());
        visit(&self.root, &mut out);
        out
    }
}

/// Display name for a root: its last component, or the whole path for `/`.
pub fn root_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}

/// Scans `root` top-down in file-name order, keeping only what `filters` admits.
///
/// Fails only when the root itself cannot be listed; unreadable subdirectories
/// show up without children.
pub fn scan(root: &Path, filters: &FilterConfig) -> StitchResult<ScanResult> {
    let metadata = fs::metadata(root).map_err(|source| StitchError::Access {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(StitchError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    fs::read_dir(root).map_err(|source| StitchError::Access {
        path: root.to_path_buf(),
        source,
    })?;

    let evaluator = Evaluator::new(filters, root);
    let mut index = PathIndex::default();
    index.insert(root.to_path_buf(), EntryKind::Dir);

    let mut root_node = Node::new(root.to_path_buf(), root_name(root), true);
    // open[i] is the directory currently being filled at depth i + 1.
    let mut open: Vec<Node> = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| evaluator.admits_entry(entry));

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                debug!("omitting unreadable subtree: {}", e);
                continue;
            }
        };

        close_until(&mut root_node, &mut open, entry.depth());

        let is_dir = entry_is_dir(&entry);
        let name = entry_name(&entry);
        let path = entry.into_path();
        index.insert(
            path.clone(),
            if is_dir { EntryKind::Dir } else { EntryKind::File },
        );

        let node = Node::new(path, name, is_dir);
        if is_dir {
            open.push(node);
        } else {
            attach(&mut root_node, &mut open, node);
        }
    }
    close_until(&mut root_node, &mut open, 1);

    debug!("scanned {} entries under {}", index.len(), root.display());
    Ok(ScanResult {
        root: root_node,
        index,
    })
}

/// Closes open directories until the parent of an entry at `depth` is on top.
fn close_until(root: &mut Node, open: &mut Vec<Node>, depth: usize) {
    while open.len() >= depth {
        match open.pop() {
            Some(done) => attach(root, open, done),
            None => break,
        }
    }
}

fn attach(root: &mut Node, open: &mut [Node], node: Node) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => root.children.push(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    fn names(node: &Node) -> Vec<&str> {
        node.children.iter().map(|c| c.name.as_str()).collect()
    }

    fn child<'n>(node: &'n Node, name: &str) -> &'n Node {
        node.children.iter().find(|c| c.name == name).unwrap()
    }

    fn filters(exts: &[&str]) -> FilterConfig {
        let exts: Vec<String> = exts.iter().map(|s| s.to_string()).collect();
        FilterConfig::new(&exts, &[], &[])
    }

    #[test]
    fn extension_filter_propagates_to_directories() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root, "a/x.txt");
        touch(root, "a/y.md");
        touch(root, "b/z.txt");

        let txt = scan(root, &filters(&[".txt"])).unwrap();
        assert_eq!(names(&txt.root), vec!["a", "b"]);
        assert_eq!(names(child(&txt.root, "a")), vec!["x.txt"]);
        assert!(!txt.index.contains(&root.join("a/y.md")));

        let md = scan(root, &filters(&[".md"])).unwrap();
        assert_eq!(names(&md.root), vec!["a"]);
        assert_eq!(names(child(&md.root, "a")), vec!["y.md"]);
        assert!(!md.index.contains(&root.join("b")));
    }

    #[test]
    fn entries_come_out_sorted_preorder() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root, "zeta.rs");
        touch(root, "alpha/b.rs");
        touch(root, "alpha/a.rs");
        touch(root, "beta/inner/c.rs");

        let result = scan(root, &FilterConfig::default()).unwrap();
        let order: Vec<String> = result
            .preorder()
            .iter()
            .map(|n| crate::utils::relative_unix(&n.path, root).unwrap())
            .collect();
        assert_eq!(
            order,
            vec![
                "",
                "alpha",
                "alpha/a.rs",
                "alpha/b.rs",
                "beta",
                "beta/inner",
                "beta/inner/c.rs",
                "zeta.rs"
            ]
        );
        assert_eq!(result.index.len(), order.len());
        assert_eq!(result.index.get(&root.join("beta")), Some(EntryKind::Dir));
        assert!(result.index.is_file(&root.join("zeta.rs")));
    }

    #[test]
    fn excluded_names_are_dropped_at_every_level() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root, "src/main.rs");
        touch(root, "src/target/junk.rs");
        touch(root, "target/debug/app");
        touch(root, "LICENSE");
        touch(root, "docs/LICENSE");

        let config = FilterConfig::new(&[], &["target".to_string()], &["LICENSE".to_string()]);
        let result = scan(root, &config).unwrap();
        assert_eq!(names(&result.root), vec!["docs", "src"]);
        assert_eq!(names(child(&result.root, "src")), vec!["main.rs"]);
        assert!(child(&result.root, "docs").children.is_empty());
    }

    #[test]
    fn empty_directories_only_hidden_under_a_filter() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("empty")).unwrap();
        touch(root, "keep.py");

        let plain = scan(root, &FilterConfig::default()).unwrap();
        assert_eq!(names(&plain.root), vec!["empty", "keep.py"]);

        let filtered = scan(root, &filters(&["py"])).unwrap();
        assert_eq!(names(&filtered.root), vec!["keep.py"]);
    }

    #[test]
    fn missing_root_is_an_access_error() {
        let tmp = TempDir::new().unwrap();
        let err = scan(&tmp.path().join("nope"), &FilterConfig::default()).unwrap_err();
        assert!(matches!(err, StitchError::Access { .. }));
    }

    #[test]
    fn file_root_is_rejected() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "file.txt");
        let err = scan(&tmp.path().join("file.txt"), &FilterConfig::default()).unwrap_err();
        assert!(matches!(err, StitchError::NotADirectory { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root, "locked/secret.txt");
        touch(root, "open/visible.txt");
        let locked = root.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Running with permission overrides (e.g. as root); nothing to observe.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = scan(root, &FilterConfig::default());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        let result = result.unwrap();

        assert!(child(&result.root, "locked").children.is_empty());
        assert_eq!(names(child(&result.root, "open")), vec!["visible.txt"]);
    }
}
