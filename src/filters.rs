use crate::utils;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// The user-editable lists of a [`FilterConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Extensions,
    ExcludedDirs,
    ExcludedFiles,
}

impl FilterField {
    pub fn label(self) -> &'static str {
        match self {
            FilterField::Extensions => "Extensions, e.g. py,.txt",
            FilterField::ExcludedDirs => "Excluded directory names",
            FilterField::ExcludedFiles => "Excluded file names",
        }
    }
}

/// User-provided visibility rules. Re-read on every scan, never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    /// Lowercase extensions with their leading dot. Empty means "no filter".
    pub extensions: HashSet<String>,
    pub excluded_dirs: HashSet<String>,
    pub excluded_files: HashSet<String>,
    /// Also exclude whatever the root `.gitignore` matches.
    pub use_gitignore: bool,
}

impl FilterConfig {
    pub fn new(extensions: &[String], excluded_dirs: &[String], excluded_files: &[String]) -> Self {
        let mut config = FilterConfig {
            extensions: HashSet::new(),
            excluded_dirs: excluded_dirs.iter().map(|s| s.trim().to_string()).collect(),
            excluded_files: excluded_files.iter().map(|s| s.trim().to_string()).collect(),
            use_gitignore: false,
        };
        config.set_extensions(extensions);
        config
    }

    pub fn with_gitignore(mut self, use_gitignore: bool) -> Self {
        self.use_gitignore = use_gitignore;
        self
    }

    /// Replaces the extension filter; `py`, `.py` and ` .PY ` all mean `.py`.
    pub fn set_extensions(&mut self, raw: &[String]) {
        self.extensions = raw.iter().filter_map(|e| normalize_extension(e)).collect();
    }

    /// The extension filter rendered back as editable text.
    pub fn extensions_text(&self) -> String {
        sorted_join(&self.extensions)
    }

    pub fn set_extensions_text(&mut self, raw: &str) {
        self.set_extensions(&utils::split_list(raw));
    }

    /// One list rendered as comma-separated text, sorted so edits start from a stable order.
    pub fn field_text(&self, field: FilterField) -> String {
        match field {
            FilterField::Extensions => self.extensions_text(),
            FilterField::ExcludedDirs => sorted_join(&self.excluded_dirs),
            FilterField::ExcludedFiles => sorted_join(&self.excluded_files),
        }
    }

    pub fn set_field_text(&mut self, field: FilterField, raw: &str) {
        match field {
            FilterField::Extensions => self.set_extensions_text(raw),
            FilterField::ExcludedDirs => {
                self.excluded_dirs = utils::split_list(raw).into_iter().collect()
            }
            FilterField::ExcludedFiles => {
                self.excluded_files = utils::split_list(raw).into_iter().collect()
            }
        }
    }

    pub fn has_extension_filter(&self) -> bool {
        !self.extensions.is_empty()
    }

    /// True when `file_name` passes the extension filter (always true without one).
    pub fn matches_extension(&self, file_name: &str) -> bool {
        if !self.has_extension_filter() {
            return true;
        }
        match Path::new(file_name).extension() {
            Some(ext) => {
                let ext = format!(".{}", ext.to_string_lossy().to_lowercase());
                self.extensions.contains(&ext)
            }
            None => false,
        }
    }
}

fn sorted_join(items: &HashSet<String>) -> String {
    let mut items: Vec<&str> = items.iter().map(String::as_str).collect();
    items.sort_unstable();
    items.join(",")
}

fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().to_lowercase();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    if trimmed.starts_with('.') {
        Some(trimmed)
    } else {
        Some(format!(".{}", trimmed))
    }
}

/// Applies a [`FilterConfig`] below one root for the duration of one scan or poll.
pub struct Evaluator<'a> {
    config: &'a FilterConfig,
    root: PathBuf,
    gitignore: Option<Gitignore>,
}

impl<'a> Evaluator<'a> {
    pub fn new(config: &'a FilterConfig, root: &Path) -> Self {
        let gitignore = if config.use_gitignore {
            load_gitignore(root)
        } else {
            None
        };
        Evaluator {
            config,
            root: root.to_path_buf(),
            gitignore,
        }
    }

    /// Name-based exclusion (plus gitignore, when enabled). The root is never excluded.
    pub fn is_excluded(&self, path: &Path, name: &str, is_dir: bool) -> bool {
        if path == self.root {
            return false;
        }
        let by_name = if is_dir {
            self.config.excluded_dirs.contains(name)
        } else {
            self.config.excluded_files.contains(name)
        };
        if by_name {
            return true;
        }
        match &self.gitignore {
            Some(gi) => gi.matched(path, is_dir).is_ignore(),
            None => false,
        }
    }

    /// Decides whether an entry appears in the scanned tree.
    pub fn should_include(&self, path: &Path, name: &str, is_dir: bool) -> bool {
        if self.is_excluded(path, name, is_dir) {
            return false;
        }
        if !self.config.has_extension_filter() {
            return true;
        }
        if is_dir {
            self.contains_match(path)
        } else {
            self.config.matches_extension(name)
        }
    }

    /// Depth-first probe: does any non-excluded file below `dir` pass the extension filter?
    ///
    /// Stops at the first hit. Unreadable subdirectories count as empty.
    pub fn contains_match(&self, dir: &Path) -> bool {
        WalkDir::new(dir)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| !self.excludes_entry(entry))
            .filter_map(|result| match result {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("skipping unreadable entry while probing {}: {}", dir.display(), e);
                    None
                }
            })
            .any(|entry| !entry_is_dir(&entry) && self.config.matches_extension(&entry_name(&entry)))
    }

    /// Walk predicate for `filter_entry`: exclusion rules only, no extension filter.
    pub fn excludes_entry(&self, entry: &DirEntry) -> bool {
        self.is_excluded(entry.path(), &entry_name(entry), entry_is_dir(entry))
    }

    /// Walk predicate for `filter_entry`: full visibility rules.
    pub fn admits_entry(&self, entry: &DirEntry) -> bool {
        self.should_include(entry.path(), &entry_name(entry), entry_is_dir(entry))
    }
}

/// Symlinks are not followed, so a link to a directory reports as a non-directory.
pub fn entry_is_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
}

pub fn entry_name(entry: &DirEntry) -> String {
    entry.file_name().to_string_lossy().into_owned()
}

fn load_gitignore(root: &Path) -> Option<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    let path = root.join(".gitignore");
    if path.is_file() {
        if let Some(e) = builder.add(&path) {
            warn!("partially invalid {}: {}", path.display(), e);
        }
    }
    match builder.build() {
        Ok(gi) => Some(gi),
        Err(e) => {
            warn!("ignoring {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn extensions_are_normalized() {
        let config = FilterConfig::new(&strings(&["py", " .TXT ", "", "."]), &[], &[]);
        assert_eq!(config.extensions.len(), 2);
        assert!(config.matches_extension("main.py"));
        assert!(config.matches_extension("NOTES.Txt"));
        assert!(!config.matches_extension("Makefile"));
        assert!(!config.matches_extension(".py"));
        assert_eq!(config.extensions_text(), ".py,.txt");
    }

    #[test]
    fn exclusion_lists_edit_as_text() {
        let mut config = FilterConfig::new(&[], &strings(&["target", ".git"]), &[]);
        assert_eq!(config.field_text(FilterField::ExcludedDirs), ".git,target");

        config.set_field_text(FilterField::ExcludedDirs, " build , ,dist");
        assert_eq!(config.excluded_dirs, strings(&["build", "dist"]).into_iter().collect());
        config.set_field_text(FilterField::ExcludedFiles, "LICENSE");
        assert!(config.excluded_files.contains("LICENSE"));
        config.set_field_text(FilterField::Extensions, "PY");
        assert_eq!(config.field_text(FilterField::Extensions), ".py");
    }

    #[test]
    fn no_filter_includes_everything_not_excluded() {
        let tmp = TempDir::new().unwrap();
        let config = FilterConfig::new(&[], &strings(&["target"]), &strings(&["LICENSE"]));
        let eval = Evaluator::new(&config, tmp.path());
        let root = tmp.path();
        assert!(eval.should_include(&root.join("a.rs"), "a.rs", false));
        assert!(eval.should_include(&root.join("src"), "src", true));
        assert!(!eval.should_include(&root.join("target"), "target", true));
        assert!(!eval.should_include(&root.join("LICENSE"), "LICENSE", false));
        // Exclusion is by bare name, the kind matters.
        assert!(eval.should_include(&root.join("target"), "target", false));
    }

    #[test]
    fn root_is_never_excluded() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("target");
        fs::create_dir(&root).unwrap();
        let config = FilterConfig::new(&[], &strings(&["target"]), &[]);
        let eval = Evaluator::new(&config, &root);
        assert!(!eval.is_excluded(&root, "target", true));
        assert!(eval.is_excluded(&root.join("target"), "target", true));
    }

    #[test]
    fn directory_probe_respects_exclusions_at_every_level() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root, "a/deep/er/x.txt");
        touch(root, "b/node_modules/y.txt");
        touch(root, "c/skip.txt");
        touch(root, "c/z.md");

        let config = FilterConfig::new(
            &strings(&[".txt"]),
            &strings(&["node_modules"]),
            &strings(&["skip.txt"]),
        );
        let eval = Evaluator::new(&config, root);
        assert!(eval.contains_match(&root.join("a")));
        assert!(!eval.contains_match(&root.join("b")));
        assert!(!eval.contains_match(&root.join("c")));
        assert!(eval.should_include(&root.join("a"), "a", true));
        assert!(!eval.should_include(&root.join("b"), "b", true));
    }

    #[test]
    fn gitignore_patterns_exclude_when_enabled() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::write(root.join(".gitignore"), "*.log\nbuild/\n").unwrap();
        touch(root, "build/out.txt");
        touch(root, "run.log");

        let plain = FilterConfig::new(&[], &[], &[]);
        let eval = Evaluator::new(&plain, root);
        assert!(eval.should_include(&root.join("run.log"), "run.log", false));

        let with_gi = plain.clone().with_gitignore(true);
        let eval = Evaluator::new(&with_gi, root);
        assert!(!eval.should_include(&root.join("run.log"), "run.log", false));
        assert!(!eval.should_include(&root.join("build"), "build", true));
        assert!(eval.should_include(&root.join(".gitignore"), ".gitignore", false));
    }
}
