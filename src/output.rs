use crate::file_scanner::root_name;
use crate::hierarchy::{self, CONTENTS_HEADER, HIERARCHY_HEADER};
use crate::utils;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const NOTHING_SELECTED: &str = "No items selected.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputMode {
    /// Hierarchy followed by every selected file's contents.
    #[default]
    Full,
    /// Hierarchy of the selected files, no contents.
    HierarchyOnly,
    /// Hierarchy of the selected directories only.
    DirectoriesOnly,
}

impl OutputMode {
    pub fn next(self) -> Self {
        match self {
            OutputMode::Full => OutputMode::HierarchyOnly,
            OutputMode::HierarchyOnly => OutputMode::DirectoriesOnly,
            OutputMode::DirectoriesOnly => OutputMode::Full,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputMode::Full => "full",
            OutputMode::HierarchyOnly => "hierarchy only",
            OutputMode::DirectoriesOnly => "directories only",
        }
    }
}

/// Builds the stitched artifact for `selected` (absolute paths under `root`).
///
/// A file that cannot be read is replaced by a diagnostic line; it never aborts the rest.
pub fn render_output(root: &Path, selected: &[PathBuf], mode: OutputMode) -> String {
    if selected.is_empty() {
        return NOTHING_SELECTED.to_string();
    }

    let mut entries: Vec<(&PathBuf, String)> = selected
        .iter()
        .filter_map(|path| utils::relative_unix(path, root).map(|rel| (path, rel)))
        .collect();
    entries.sort_by(|(_, a), (_, b)| a.cmp(b));

    let mut out = format!("{}\n\n", HIERARCHY_HEADER);
    let rel_paths = entries
        .iter()
        .map(|(_, rel)| rel.as_str())
        .filter(|rel| !rel.is_empty());
    out.push_str(&hierarchy::encode(rel_paths, &root_name(root)));

    if mode != OutputMode::Full {
        return out;
    }

    out.push_str(&format!("\n{}\n\n", CONTENTS_HEADER));
    for (path, rel) in &entries {
        out.push_str(&format!("--- Start of file: {} ---\n", rel));
        out.push_str(&read_contents(path));
        out.push('\n');
        out.push_str(&format!("--- End of file: {} ---\n\n", rel));
    }
    out
}

fn read_contents(path: &Path) -> String {
    match fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!("could not read {}: {}", path.display(), e);
            format!("Error reading file: {}", e)
        }
    }
}
