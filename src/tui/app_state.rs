use crate::filters::FilterField;
use std::path::PathBuf;

/// One line of the tree list: a node of the last scan whose ancestors are all expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub path: PathBuf,
    pub name: String,
    pub depth: usize,
    pub is_dir: bool,
    pub is_expanded: bool,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub(super) enum AppMode {
    Normal,
    EditingFilter(FilterField),
}
