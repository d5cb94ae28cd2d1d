use std::path::{Component, Path};

/// Rough estimate: GPT-style token ≈ 4 chars (good enough for UI)
pub fn approx_tokens(s: &str) -> usize {
    s.chars().count() / 4
}

/// `path` relative to `root`, always joined with `/`.
///
/// Returns an empty string for the root itself and `None` for paths outside it.
pub fn relative_unix(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Splits a comma-separated list, trimming entries and dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = PathBuf::from("/tmp/proj");
        let nested = root.join("src").join("main.py");
        assert_eq!(relative_unix(&nested, &root).as_deref(), Some("src/main.py"));
        assert_eq!(relative_unix(&root, &root).as_deref(), Some(""));
        assert_eq!(relative_unix(Path::new("/elsewhere"), &root), None);
    }

    #[test]
    fn split_list_drops_blank_entries() {
        assert_eq!(split_list(" .py, ,.txt ,"), vec![".py", ".txt"]);
        assert!(split_list("   ").is_empty());
    }
}
