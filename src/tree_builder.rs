/// Name-keyed nesting of relative paths, children kept in first-seen order.
///
/// Intermediate directories are created implicitly: inserting `src/main.py`
/// yields a `src` node even if `src` itself was never inserted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PathTree {
    children: Vec<(String, PathTree)>,
}

impl PathTree {
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = PathTree::default();
        for path in paths {
            tree.insert(path.as_ref());
        }
        tree
    }

    pub fn insert(&mut self, rel_path: &str) {
        let mut current = self;
        for part in rel_path.split(is_separator).filter(|p| !p.is_empty()) {
            let pos = match current.children.iter().position(|(name, _)| name == part) {
                Some(pos) => pos,
                None => {
                    current.children.push((part.to_string(), PathTree::default()));
                    current.children.len() - 1
                }
            };
            current = &mut current.children[pos].1;
        }
    }

    pub fn children(&self) -> &[(String, PathTree)] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == std::path::MAIN_SEPARATOR
}
