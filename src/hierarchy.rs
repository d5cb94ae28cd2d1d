//! Box-drawing hierarchy text: rendering a set of relative paths and reading it back.
//!
//! ```text
//! proj
//! ├── README.md
//! └── src
//!     └── main.py
//! ```
//!
//! Every nesting level is exactly [`INDENT_WIDTH`] columns wide. The decoder relies
//! on that to recover levels, so text indented any other way is rejected.
//!
//! A name starts right after its `── ` glyph, so leading whitespace in a name
//! survives a round trip. Trailing whitespace does not: lines are trimmed at the end.

use crate::error::ParseError;
use crate::tree_builder::PathTree;
use std::collections::BTreeSet;

pub const INDENT_WIDTH: usize = 4;

/// Section markers of a rendered artifact; the decoder reads only what lies between them.
pub const HIERARCHY_HEADER: &str = "=== FILE HIERARCHY ===";
pub const CONTENTS_HEADER: &str = "=== FILE CONTENTS ===";

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const CONTINUATION: &str = "│   ";
const GAP: &str = "    ";
const BRANCH_TAIL: &str = "── ";

/// Renders `paths` (relative, `/`-separated) under `root_name`, siblings in input order.
pub fn encode<I, S>(paths: I, root_name: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tree = PathTree::from_paths(paths);
    let mut out = String::new();
    out.push_str(root_name);
    out.push('\n');
    let mut prefix = String::new();
    render(&tree, &mut prefix, &mut out);
    out
}

fn render(tree: &PathTree, prefix: &mut String, out: &mut String) {
    let count = tree.children().len();
    for (i, (name, child)) in tree.children().iter().enumerate() {
        let last = i + 1 == count;
        out.push_str(prefix);
        out.push_str(if last { LAST_BRANCH } else { BRANCH });
        out.push_str(name);
        out.push('\n');

        if !child.is_empty() {
            let saved = prefix.len();
            prefix.push_str(if last { GAP } else { CONTINUATION });
            render(child, prefix, out);
            prefix.truncate(saved);
        }
    }
}

/// Parses hierarchy text back into relative paths.
///
/// Accepts a whole rendered artifact too: a leading [`HIERARCHY_HEADER`] is
/// skipped and everything from [`CONTENTS_HEADER`] on is ignored. The first
/// remaining non-blank line is the root name and is discarded. Directory lines
/// are returned just like file lines; callers decide which ones exist as files.
/// Nothing is returned unless the whole tree parses.
pub fn decode(text: &str) -> Result<BTreeSet<String>, ParseError> {
    let mut lines = text
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != CONTENTS_HEADER)
        .skip_while(|(_, line)| {
            let line = line.trim();
            line.is_empty() || line == HIERARCHY_HEADER
        });
    if lines.next().is_none() {
        return Err(ParseError::MissingRoot);
    }

    let mut paths = BTreeSet::new();
    let mut parts: Vec<String> = Vec::new();

    for (line_no, raw) in lines {
        let line = raw.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        let Some((column, byte_offset)) = name_start(line) else {
            continue;
        };
        if column % INDENT_WIDTH != 0 {
            return Err(ParseError::InconsistentIndent {
                line: line_no + 1,
                column,
            });
        }
        let level = if column == 0 {
            0
        } else {
            (column - 1) / INDENT_WIDTH
        };
        if level > parts.len() {
            return Err(ParseError::InconsistentIndent {
                line: line_no + 1,
                column,
            });
        }

        let name = &line[byte_offset..];
        parts.truncate(level);
        parts.push(name.to_string());
        paths.insert(parts.join("/"));
    }

    if paths.is_empty() {
        return Err(ParseError::NoEntries);
    }
    Ok(paths)
}

/// Column (in chars) and byte offset where the entry name begins.
///
/// After a branch glyph the name starts right behind `── `; otherwise at the
/// first character that is not tree drawing.
fn name_start(line: &str) -> Option<(usize, usize)> {
    if let Some(pos) = line.find(BRANCH_TAIL) {
        let offset = pos + BRANCH_TAIL.len();
        if line[..pos].chars().all(is_drawing) && offset < line.len() {
            return Some((line[..offset].chars().count(), offset));
        }
    }
    line.char_indices()
        .enumerate()
        .find(|(_, (_, ch))| !is_drawing(*ch))
        .map(|(column, (byte_offset, _))| (column, byte_offset))
}

fn is_drawing(ch: char) -> bool {
    matches!(ch, '│' | '├' | '└' | '─') || ch.is_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn encodes_the_documented_layout() {
        let text = encode(["README.md", "src/main.py"], "proj");
        assert_eq!(text, "proj\n├── README.md\n└── src\n    └── main.py\n");
    }

    #[test]
    fn continuation_bars_only_where_siblings_follow() {
        let text = encode(["a/b/c.txt", "a/d.txt", "e.txt"], "r");
        assert_eq!(
            text,
            "r\n├── a\n│   ├── b\n│   │   └── c.txt\n│   └── d.txt\n└── e.txt\n"
        );
    }

    #[test]
    fn round_trips_file_sets() {
        let paths = ["src/main.py", "src/utils.py", "README.md"];
        let decoded = decode(&encode(paths, "repo")).unwrap();
        // Directory lines come back too; the file set is recovered exactly.
        assert_eq!(decoded, set(&["README.md", "src", "src/main.py", "src/utils.py"]));
        let files: BTreeSet<String> = decoded.into_iter().filter(|p| p != "src").collect();
        assert_eq!(files, set(&paths));
    }

    #[test]
    fn flat_file_sets_round_trip_exactly() {
        let paths = set(&["a.txt", "b.md", "c"]);
        assert_eq!(decode(&encode(&paths, "root")).unwrap(), paths);
    }

    #[test]
    fn skips_blank_lines_and_leading_blank_root_lines() {
        let text = "\n\n  proj\n├── a\n\n│   └── b.txt\n└── c.txt\n\n";
        assert_eq!(decode(text).unwrap(), set(&["a", "a/b.txt", "c.txt"]));
    }

    #[test]
    fn tolerates_crlf_and_unicode_names() {
        let text = "proj\r\n├── données\r\n│   └── été 2024.txt\r\n└── 日本.md\r\n";
        assert_eq!(
            decode(text).unwrap(),
            set(&["données", "données/été 2024.txt", "日本.md"])
        );
    }

    #[test]
    fn unprefixed_lines_sit_at_top_level() {
        assert_eq!(decode("proj\nREADME.md\n").unwrap(), set(&["README.md"]));
    }

    #[test]
    fn missing_root_and_empty_bodies_fail() {
        assert_eq!(decode(""), Err(ParseError::MissingRoot));
        assert_eq!(decode("  \n\n"), Err(ParseError::MissingRoot));
        assert_eq!(decode("proj\n\n"), Err(ParseError::NoEntries));
        assert_eq!(decode("proj\n│\n"), Err(ParseError::NoEntries));
    }

    #[test]
    fn reads_only_the_hierarchy_section_of_an_artifact() {
        let artifact = "=== FILE HIERARCHY ===\n\nproj\n└── src\n    └── main.py\n\n\
                        === FILE CONTENTS ===\n\n\
                        --- Start of file: src/main.py ---\n\
                        def f():\n  if x:\n            return 1\n\n\
                        --- End of file: src/main.py ---\n\n";
        assert_eq!(decode(artifact).unwrap(), set(&["src", "src/main.py"]));
        assert_eq!(
            decode("=== FILE HIERARCHY ===\n\n=== FILE CONTENTS ===\nproj\n└── a\n"),
            Err(ParseError::MissingRoot)
        );
    }

    #[test]
    fn names_with_leading_spaces_round_trip() {
        let paths = set(&[" padded.txt", "dir/  two.md"]);
        let decoded = decode(&encode(&paths, "proj")).unwrap();
        assert_eq!(decoded, set(&[" padded.txt", "dir", "dir/  two.md"]));
    }

    #[test]
    fn rejects_foreign_indent_widths() {
        let two_wide = "proj\n├─ src\n│  └─ main.rs\n";
        assert_eq!(
            decode(two_wide),
            Err(ParseError::InconsistentIndent { line: 2, column: 3 })
        );

        let skipped_level = "proj\n├── a\n│       └── deep.txt\n";
        assert_eq!(
            decode(skipped_level),
            Err(ParseError::InconsistentIndent { line: 3, column: 12 })
        );
    }
}
