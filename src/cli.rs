use crate::output::OutputMode;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_EXCLUDED_DIRS: [&str; 12] = [
    ".git",
    "node_modules",
    "target",
    "_target",
    ".elan",
    ".lake",
    ".idea",
    ".vscode",
    "_app",
    ".svelte-kit",
    ".sqlx",
    "venv",
];
const DEFAULT_EXCLUDED_FILES: [&str; 14] = [
    "LICENSE",
    "Cargo.lock",
    "package-lock.json",
    "yarn.lock",
    ".DS_Store",
    ".dockerignore",
    ".gitignore",
    ".npmignore",
    ".pre-commit-config.yaml",
    ".prettierignore",
    ".prettierrc",
    "eslint.config.js",
    ".env",
    "Thumbs.db",
];

/// repostitch – stitch a hand-picked part of a folder tree into one text artifact
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root to scan (defaults to CWD)
    #[arg(value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Comma-separated extensions to show (e.g. py,.txt). Directories without a match are hidden.
    #[arg(long, value_delimiter = ',', value_name = "EXTENSIONS", env = "REPOSTITCH_TYPES")]
    pub types: Vec<String>,

    /// Comma-separated directory names to leave out at every level
    #[arg(
        long,
        value_delimiter = ',',
        value_name = "NAMES",
        env = "REPOSTITCH_EXCLUDE_DIRS",
        default_values = DEFAULT_EXCLUDED_DIRS
    )]
    pub exclude_dirs: Vec<String>,

    /// Comma-separated file names to leave out at every level
    #[arg(
        long,
        value_delimiter = ',',
        value_name = "NAMES",
        env = "REPOSTITCH_EXCLUDE_FILES",
        default_values = DEFAULT_EXCLUDED_FILES
    )]
    pub exclude_files: Vec<String>,

    /// Also leave out whatever the root .gitignore matches
    #[arg(long)]
    pub gitignore: bool,

    /// What the generated output contains
    #[arg(long, value_enum, default_value_t = OutputMode::Full)]
    pub mode: OutputMode,

    /// Select the files listed in a hierarchy text ("-" reads stdin)
    #[arg(long, value_name = "FILE")]
    pub select_from: Option<PathBuf>,

    /// Generate the output once and exit without the interactive UI
    #[arg(long)]
    pub headless: bool,

    /// Headless, then keep polling and regenerate on every change (implies --headless)
    #[arg(long)]
    pub watch: bool,

    /// Milliseconds between change polls
    #[arg(
        long,
        value_name = "MS",
        env = "REPOSTITCH_POLL_INTERVAL",
        default_value_t = 15_000
    )]
    pub poll_interval: u64,

    /// In headless runs, copy the output to the clipboard instead of printing it
    #[arg(long)]
    pub copy: bool,
}

impl Cli {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval.max(1))
    }

    pub fn is_headless(&self) -> bool {
        self.headless || self.watch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_the_usual_exclusions() {
        let cli = Cli::try_parse_from(["repostitch"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(cli.types.is_empty());
        assert!(cli.exclude_dirs.iter().any(|d| d == "node_modules"));
        assert!(cli.exclude_files.iter().any(|f| f == "Cargo.lock"));
        assert_eq!(cli.mode, OutputMode::Full);
        assert_eq!(cli.poll_interval(), Duration::from_secs(15));
        assert!(!cli.is_headless());
    }

    #[test]
    fn parses_lists_and_modes() {
        let cli = Cli::try_parse_from([
            "repostitch",
            "proj",
            "--types",
            "py,md",
            "--exclude-dirs",
            "build",
            "--mode",
            "directories-only",
            "--watch",
        ])
        .unwrap();
        assert_eq!(cli.types, vec!["py", "md"]);
        assert_eq!(cli.exclude_dirs, vec!["build"]);
        assert_eq!(cli.mode, OutputMode::DirectoriesOnly);
        assert!(cli.is_headless());
    }
}
