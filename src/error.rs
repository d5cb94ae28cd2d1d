use std::path::PathBuf;
use thiserror::Error;

pub type StitchResult<T> = Result<T, StitchError>;

/// Errors that interrupt a user-initiated action.
///
/// Everything else (unreadable subdirectories, vanished files, poll hiccups)
/// is recovered where it happens and only logged.
#[derive(Error, Debug)]
pub enum StitchError {
    #[error("cannot read root directory {}: {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    #[error("could not parse hierarchy text: {0}")]
    Parse(#[from] ParseError),
}

/// Failures of the hierarchy text decoder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("the first line must contain the root directory name")]
    MissingRoot,

    #[error("no entries found below the root line")]
    NoEntries,

    #[error("inconsistent indentation on line {line} (name starts at column {column})")]
    InconsistentIndent { line: usize, column: usize },
}
