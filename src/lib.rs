//! Select part of a folder tree and stitch it into a single text artifact: a
//! box-drawing hierarchy followed by the selected files' contents, kept in
//! sync with the filesystem by polling.

pub mod cli;
pub mod clipboard;
pub mod error;
pub mod file_scanner;
pub mod filters;
pub mod hierarchy;
pub mod logging;
pub mod output;
pub mod poller;
pub mod selection;
pub mod session;
pub mod tree_builder;
pub mod tui;
pub mod utils;
pub mod workflow;
