//! Poll-based change detection.
//!
//! A [`Snapshot`] records which paths exist under the root (exclusions applied,
//! extension filter ignored). Comparing two snapshots tells whether the tree
//! needs a rescan; otherwise only the selected files' modification times are
//! checked. Scheduling is a one-shot [`PollTimer`] the caller re-arms after
//! each tick, so two polls never overlap.

use crate::filters::{Evaluator, FilterConfig};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::trace;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Unchanged,
    /// The set of paths differs; the tree has already been rescanned.
    PathsChanged,
    /// Same paths, but a selected file's modification time moved; output is stale.
    ContentChanged,
}

/// Anything that can be asked "did something change since last time?".
pub trait Poller {
    fn tick(&mut self) -> PollOutcome;
}

/// Every directory and every non-excluded file below the root, root excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    paths: HashSet<PathBuf>,
}

impl Snapshot {
    /// Walks `root` pruning excluded names.
    ///
    /// Only an unreadable root is an error; unreadable subdirectories are skipped.
    pub fn take(root: &Path, filters: &FilterConfig) -> io::Result<Snapshot> {
        fs::read_dir(root)?;
        let evaluator = Evaluator::new(filters, root);
        let paths = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| !evaluator.excludes_entry(entry))
            .filter_map(|result| match result {
                Ok(entry) => Some(entry.into_path()),
                Err(e) => {
                    trace!("snapshot skipped an entry: {}", e);
                    None
                }
            })
            .collect();
        Ok(Snapshot { paths })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Current modification time, `None` when the file cannot be stat'ed.
pub fn modified_time(path: &Path) -> Option<std::time::SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// One-shot deadline. Firing does not re-arm; the owner calls [`PollTimer::arm`] again.
#[derive(Debug, Clone)]
pub struct PollTimer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl PollTimer {
    pub fn new(interval: Duration) -> Self {
        PollTimer {
            interval,
            deadline: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Schedules the next tick one interval after `now`, replacing any pending one.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }

    /// Takes the pending tick if it is due, leaving the timer disarmed.
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }

    /// Time left until the pending tick; `None` when nothing is scheduled.
    pub fn until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}
