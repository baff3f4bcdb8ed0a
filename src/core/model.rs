//! Search model
//!
//! A search is described once by an immutable [`SearchRequest`] and produces
//! a stream of [`MatchRecord`]s plus a closing [`WalkSummary`].

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How a directory joins the workers it spawns for its subdirectories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    /// Spawn one child, wait for it, then move on to the next entry
    #[default]
    Sequential,
    /// Spawn a child per subdirectory, join them all once the entries are processed
    Fanout,
}

/// Everything one search needs; never mutated once the walk starts
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Absolute directory the search starts from
    pub root: PathBuf,

    /// Names to look for, in command-line order
    pub targets: Vec<String>,

    /// Descend into subdirectories
    pub recursive: bool,

    /// Compare names ignoring case
    pub ignore_case: bool,

    /// Descend through symbolic links to directories
    pub follow_links: bool,

    pub schedule: Schedule,
}

impl SearchRequest {
    /// Create a non-recursive, case-sensitive request
    pub fn new(root: impl Into<PathBuf>, targets: Vec<String>) -> Self {
        Self {
            root: root.into(),
            targets,
            recursive: false,
            ignore_case: false,
            follow_links: false,
            schedule: Schedule::Sequential,
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    pub fn schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }
}

/// Identifier of the worker (one per directory walked) that found a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub u64);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A confirmed match, emitted the moment it is found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub worker_id: WorkerId,

    /// Base name of the entry as it appears on disk
    pub name: String,

    /// The target name it matched
    pub target: String,

    /// Full path of the entry; written lossily when it is not valid UTF-8
    #[serde(serialize_with = "serialize_lossy_path")]
    pub path: PathBuf,
}

fn serialize_lossy_path<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

/// Totals of one walk, for diagnostics only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Workers started, one per directory walked
    pub workers: u64,
    pub matches: u64,
    /// Directories whose traversal was abandoned
    pub skipped_subtrees: u64,
    pub duration: Duration,
}
