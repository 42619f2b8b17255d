//! Upward aggregation of matching timestamps.
//!
//! Matches are stored in flat maps keyed by relative path. Recording a match
//! touches the entry and every ancestor directory up to the root, so each
//! directory holds the newest matching timestamp found anywhere beneath it.
//!
//! Relative paths use the platform separator. The root is a lone separator,
//! directories end with a separator and files do not:
//!
//! ```text
//! /              root
//! /a/            directory "a"
//! /a/new.txt     file in "a"
//! ```

use std::collections::HashMap;
use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::ProbeError;
use crate::record::{Classification, TimestampKind};

/// Relative path of the scan root.
pub const ROOT: &str = MAIN_SEPARATOR_STR;

/// Parent of a relative path, keeping its trailing separator.
///
/// The parent of the root is the empty string.
pub fn parent_path(path: &str) -> &str {
    let trimmed = path.strip_suffix(MAIN_SEPARATOR).unwrap_or(path);
    match trimmed.rfind(MAIN_SEPARATOR) {
        Some(idx) => &path[..=idx],
        None => "",
    }
}

/// Relative path of a file named `name` inside directory `dir`.
pub fn child_file(dir: &str, name: &str) -> String {
    let mut path = String::with_capacity(dir.len() + name.len());
    path.push_str(dir);
    path.push_str(name);
    path
}

/// Relative path of a subdirectory named `name` inside directory `dir`.
pub fn child_dir(dir: &str, name: &str) -> String {
    let mut path = child_file(dir, name);
    path.push(MAIN_SEPARATOR);
    path
}

/// Newest matching timestamp at or below each path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateMap {
    entries: HashMap<String, SystemTime>,
}

impl AggregateMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `stamp` onto `path` and its ancestors.
    ///
    /// Stops at the first path already holding a newer timestamp: every
    /// ancestor of that path holds one too.
    pub fn propagate(&mut self, path: &str, stamp: SystemTime) {
        let mut path = path;
        while !path.is_empty() {
            match self.entries.get_mut(path) {
                Some(current) if stamp < *current => return,
                Some(current) => *current = stamp,
                None => {
                    self.entries.insert(path.to_owned(), stamp);
                }
            }
            path = parent_path(path);
        }
    }

    /// Timestamp recorded for `path`.
    pub fn get(&self, path: &str) -> Option<SystemTime> {
        self.entries.get(path).copied()
    }

    /// Whether `path` has a recorded match.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of paths with a recorded match.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, SystemTime)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Entries sorted newest first, ties broken by path.
    pub fn sorted(&self) -> Vec<(&str, SystemTime)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

/// All state accumulated by one inspection run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Aggregator {
    /// Matches on creation time.
    pub created: AggregateMap,
    /// Matches on access time.
    pub accessed: AggregateMap,
    /// Matches on modification time.
    pub modified: AggregateMap,
    /// Probe failures keyed by absolute path.
    pub errors: HashMap<PathBuf, ProbeError>,
}

impl Aggregator {
    /// Create empty state for a new run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map for the given timestamp kind.
    pub fn map(&self, kind: TimestampKind) -> &AggregateMap {
        match kind {
            TimestampKind::Created => &self.created,
            TimestampKind::Accessed => &self.accessed,
            TimestampKind::Modified => &self.modified,
        }
    }

    fn map_mut(&mut self, kind: TimestampKind) -> &mut AggregateMap {
        match kind {
            TimestampKind::Created => &mut self.created,
            TimestampKind::Accessed => &mut self.accessed,
            TimestampKind::Modified => &mut self.modified,
        }
    }

    /// Propagate every matching kind of an entry. Returns whether it matched.
    pub fn record(&mut self, path: &str, classification: &Classification) -> bool {
        for (kind, stamp) in classification.matches() {
            self.map_mut(kind).propagate(path, stamp);
        }
        classification.is_match()
    }

    /// Remember a probe failure. The first failure for a path is kept.
    pub fn record_error(&mut self, path: PathBuf, error: ProbeError) -> bool {
        match self.errors.entry(path) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(error);
                true
            }
        }
    }

    /// Probe failures sorted by path.
    pub fn sorted_errors(&self) -> Vec<(&PathBuf, &ProbeError)> {
        let mut errors: Vec<_> = self.errors.iter().collect();
        errors.sort_by(|a, b| a.0.cmp(b.0));
        errors
    }

    /// Whether any kind matched anywhere.
    pub fn has_matches(&self) -> bool {
        TimestampKind::ALL.iter().any(|&kind| !self.map(kind).is_empty())
    }
}
