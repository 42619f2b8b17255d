//! Per-entry timestamps and classification against a window.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::window::TimeWindow;

/// The three timestamps tracked for every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimestampKind {
    /// Creation time (birth time, or inode change time where unavailable).
    Created,
    /// Last access time.
    Accessed,
    /// Last modification time.
    Modified,
}

impl TimestampKind {
    /// All kinds in precedence order.
    pub const ALL: [TimestampKind; 3] = [
        TimestampKind::Created,
        TimestampKind::Accessed,
        TimestampKind::Modified,
    ];

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            TimestampKind::Created => "Created",
            TimestampKind::Accessed => "Accessed",
            TimestampKind::Modified => "Modified",
        }
    }
}

/// Timestamps read from a single file or directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampRecord {
    /// Creation time.
    pub created: SystemTime,
    /// Last access time.
    pub accessed: SystemTime,
    /// Last modification time.
    pub modified: SystemTime,
}

impl TimestampRecord {
    /// Create a record from all three timestamps.
    pub fn new(created: SystemTime, accessed: SystemTime, modified: SystemTime) -> Self {
        Self {
            created,
            accessed,
            modified,
        }
    }

    /// Create a record where every timestamp has the same value.
    pub fn uniform(t: SystemTime) -> Self {
        Self::new(t, t, t)
    }

    /// Get the timestamp of the given kind.
    pub fn get(&self, kind: TimestampKind) -> SystemTime {
        match kind {
            TimestampKind::Created => self.created,
            TimestampKind::Accessed => self.accessed,
            TimestampKind::Modified => self.modified,
        }
    }
}

/// Which timestamps of a record fell inside a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    /// Matching creation time.
    pub created: Option<SystemTime>,
    /// Matching access time.
    pub accessed: Option<SystemTime>,
    /// Matching modification time.
    pub modified: Option<SystemTime>,
}

impl Classification {
    /// Classify every timestamp of `record` independently.
    pub fn of(record: &TimestampRecord, window: &TimeWindow) -> Self {
        let pick = |t: SystemTime| window.contains(t).then_some(t);
        Self {
            created: pick(record.created),
            accessed: pick(record.accessed),
            modified: pick(record.modified),
        }
    }

    /// Matching timestamp of the given kind, if any.
    pub fn get(&self, kind: TimestampKind) -> Option<SystemTime> {
        match kind {
            TimestampKind::Created => self.created,
            TimestampKind::Accessed => self.accessed,
            TimestampKind::Modified => self.modified,
        }
    }

    /// Iterate over the matching kinds in precedence order.
    pub fn matches(&self) -> impl Iterator<Item = (TimestampKind, SystemTime)> + '_ {
        TimestampKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|t| (kind, t)))
    }

    /// Whether any timestamp matched.
    pub fn is_match(&self) -> bool {
        self.created.is_some() || self.accessed.is_some() || self.modified.is_some()
    }

    /// The first matching timestamp in precedence order.
    pub fn representative(&self) -> Option<SystemTime> {
        self.created.or(self.accessed).or(self.modified)
    }
}
