//! Result of a completed inspection run.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregateMap, Aggregator};
use crate::error::ProbeError;
use crate::window::TimeWindow;

/// Counters collected during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectStats {
    /// Directories yielded by the walker.
    pub dirs_scanned: u64,
    /// Entries probed successfully.
    pub entries_probed: u64,
    /// Entries with at least one timestamp in the window.
    pub matches: u64,
    /// Probe failures.
    pub errors: u64,
}

impl InspectStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a walked directory.
    pub fn record_dir(&mut self) {
        self.dirs_scanned += 1;
    }

    /// Record a successful probe.
    pub fn record_probe(&mut self, matched: bool) {
        self.entries_probed += 1;
        if matched {
            self.matches += 1;
        }
    }

    /// Record a failed probe.
    pub fn record_error(&mut self) {
        self.errors += 1;
    }
}

/// Everything one inspection produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectReport {
    /// Root directory that was walked.
    pub root: PathBuf,

    /// Resolved time window.
    pub window: TimeWindow,

    /// When this inspection was performed.
    pub inspected_at: SystemTime,

    /// Duration of the walk.
    pub duration: Duration,

    /// Whether the walk stopped early on request.
    pub cancelled: bool,

    /// Summary counters.
    pub stats: InspectStats,

    /// Aggregated matches and errors.
    #[serde(flatten)]
    pub results: Aggregator,
}

impl InspectReport {
    /// Create a report from a finished run.
    pub fn new(
        root: PathBuf,
        window: TimeWindow,
        results: Aggregator,
        stats: InspectStats,
        duration: Duration,
        cancelled: bool,
    ) -> Self {
        Self {
            root,
            window,
            inspected_at: SystemTime::now(),
            duration,
            cancelled,
            stats,
            results,
        }
    }

    /// Matches on creation time.
    pub fn created(&self) -> &AggregateMap {
        &self.results.created
    }

    /// Matches on access time.
    pub fn accessed(&self) -> &AggregateMap {
        &self.results.accessed
    }

    /// Matches on modification time.
    pub fn modified(&self) -> &AggregateMap {
        &self.results.modified
    }

    /// Probe failures keyed by absolute path.
    pub fn errors(&self) -> &HashMap<PathBuf, ProbeError> {
        &self.results.errors
    }

    /// Check if any entry failed to probe.
    pub fn has_errors(&self) -> bool {
        !self.results.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default() {
        let stats = InspectStats::default();
        assert_eq!(stats.dirs_scanned, 0);
        assert_eq!(stats.entries_probed, 0);
        assert_eq!(stats.errors, 0);
    }

    #[test]
    fn test_stats_record() {
        let mut stats = InspectStats::new();
        stats.record_dir();
        stats.record_probe(true);
        stats.record_probe(false);
        stats.record_error();

        assert_eq!(stats.dirs_scanned, 1);
        assert_eq!(stats.entries_probed, 2);
        assert_eq!(stats.matches, 1);
        assert_eq!(stats.errors, 1);
    }

    #[test]
    fn test_report_accessors() {
        let now = SystemTime::now();
        let report = InspectReport::new(
            PathBuf::from("/r"),
            TimeWindow::new(now, now),
            Aggregator::new(),
            InspectStats::new(),
            Duration::ZERO,
            false,
        );

        assert!(report.created().is_empty());
        assert!(report.accessed().is_empty());
        assert!(report.modified().is_empty());
        assert!(!report.has_errors());
    }
}
