//! Inspection progress reporting.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tsinspect_core::InspectStats;

/// Progress information during an inspection.
#[derive(Debug, Clone)]
pub struct InspectProgress {
    /// Number of directories walked so far.
    pub dirs_scanned: u64,
    /// Number of entries probed so far.
    pub entries_probed: u64,
    /// Number of matching entries so far.
    pub matches: u64,
    /// Number of probe failures so far.
    pub errors_count: u64,
    /// Directory currently being inspected.
    pub current_path: PathBuf,
    /// Time elapsed since the walk started.
    pub elapsed: Duration,
}

impl InspectProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            dirs_scanned: 0,
            entries_probed: 0,
            matches: 0,
            errors_count: 0,
            current_path: PathBuf::new(),
            elapsed: Duration::ZERO,
        }
    }
}

impl Default for InspectProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal progress tracker with timing.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    last_reported: u64,
    interval: u64,
}

impl ProgressTracker {
    pub fn new(interval: u64) -> Self {
        Self {
            start_time: Instant::now(),
            last_reported: 0,
            interval: interval.max(1),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Whether enough entries were probed since the last report.
    pub fn due(&mut self, stats: &InspectStats) -> bool {
        let seen = stats.entries_probed + stats.errors;
        if seen - self.last_reported >= self.interval {
            self.last_reported = seen;
            true
        } else {
            false
        }
    }

    pub fn snapshot(&self, stats: &InspectStats, current_path: PathBuf) -> InspectProgress {
        InspectProgress {
            dirs_scanned: stats.dirs_scanned,
            entries_probed: stats.entries_probed,
            matches: stats.matches,
            errors_count: stats.errors,
            current_path,
            elapsed: self.elapsed(),
        }
    }
}

/// Shared flag asking a running inspection to stop.
///
/// Checked between directories; entries already merged stay valid.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
