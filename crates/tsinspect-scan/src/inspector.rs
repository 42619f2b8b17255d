//! Inspection driver: walks, probes, classifies and aggregates.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use tsinspect_core::{
    Aggregator, Classification, InspectConfig, InspectError, InspectReport, InspectStats,
    ProbeError, TimeWindow, TimestampRecord,
};

use crate::probe::{FsProbe, StatProbe};
use crate::progress::{CancelFlag, InspectProgress, ProgressTracker};
use crate::walker::PathWalker;

/// How many probed entries pass between progress updates.
const PROGRESS_INTERVAL: u64 = 1000;

type MatchCallback = Box<dyn Fn(&Path, &TimestampRecord) + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&Path, &ProbeError) + Send + Sync>;

/// Finds entries whose timestamps fall inside a window.
///
/// Construction validates the window and the root, so a constructed
/// inspector can always run. Each call to [`Inspector::inspect`] starts
/// from empty state and returns everything it found.
pub struct Inspector<P = FsProbe> {
    config: InspectConfig,
    root: PathBuf,
    window: TimeWindow,
    probe: P,
    on_match: Option<MatchCallback>,
    on_error: Option<ErrorCallback>,
    cancel: CancelFlag,
    progress_tx: broadcast::Sender<InspectProgress>,
}

impl Inspector<FsProbe> {
    /// Create an inspector that reads timestamps from the filesystem.
    pub fn new(config: InspectConfig) -> Result<Self, InspectError> {
        let probe = if config.follow_symlinks {
            FsProbe::following_symlinks()
        } else {
            FsProbe::new()
        };
        Self::with_probe(config, probe)
    }
}

impl<P: StatProbe> Inspector<P> {
    /// Create an inspector using a custom probe.
    pub fn with_probe(config: InspectConfig, probe: P) -> Result<Self, InspectError> {
        let window = config.resolve_window()?;

        let root = config
            .root
            .canonicalize()
            .map_err(|_| InspectError::RootNotFound {
                path: config.root.clone(),
            })?;
        if !root.is_dir() {
            return Err(InspectError::NotADirectory { path: root });
        }

        let (progress_tx, _) = broadcast::channel(100);

        Ok(Self {
            config,
            root,
            window,
            probe,
            on_match: None,
            on_error: None,
            cancel: CancelFlag::new(),
            progress_tx,
        })
    }

    /// Call `callback` for every entry with a timestamp in the window.
    pub fn on_match<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Path, &TimestampRecord) + Send + Sync + 'static,
    {
        self.on_match = Some(Box::new(callback));
        self
    }

    /// Call `callback` for every entry that could not be probed.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Path, &ProbeError) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Use an externally owned cancellation flag.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Flag that stops a running inspection when set.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Subscribe to progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<InspectProgress> {
        self.progress_tx.subscribe()
    }

    /// Canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolved time window.
    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// Walk the tree and aggregate every match.
    ///
    /// Each directory is probed like a file, then its files are probed on
    /// the worker pool. Results are merged on the calling thread, which is
    /// also where callbacks run.
    pub fn inspect(&self) -> InspectReport {
        info!(
            root = %self.root.display(),
            window_secs = self.window.duration().as_secs(),
            "starting inspection"
        );

        let pool = self.build_pool();
        let mut tracker = ProgressTracker::new(PROGRESS_INTERVAL);
        let mut stats = InspectStats::new();
        let mut results = Aggregator::new();
        let mut cancelled = false;

        for step in PathWalker::new(&self.root, &self.config) {
            if self.cancel.is_cancelled() {
                info!("inspection cancelled");
                cancelled = true;
                break;
            }

            stats.record_dir();
            let jobs = step.entries();
            debug!(dir = %step.rel_dir, entries = jobs.len(), "probing directory");

            let probed = match &pool {
                Some(pool) => pool.install(|| self.probe_all(jobs)),
                None => self.probe_all(jobs),
            };

            for (rel, abs, outcome) in probed {
                self.merge(&mut results, &mut stats, &rel, abs, outcome);
            }

            if tracker.due(&stats) {
                let _ = self
                    .progress_tx
                    .send(tracker.snapshot(&stats, step.abs_dir.clone()));
            }
        }

        let _ = self
            .progress_tx
            .send(tracker.snapshot(&stats, self.root.clone()));

        info!(
            dirs = stats.dirs_scanned,
            probed = stats.entries_probed,
            matches = stats.matches,
            errors = stats.errors,
            "inspection finished"
        );

        InspectReport::new(
            self.root.clone(),
            self.window,
            results,
            stats,
            tracker.elapsed(),
            cancelled,
        )
    }

    /// Worker pool for probes, or None to use the global rayon pool.
    fn build_pool(&self) -> Option<ThreadPool> {
        if self.config.threads == 0 {
            return None;
        }
        match ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
        {
            Ok(pool) => Some(pool),
            Err(err) => {
                warn!(error = %err, "failed to build probe pool, using global pool");
                None
            }
        }
    }

    fn probe_all(
        &self,
        jobs: Vec<(String, PathBuf)>,
    ) -> Vec<(String, PathBuf, Result<TimestampRecord, ProbeError>)> {
        let probe = &self.probe;
        jobs.into_par_iter()
            .map(|(rel, abs)| {
                let outcome = probe.probe(&abs);
                (rel, abs, outcome)
            })
            .collect()
    }

    fn merge(
        &self,
        results: &mut Aggregator,
        stats: &mut InspectStats,
        rel: &str,
        abs: PathBuf,
        outcome: Result<TimestampRecord, ProbeError>,
    ) {
        match outcome {
            Ok(record) => {
                let classification = Classification::of(&record, &self.window);
                let matched = results.record(rel, &classification);
                stats.record_probe(matched);
                if matched {
                    debug!(
                        path = %abs.display(),
                        at = ?classification.representative(),
                        "match"
                    );
                    if let Some(callback) = &self.on_match {
                        callback(&abs, &record);
                    }
                }
            }
            Err(err) => {
                stats.record_error();
                warn!(path = %abs.display(), error = %err, "probe failed");
                if let Some(callback) = &self.on_error {
                    callback(&abs, &err);
                }
                results.record_error(abs, err);
            }
        }
    }
}
