//! Filesystem inspection engine for tsinspect.
//!
//! This crate walks a directory tree with jwalk, probes the timestamps of
//! every file and directory, and aggregates the entries that fall inside a
//! time window.
//!
//! # Overview
//!
//! - **Pre-order walk** yielding each directory with its files
//! - **Parallel probes** on a bounded rayon pool
//! - **Upward aggregation** of the newest match per directory
//! - **Progress updates** via broadcast channels
//! - **Cancellation** between directories
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::{Duration, SystemTime};
//! use tsinspect_scan::{InspectConfig, Inspector};
//!
//! let config = InspectConfig::new("/path/to/scan")
//!     .with_end(SystemTime::now())
//!     .with_window(Duration::from_secs(180));
//! let inspector = Inspector::new(config)
//!     .unwrap()
//!     .on_error(|path, err| eprintln!("{err:?} {}", path.display()));
//! let report = inspector.inspect();
//!
//! for (path, stamp) in report.modified().sorted() {
//!     println!("{path} : {stamp:?}");
//! }
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use tsinspect_scan::{InspectConfig, Inspector};
//!
//! # let config = InspectConfig::new(".");
//! let inspector = Inspector::new(config).unwrap();
//! let mut progress_rx = inspector.subscribe();
//!
//! std::thread::spawn(move || {
//!     while let Ok(progress) = progress_rx.blocking_recv() {
//!         println!("Probed {} entries", progress.entries_probed);
//!     }
//! });
//! ```

mod inspector;
mod probe;
mod progress;
mod walker;

pub use inspector::Inspector;
pub use probe::{FsProbe, StatProbe};
pub use progress::{CancelFlag, InspectProgress};
pub use walker::{PathWalker, WalkStep};

// Re-export core types for convenience
pub use tsinspect_core::{
    AggregateMap, Aggregator, Classification, InspectConfig, InspectError, InspectReport,
    InspectStats, ProbeError, ProbeErrorKind, TimeWindow, TimestampKind, TimestampRecord,
};
