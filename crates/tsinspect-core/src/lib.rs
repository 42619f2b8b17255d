//! Core types and algorithms for tsinspect.
//!
//! This crate holds everything that does not touch the filesystem: window
//! resolution, per-entry classification, and the aggregate maps that carry
//! matches up the directory hierarchy.

mod aggregate;
mod config;
mod error;
mod record;
mod report;
mod window;

pub use aggregate::{AggregateMap, Aggregator, ROOT, child_dir, child_file, parent_path};
pub use config::{InspectConfig, InspectConfigBuilder, InspectConfigBuilderError};
pub use error::{Bound, InspectError, ProbeError, ProbeErrorKind};
pub use record::{Classification, TimestampKind, TimestampRecord};
pub use report::{InspectReport, InspectStats};
pub use window::TimeWindow;
