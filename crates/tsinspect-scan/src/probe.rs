//! Timestamp probes.

use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;
#[cfg(unix)]
use std::time::Duration;

use tsinspect_core::{ProbeError, TimestampRecord};

/// Reads the timestamps of a single entry.
///
/// Implementations must classify failures at this boundary; the inspector
/// records every failure and moves on to the next entry.
pub trait StatProbe: Send + Sync {
    /// Probe the entry at an absolute path.
    fn probe(&self, path: &Path) -> Result<TimestampRecord, ProbeError>;
}

impl<F> StatProbe for F
where
    F: Fn(&Path) -> Result<TimestampRecord, ProbeError> + Send + Sync,
{
    fn probe(&self, path: &Path) -> Result<TimestampRecord, ProbeError> {
        self(path)
    }
}

/// Probe backed by filesystem metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe {
    follow_symlinks: bool,
}

impl FsProbe {
    /// Create a probe that reports on links themselves.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a probe that reports on link targets.
    pub fn following_symlinks() -> Self {
        Self {
            follow_symlinks: true,
        }
    }
}

impl StatProbe for FsProbe {
    fn probe(&self, path: &Path) -> Result<TimestampRecord, ProbeError> {
        let metadata = if self.follow_symlinks {
            std::fs::metadata(path)
        } else {
            std::fs::symlink_metadata(path)
        }
        .map_err(|e| ProbeError::from_io(path, e))?;

        let modified = metadata
            .modified()
            .map_err(|e| ProbeError::from_io(path, e))?;
        let accessed = metadata
            .accessed()
            .map_err(|e| ProbeError::from_io(path, e))?;
        let created = get_created(&metadata).map_err(|e| ProbeError::from_io(path, e))?;

        Ok(TimestampRecord::new(created, accessed, modified))
    }
}

/// Birth time, falling back to the inode change time where the
/// filesystem does not record one.
#[cfg(unix)]
fn get_created(metadata: &Metadata) -> std::io::Result<SystemTime> {
    metadata.created().or_else(|_| {
        unix_time(metadata.ctime(), metadata.ctime_nsec())
            .ok_or_else(|| std::io::Error::other("ctime out of range"))
    })
}

/// Convert a `stat` seconds/nanoseconds pair; nanoseconds always count
/// forward, also for times before the epoch.
#[cfg(unix)]
fn unix_time(secs: i64, nanos: i64) -> Option<SystemTime> {
    let whole = Duration::from_secs(secs.unsigned_abs());
    let base = if secs >= 0 {
        SystemTime::UNIX_EPOCH.checked_add(whole)
    } else {
        SystemTime::UNIX_EPOCH.checked_sub(whole)
    }?;
    base.checked_add(Duration::from_nanos(u64::try_from(nanos).ok()?))
}

#[cfg(not(unix))]
fn get_created(metadata: &Metadata) -> std::io::Result<SystemTime> {
    metadata.created()
}
