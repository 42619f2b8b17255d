//! Error types for inspection runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which end of the window was supplied without a window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bound {
    /// The window start.
    Start,
    /// The window end.
    End,
}

impl Bound {
    /// The other end of the window.
    pub fn opposite(self) -> Bound {
        match self {
            Bound::Start => Bound::End,
            Bound::End => Bound::Start,
        }
    }
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bound::Start => f.write_str("start"),
            Bound::End => f.write_str("end"),
        }
    }
}

/// Argument errors raised while setting up an inspection.
///
/// Every variant is raised before traversal begins; once a walk has
/// started nothing aborts it.
#[derive(Debug, Error)]
pub enum InspectError {
    /// Neither `start` nor `end` was given.
    #[error("At least one of start or end is required, together with a window")]
    MissingBound,

    /// One bound was given without the other bound or a window.
    #[error("{bound} requires {} or window", bound.opposite())]
    MissingWindow { bound: Bound },

    /// Applying the window to the given bound left the representable range.
    #[error("Window of {window_secs}s applied to the {bound} is out of range")]
    WindowOutOfRange { bound: Bound, window_secs: u64 },

    /// Root directory does not exist.
    #[error("Root path does not exist: {path}")]
    RootNotFound { path: PathBuf },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Classification of a probe failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeErrorKind {
    /// Entry vanished between listing and probing.
    NotFound,
    /// Entry exists but its metadata may not be read.
    PermissionDenied,
    /// Anything else.
    Other,
}

/// A recoverable failure to read an entry's timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ProbeError {
    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Other I/O or platform error.
    #[error("Probe failed at {path}: {message}")]
    Other { path: PathBuf, message: String },
}

impl ProbeError {
    /// Classify an I/O error raised while probing `path`.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Other {
                path,
                message: source.to_string(),
            },
        }
    }

    /// Create an unclassified error.
    pub fn other(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Other {
            path: path.into(),
            message: message.into(),
        }
    }

    /// The kind of failure.
    pub fn kind(&self) -> ProbeErrorKind {
        match self {
            ProbeError::NotFound { .. } => ProbeErrorKind::NotFound,
            ProbeError::PermissionDenied { .. } => ProbeErrorKind::PermissionDenied,
            ProbeError::Other { .. } => ProbeErrorKind::Other,
        }
    }
}
