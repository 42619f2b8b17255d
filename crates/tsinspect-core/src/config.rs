//! Inspection configuration types.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::InspectError;
use crate::window::TimeWindow;

/// Configuration for an inspection run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct InspectConfig {
    /// Directory to begin walking.
    pub root: PathBuf,

    /// Start of the time window.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub start: Option<SystemTime>,

    /// End of the time window.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub end: Option<SystemTime>,

    /// Window length, used to derive a missing start or end.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub window: Option<Duration>,

    /// Follow symbolic links.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Include hidden entries (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,

    /// Maximum depth to traverse (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Number of worker threads (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,
}

fn default_true() -> bool {
    true
}

impl InspectConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        Ok(())
    }
}

impl InspectConfig {
    /// Create a new config builder.
    pub fn builder() -> InspectConfigBuilder {
        InspectConfigBuilder::default()
    }

    /// Create a config for `root` with no window set.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            start: None,
            end: None,
            window: None,
            follow_symlinks: false,
            include_hidden: true,
            max_depth: None,
            threads: 0,
        }
    }

    /// Set the window start.
    pub fn with_start(mut self, start: SystemTime) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the window end.
    pub fn with_end(mut self, end: SystemTime) -> Self {
        self.end = Some(end);
        self
    }

    /// Set the window length.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = Some(window);
        self
    }

    /// Resolve the configured bounds into a concrete window.
    pub fn resolve_window(&self) -> Result<TimeWindow, InspectError> {
        TimeWindow::resolve(self.start, self.end, self.window)
    }
}

impl From<InspectConfigBuilderError> for InspectError {
    fn from(err: InspectConfigBuilderError) -> Self {
        InspectError::InvalidConfig {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    #[test]
    fn test_config_builder() {
        let config = InspectConfig::builder()
            .root("/home/user")
            .end(UNIX_EPOCH + Duration::from_secs(1000))
            .window(Duration::from_secs(180))
            .threads(4usize)
            .build()
            .unwrap();

        assert_eq!(config.root, PathBuf::from("/home/user"));
        assert_eq!(config.threads, 4);
        assert!(config.include_hidden);
        assert!(config.start.is_none());

        let window = config.resolve_window().unwrap();
        assert_eq!(window.start, UNIX_EPOCH + Duration::from_secs(820));
    }

    #[test]
    fn test_builder_requires_root() {
        assert!(InspectConfig::builder().build().is_err());
        assert!(InspectConfig::builder().root("").build().is_err());
    }

    #[test]
    fn test_builder_error_converts() {
        let err: InspectError = InspectConfig::builder().build().unwrap_err().into();
        assert!(matches!(err, InspectError::InvalidConfig { .. }));
    }

    #[test]
    fn test_config_simple() {
        let config = InspectConfig::new("/r").with_start(UNIX_EPOCH);
        assert_eq!(config.root, PathBuf::from("/r"));
        assert!(!config.follow_symlinks);
        assert!(config.resolve_window().is_err());
    }
}
