//! Time window resolution and membership.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::error::{Bound, InspectError};

/// A resolved time range. Both boundaries are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Lower boundary (exclusive).
    pub start: SystemTime,
    /// Upper boundary (exclusive).
    pub end: SystemTime,
}

impl TimeWindow {
    /// Create a window from two boundaries given in either order.
    pub fn new(a: SystemTime, b: SystemTime) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Turn optional bounds and a length into a concrete window.
    ///
    /// When both bounds are present the window length is ignored. A single
    /// bound needs a window length to derive the other one.
    pub fn resolve(
        start: Option<SystemTime>,
        end: Option<SystemTime>,
        window: Option<Duration>,
    ) -> Result<Self, InspectError> {
        let (start, end) = match (start, end) {
            (Some(start), Some(end)) => (start, end),
            (Some(start), None) => {
                let window = window.ok_or(InspectError::MissingWindow { bound: Bound::Start })?;
                let end = start
                    .checked_add(window)
                    .ok_or(InspectError::WindowOutOfRange {
                        bound: Bound::Start,
                        window_secs: window.as_secs(),
                    })?;
                (start, end)
            }
            (None, Some(end)) => {
                let window = window.ok_or(InspectError::MissingWindow { bound: Bound::End })?;
                let start = end
                    .checked_sub(window)
                    .ok_or(InspectError::WindowOutOfRange {
                        bound: Bound::End,
                        window_secs: window.as_secs(),
                    })?;
                (start, end)
            }
            (None, None) => return Err(InspectError::MissingBound),
        };

        Ok(Self::new(start, end))
    }

    /// Whether `t` lies strictly between the boundaries.
    pub fn contains(&self, t: SystemTime) -> bool {
        self.start < t && t < self.end
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.end.duration_since(self.start).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_both_bounds_ignore_window() {
        let w = TimeWindow::resolve(Some(at(100)), Some(at(200)), Some(Duration::from_secs(5)))
            .unwrap();
        assert_eq!(w.start, at(100));
        assert_eq!(w.end, at(200));
    }

    #[test]
    fn test_start_plus_window() {
        let w = TimeWindow::resolve(Some(at(100)), None, Some(Duration::from_secs(50))).unwrap();
        assert_eq!(w.end, at(150));
    }

    #[test]
    fn test_end_minus_window() {
        let w = TimeWindow::resolve(None, Some(at(1500236538)), Some(Duration::from_secs(180)))
            .unwrap();
        assert_eq!(w.start, at(1500236358));
        assert_eq!(w.end, at(1500236538));
    }

    #[test]
    fn test_reversed_bounds_are_swapped() {
        let w = TimeWindow::resolve(Some(at(300)), Some(at(100)), None).unwrap();
        assert_eq!(w.start, at(100));
        assert_eq!(w.end, at(300));
    }

    #[test]
    fn test_missing_combinations() {
        let window = Some(Duration::from_secs(10));
        assert!(matches!(
            TimeWindow::resolve(None, None, window),
            Err(InspectError::MissingBound)
        ));
        assert!(matches!(
            TimeWindow::resolve(Some(at(1)), None, None),
            Err(InspectError::MissingWindow { bound: Bound::Start })
        ));
        assert!(matches!(
            TimeWindow::resolve(None, Some(at(1)), None),
            Err(InspectError::MissingWindow { bound: Bound::End })
        ));
        assert!(matches!(
            TimeWindow::resolve(None, None, None),
            Err(InspectError::MissingBound)
        ));
    }

    #[test]
    fn test_contains_is_exclusive() {
        let w = TimeWindow::new(at(10), at(20));
        assert!(!w.contains(at(10)));
        assert!(w.contains(at(11)));
        assert!(w.contains(at(19)));
        assert!(!w.contains(at(20)));
        assert!(!w.contains(at(5)));
    }

    #[test]
    fn test_duration() {
        assert_eq!(TimeWindow::new(at(20), at(10)).duration(), Duration::from_secs(10));
    }
}
