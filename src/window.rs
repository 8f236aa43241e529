//! Time-of-day recording window.
//!
//! Wildlife activity is mostly nocturnal, so recording is usually
//! restricted to a configured interval of the local day. The window is
//! half-open: the start minute records, the end minute does not.

use chrono::{Local, NaiveTime};

/// A `[start, end)` interval of local wall-clock time.
///
/// An end before the start denotes a window wrapping past midnight.
/// Equal start and end leaves the window permanently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl RecordingWindow {
    /// Creates a window spanning `[start, end)`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Returns true if `t` falls inside the window.
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.start == self.end {
            return true;
        }
        if self.start < self.end {
            self.start <= t && t < self.end
        } else {
            t >= self.start || t < self.end
        }
    }

    /// Returns true if the current local time is inside the window.
    pub fn active(&self) -> bool {
        self.contains(Local::now().time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_plain_window() {
        let w = RecordingWindow::new(t(9, 0), t(17, 0));
        assert!(w.contains(t(9, 0)));
        assert!(w.contains(t(12, 30)));
        assert!(!w.contains(t(17, 0)));
        assert!(!w.contains(t(20, 0)));
    }

    #[test]
    fn test_window_wrapping_midnight() {
        let w = RecordingWindow::new(t(21, 0), t(5, 0));
        assert!(w.contains(t(21, 0)));
        assert!(w.contains(t(23, 59)));
        assert!(w.contains(t(2, 0)));
        assert!(!w.contains(t(5, 0)));
        assert!(!w.contains(t(12, 0)));
    }

    #[test]
    fn test_equal_bounds_always_open() {
        let w = RecordingWindow::new(t(0, 0), t(0, 0));
        assert!(w.contains(t(0, 0)));
        assert!(w.contains(t(13, 37)));
    }
}
