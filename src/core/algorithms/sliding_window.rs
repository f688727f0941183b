//! Sliding window counter: a weighted estimate across the current and
//! previous window smooths the fixed-window boundary burst.
//!
//! This is the approximate weighted-counter variant. The admission estimate
//! is `previous * (window - elapsed) / window + current`, which bounds any
//! window-length span to at most `2 * max - 1` admissions.

use super::Verdict;

/// Sliding window state for one key.
#[derive(Debug)]
pub struct SlidingWindowCounter {
    max_requests: u64,
    window_seconds: f64,
    current_window_start: f64,
    current_count: u64,
    previous_count: u64,
}

impl SlidingWindowCounter {
    /// Create a counter whose current window starts at `now`.
    pub fn new(max_requests: u64, window_seconds: f64, now: f64) -> Self {
        Self {
            max_requests,
            window_seconds,
            current_window_start: now,
            current_count: 0,
            previous_count: 0,
        }
    }

    /// Rotate windows as needed, then admit if the weighted estimate allows.
    pub fn allow(&mut self, now: f64) -> Verdict {
        let mut elapsed = now - self.current_window_start;

        if elapsed >= self.window_seconds {
            if elapsed >= 2.0 * self.window_seconds {
                // Both windows are stale
                self.previous_count = 0;
                self.current_count = 0;
                self.current_window_start = now;
            } else {
                self.previous_count = self.current_count;
                self.current_count = 0;
                self.current_window_start += self.window_seconds;
            }
            elapsed = now - self.current_window_start;
        }

        let weight = (self.window_seconds - elapsed) / self.window_seconds;
        let estimate = self.previous_count as f64 * weight + self.current_count as f64;

        if estimate < self.max_requests as f64 {
            self.current_count += 1;
            let remaining = (self.max_requests as f64 - estimate - 1.0).floor().max(0.0);
            Verdict::allow(remaining as u64)
        } else {
            Verdict::block()
        }
    }
}
