//! In-memory analytics: process-wide counters and a ring of recent
//! decisions, sliced by algorithm.
//!
//! Counters and the ring live under one mutex, which decisions acquire only
//! after the limiter instance mutex has been released.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::VecDeque;

use super::models::{Algorithm, RequestLog};

/// Recent-decision ring capacity.
const RECENT_CAPACITY: usize = 500;

/// Allowed/blocked tallies for one slice.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SliceCounters {
    /// Total decisions
    pub total: u64,
    /// Admitted
    pub allowed: u64,
    /// Rejected
    pub blocked: u64,
}

impl SliceCounters {
    fn record(&mut self, allowed: bool) {
        self.total += 1;
        if allowed {
            self.allowed += 1;
        } else {
            self.blocked += 1;
        }
    }

    fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        round2(self.allowed as f64 / self.total as f64 * 100.0)
    }
}

/// Per-algorithm statistics in the summary view.
#[derive(Debug, Clone, Serialize)]
pub struct AlgorithmStats {
    /// Total decisions made by this algorithm
    pub total: u64,
    /// Admitted
    pub allowed: u64,
    /// Rejected
    pub blocked: u64,
    /// Percentage of admitted decisions, two decimal places
    pub success_rate: f64,
}

/// Snapshot returned by [`AnalyticsAggregator::summary`].
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    /// All decisions since startup or the last reset
    pub total_requests: u64,
    /// Admitted decisions
    pub allowed_requests: u64,
    /// Rejected decisions
    pub blocked_requests: u64,
    /// Percentage of admitted decisions, two decimal places
    pub success_rate: f64,
    /// Statistics per algorithm tag; all four tags are always present
    pub algorithm_stats: BTreeMap<&'static str, AlgorithmStats>,
}

#[derive(Debug, Default)]
struct AggregatorState {
    overall: SliceCounters,
    per_algorithm: [SliceCounters; 4],
    recent: VecDeque<RequestLog>,
}

/// Process-wide decision telemetry.
#[derive(Debug, Default)]
pub struct AnalyticsAggregator {
    state: Mutex<AggregatorState>,
}

impl AnalyticsAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one decision into counters and the recent ring.
    pub fn record(&self, log: &RequestLog) {
        let mut state = self.state.lock();

        state.overall.record(log.allowed);
        state.per_algorithm[log.algorithm.index()].record(log.allowed);

        if state.recent.len() == RECENT_CAPACITY {
            state.recent.pop_front();
        }
        state.recent.push_back(log.clone());
    }

    /// Current counter snapshot for the dashboard.
    pub fn summary(&self) -> AnalyticsSummary {
        let state = self.state.lock();

        let algorithm_stats = Algorithm::ALL
            .iter()
            .map(|algorithm| {
                let counters = state.per_algorithm[algorithm.index()];
                (
                    algorithm.as_str(),
                    AlgorithmStats {
                        total: counters.total,
                        allowed: counters.allowed,
                        blocked: counters.blocked,
                        success_rate: counters.success_rate(),
                    },
                )
            })
            .collect();

        AnalyticsSummary {
            total_requests: state.overall.total,
            allowed_requests: state.overall.allowed,
            blocked_requests: state.overall.blocked,
            success_rate: state.overall.success_rate(),
            algorithm_stats,
        }
    }

    /// Recent decisions, newest first, optionally filtered by API key.
    pub fn recent(&self, limit: usize, api_key: Option<&str>) -> Vec<RequestLog> {
        let state = self.state.lock();
        state
            .recent
            .iter()
            .rev()
            .filter(|log| api_key.map_or(true, |key| log.api_key == key))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Zero all counters and clear the ring.
    pub fn reset(&self) {
        *self.state.lock() = AggregatorState::default();
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn log(api_key: &str, algorithm: Algorithm, allowed: bool) -> RequestLog {
        RequestLog {
            id: Uuid::new_v4(),
            api_key: api_key.to_string(),
            endpoint: "/api/protected/test".to_string(),
            algorithm,
            allowed,
            timestamp: Utc::now(),
            remaining_quota: 0,
        }
    }

    #[test]
    fn test_summary_starts_at_zero() {
        let analytics = AnalyticsAggregator::new();
        let summary = analytics.summary();

        assert_eq!(summary.total_requests, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert_eq!(summary.algorithm_stats.len(), 4);
        assert_eq!(summary.algorithm_stats["token_bucket"].total, 0);
    }

    #[test]
    fn test_counters_stay_consistent() {
        let analytics = AnalyticsAggregator::new();
        analytics.record(&log("rk_a", Algorithm::TokenBucket, true));
        analytics.record(&log("rk_a", Algorithm::TokenBucket, false));
        analytics.record(&log("rk_b", Algorithm::FixedWindow, true));

        let summary = analytics.summary();
        assert_eq!(summary.total_requests, 3);
        assert_eq!(summary.allowed_requests, 2);
        assert_eq!(summary.blocked_requests, 1);

        let per_algorithm_total: u64 = summary.algorithm_stats.values().map(|s| s.total).sum();
        assert_eq!(per_algorithm_total, summary.total_requests);
        assert_eq!(summary.success_rate, 66.67);
    }

    #[test]
    fn test_recent_is_newest_first_and_bounded() {
        let analytics = AnalyticsAggregator::new();
        for i in 0..(RECENT_CAPACITY + 10) {
            let mut entry = log("rk_a", Algorithm::LeakyBucket, i % 2 == 0);
            entry.remaining_quota = i as u64;
            analytics.record(&entry);
        }

        let recent = analytics.recent(usize::MAX, None);
        assert_eq!(recent.len(), RECENT_CAPACITY);
        // Newest entry carries the highest marker
        assert_eq!(recent[0].remaining_quota, (RECENT_CAPACITY + 9) as u64);
        assert!(recent[0].remaining_quota > recent[1].remaining_quota);

        let limited = analytics.recent(5, None);
        assert_eq!(limited.len(), 5);
    }

    #[test]
    fn test_recent_filters_by_api_key() {
        let analytics = AnalyticsAggregator::new();
        analytics.record(&log("rk_a", Algorithm::TokenBucket, true));
        analytics.record(&log("rk_b", Algorithm::TokenBucket, true));
        analytics.record(&log("rk_a", Algorithm::TokenBucket, false));

        let filtered = analytics.recent(10, Some("rk_a"));
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|l| l.api_key == "rk_a"));
    }

    #[test]
    fn test_reset_round_trip() {
        let analytics = AnalyticsAggregator::new();
        analytics.record(&log("rk_a", Algorithm::SlidingWindow, true));
        analytics.reset();

        let summary = analytics.summary();
        assert_eq!(summary.total_requests, 0);
        assert!(summary.algorithm_stats.values().all(|s| s.total == 0));
        assert!(analytics.recent(10, None).is_empty());
    }

    #[test]
    fn test_success_rate_rounding() {
        let analytics = AnalyticsAggregator::new();
        analytics.record(&log("rk_a", Algorithm::TokenBucket, true));
        analytics.record(&log("rk_a", Algorithm::TokenBucket, true));
        analytics.record(&log("rk_a", Algorithm::TokenBucket, false));

        // 2/3 = 66.666..% rounds to 66.67
        assert_eq!(analytics.summary().success_rate, 66.67);
    }
}
