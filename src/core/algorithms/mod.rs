//! The four interchangeable rate-limiting algorithms.
//!
//! Each algorithm owns its own state and exposes the uniform
//! `allow(now) -> Verdict` operation. All four are total over any
//! non-negative elapsed time: they never fail and never suspend, so a
//! decision is a short CPU-only critical section.

pub mod fixed_window;
pub mod leaky_bucket;
pub mod sliding_window;
pub mod token_bucket;

pub use fixed_window::FixedWindow;
pub use leaky_bucket::LeakyBucket;
pub use sliding_window::SlidingWindowCounter;
pub use token_bucket::TokenBucket;

use crate::core::models::{Algorithm, RateLimitConfig};

/// Outcome of a single admission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the request was admitted
    pub allowed: bool,
    /// Best estimate of further admissions possible right now
    pub remaining: u64,
}

impl Verdict {
    pub(crate) fn allow(remaining: u64) -> Self {
        Self {
            allowed: true,
            remaining,
        }
    }

    pub(crate) fn block() -> Self {
        Self {
            allowed: false,
            remaining: 0,
        }
    }
}

/// Effective parameters a limiter instance enforces.
///
/// Derived from the most recent stored [`RateLimitConfig`] for a key, or from
/// [`LimiterParams::default`] for keys with no stored policy. Parameter
/// equality is what the registry uses to detect reconfiguration.
#[derive(Debug, Clone, PartialEq)]
pub struct LimiterParams {
    /// Enforcing algorithm
    pub algorithm: Algorithm,
    /// Maximum admissions per window
    pub max_requests: u64,
    /// Window length in seconds
    pub window_seconds: f64,
}

impl LimiterParams {
    /// Admissions per second implied by the window (refill / leak rate).
    pub fn rate(&self) -> f64 {
        self.max_requests as f64 / self.window_seconds
    }
}

impl Default for LimiterParams {
    /// Policy applied to keys that have no stored configuration.
    fn default() -> Self {
        Self {
            algorithm: Algorithm::TokenBucket,
            max_requests: 100,
            window_seconds: 60.0,
        }
    }
}

impl From<&RateLimitConfig> for LimiterParams {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            algorithm: config.algorithm,
            max_requests: config.max_requests,
            window_seconds: config.window_seconds,
        }
    }
}

/// A live limiter instance: one of the four algorithms, with its state.
#[derive(Debug)]
pub enum Limiter {
    TokenBucket(TokenBucket),
    LeakyBucket(LeakyBucket),
    FixedWindow(FixedWindow),
    SlidingWindow(SlidingWindowCounter),
}

impl Limiter {
    /// Build a fresh instance for the given parameters, anchored at `now`.
    pub fn from_params(params: &LimiterParams, now: f64) -> Self {
        match params.algorithm {
            Algorithm::TokenBucket => {
                Limiter::TokenBucket(TokenBucket::new(params.max_requests, params.rate(), now))
            }
            Algorithm::LeakyBucket => {
                Limiter::LeakyBucket(LeakyBucket::new(params.max_requests, params.rate(), now))
            }
            Algorithm::FixedWindow => Limiter::FixedWindow(FixedWindow::new(
                params.max_requests,
                params.window_seconds,
                now,
            )),
            Algorithm::SlidingWindow => Limiter::SlidingWindow(SlidingWindowCounter::new(
                params.max_requests,
                params.window_seconds,
                now,
            )),
        }
    }

    /// Decide one admission at `now`.
    pub fn allow(&mut self, now: f64) -> Verdict {
        match self {
            Limiter::TokenBucket(bucket) => bucket.allow(now),
            Limiter::LeakyBucket(bucket) => bucket.allow(now),
            Limiter::FixedWindow(window) => window.allow(now),
            Limiter::SlidingWindow(window) => window.allow(now),
        }
    }

    /// Tag of the algorithm backing this instance.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Limiter::TokenBucket(_) => Algorithm::TokenBucket,
            Limiter::LeakyBucket(_) => Algorithm::LeakyBucket,
            Limiter::FixedWindow(_) => Algorithm::FixedWindow,
            Limiter::SlidingWindow(_) => Algorithm::SlidingWindow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_token_bucket_100_per_minute() {
        let params = LimiterParams::default();
        assert_eq!(params.algorithm, Algorithm::TokenBucket);
        assert_eq!(params.max_requests, 100);
        assert_eq!(params.window_seconds, 60.0);
    }

    #[test]
    fn test_from_params_builds_matching_variant() {
        for algorithm in Algorithm::ALL {
            let params = LimiterParams {
                algorithm,
                max_requests: 10,
                window_seconds: 5.0,
            };
            let limiter = Limiter::from_params(&params, 0.0);
            assert_eq!(limiter.algorithm(), algorithm);
        }
    }

    #[test]
    fn test_fresh_instance_admits_first_request() {
        for algorithm in Algorithm::ALL {
            let params = LimiterParams {
                algorithm,
                max_requests: 3,
                window_seconds: 10.0,
            };
            let mut limiter = Limiter::from_params(&params, 0.0);
            let verdict = limiter.allow(0.0);
            assert!(verdict.allowed, "{algorithm} blocked its first request");
        }
    }

    #[test]
    fn test_params_equality_detects_reconfiguration() {
        let a = LimiterParams {
            algorithm: Algorithm::FixedWindow,
            max_requests: 5,
            window_seconds: 10.0,
        };
        let same = a.clone();
        let different = LimiterParams {
            max_requests: 6,
            ..a.clone()
        };
        assert_eq!(a, same);
        assert_ne!(a, different);
    }
}
