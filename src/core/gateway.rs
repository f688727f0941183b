//! The decision front door: resolve key, run the algorithm, record telemetry.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::trace;
use uuid::Uuid;

use super::algorithms::LimiterParams;
use super::analytics::AnalyticsAggregator;
use super::clock::Clock;
use super::models::{Algorithm, RequestLog};
use super::registry::LimiterRegistry;
use super::sink::LogSink;
use crate::storage::StorageLayer;
use crate::utils::error::{RateGateError, Result};

/// Outcome of one admission decision.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    /// Whether the request was admitted
    pub allowed: bool,
    /// Algorithm that made the decision
    pub algorithm: Algorithm,
    /// Estimated further admissions at the decision instant
    pub remaining_quota: u64,
    /// Wall-clock time of the decision
    pub timestamp: DateTime<Utc>,
}

/// The decision gateway. Owns the engine wiring and exposes [`decide`].
///
/// Constructed once at startup and shared via the application state; there
/// are no ambient singletons, so tests build isolated engines freely.
///
/// [`decide`]: DecisionGateway::decide
#[derive(Debug)]
pub struct DecisionGateway {
    storage: Arc<StorageLayer>,
    registry: Arc<LimiterRegistry>,
    analytics: Arc<AnalyticsAggregator>,
    clock: Arc<dyn Clock>,
    sink: LogSink,
}

impl DecisionGateway {
    /// Wire up a gateway. Spawns the log-persistence worker, so this must be
    /// called from within a tokio runtime.
    pub fn new(
        storage: Arc<StorageLayer>,
        registry: Arc<LimiterRegistry>,
        analytics: Arc<AnalyticsAggregator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let sink = LogSink::spawn(Arc::clone(&storage));
        Self {
            storage,
            registry,
            analytics,
            clock,
            sink,
        }
    }

    /// Decide whether one request for `api_key` is admitted.
    ///
    /// Unknown keys fail with [`RateGateError::UnknownApiKey`]. Keys without
    /// a stored policy are limited by the default token bucket
    /// (100 requests / 60 s). A blocked request is a successful decision,
    /// not an error.
    pub async fn decide(&self, api_key: &str, endpoint: &str) -> Result<Decision> {
        if self.storage.find_api_key(api_key).await?.is_none() {
            return Err(RateGateError::UnknownApiKey);
        }

        let params = match self.storage.latest_config_for(api_key).await? {
            Some(config) => LimiterParams::from(&config),
            None => LimiterParams::default(),
        };
        let algorithm = params.algorithm;

        let slot = self.registry.resolve(api_key, &params, self.clock.now());

        // The algorithm step is CPU-only: lock, decide, unlock. No I/O and
        // no other lock may be taken while the instance mutex is held.
        let verdict = {
            let mut limiter = slot.limiter.lock();
            limiter.allow(self.clock.now())
        };

        let timestamp = Utc::now();
        trace!(
            api_key,
            endpoint,
            algorithm = %algorithm,
            allowed = verdict.allowed,
            remaining = verdict.remaining,
            "Rate limit decision"
        );

        let log = RequestLog {
            id: Uuid::new_v4(),
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
            algorithm,
            allowed: verdict.allowed,
            timestamp,
            remaining_quota: verdict.remaining,
        };

        // Counters and the ring update synchronously so the dashboard sees
        // this decision; durable persistence is handed off.
        self.analytics.record(&log);
        self.sink.submit(log);

        Ok(Decision {
            allowed: verdict.allowed,
            algorithm,
            remaining_quota: verdict.remaining,
            timestamp,
        })
    }

    /// The analytics aggregator this gateway reports into.
    pub fn analytics(&self) -> &AnalyticsAggregator {
        &self.analytics
    }

    /// The registry holding this gateway's live instances.
    pub fn registry(&self) -> &LimiterRegistry {
        &self.registry
    }

    /// The storage layer backing this gateway.
    pub fn storage(&self) -> &StorageLayer {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::core::clock::ManualClock;
    use crate::core::models::{ApiKeyRecord, RateLimitConfig};

    async fn engine() -> (DecisionGateway, Arc<StorageLayer>, Arc<ManualClock>) {
        let config = StorageConfig {
            url: "memory://".to_string(),
        };
        let storage = Arc::new(StorageLayer::new(&config).await.unwrap());
        let clock = Arc::new(ManualClock::new());
        let gateway = DecisionGateway::new(
            Arc::clone(&storage),
            Arc::new(LimiterRegistry::new()),
            Arc::new(AnalyticsAggregator::new()),
            clock.clone() as Arc<dyn Clock>,
        );
        (gateway, storage, clock)
    }

    #[tokio::test]
    async fn test_unknown_key_is_rejected_and_unrecorded() {
        let (gateway, _storage, _clock) = engine().await;

        let result = gateway.decide("rk_missing", "/api/protected/test").await;
        assert!(matches!(result, Err(RateGateError::UnknownApiKey)));
        assert_eq!(gateway.analytics().summary().total_requests, 0);
    }

    #[tokio::test]
    async fn test_configured_key_uses_stored_policy() {
        let (gateway, storage, _clock) = engine().await;

        let key = ApiKeyRecord::new("tenant");
        storage.put_api_key(&key).await.unwrap();
        storage
            .put_config(&RateLimitConfig::new(
                &key.api_key,
                Algorithm::FixedWindow,
                2,
                10.0,
            ))
            .await
            .unwrap();

        let first = gateway.decide(&key.api_key, "/t").await.unwrap();
        let second = gateway.decide(&key.api_key, "/t").await.unwrap();
        let third = gateway.decide(&key.api_key, "/t").await.unwrap();

        assert_eq!(first.algorithm, Algorithm::FixedWindow);
        assert!(first.allowed && second.allowed);
        assert!(!third.allowed);
        assert_eq!(third.remaining_quota, 0);
    }

    #[tokio::test]
    async fn test_unconfigured_key_gets_default_bucket() {
        let (gateway, storage, _clock) = engine().await;

        let key = ApiKeyRecord::new("tenant");
        storage.put_api_key(&key).await.unwrap();

        let decision = gateway.decide(&key.api_key, "/t").await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.algorithm, Algorithm::TokenBucket);
        assert_eq!(decision.remaining_quota, 99);
    }

    #[tokio::test]
    async fn test_every_decision_is_counted_once() {
        let (gateway, storage, _clock) = engine().await;

        let key = ApiKeyRecord::new("tenant");
        storage.put_api_key(&key).await.unwrap();
        storage
            .put_config(&RateLimitConfig::new(
                &key.api_key,
                Algorithm::TokenBucket,
                3,
                10.0,
            ))
            .await
            .unwrap();

        for _ in 0..5 {
            gateway.decide(&key.api_key, "/t").await.unwrap();
        }

        let summary = gateway.analytics().summary();
        assert_eq!(summary.total_requests, 5);
        assert_eq!(summary.allowed_requests, 3);
        assert_eq!(summary.blocked_requests, 2);
        assert_eq!(summary.algorithm_stats["token_bucket"].total, 5);
    }

    #[tokio::test]
    async fn test_reconfiguration_resets_state() {
        let (gateway, storage, _clock) = engine().await;

        let key = ApiKeyRecord::new("tenant");
        storage.put_api_key(&key).await.unwrap();
        storage
            .put_config(&RateLimitConfig::new(
                &key.api_key,
                Algorithm::FixedWindow,
                1,
                60.0,
            ))
            .await
            .unwrap();

        assert!(gateway.decide(&key.api_key, "/t").await.unwrap().allowed);
        assert!(!gateway.decide(&key.api_key, "/t").await.unwrap().allowed);

        // A different policy discards the exhausted window
        storage
            .put_config(&RateLimitConfig::new(
                &key.api_key,
                Algorithm::FixedWindow,
                2,
                60.0,
            ))
            .await
            .unwrap();
        assert!(gateway.decide(&key.api_key, "/t").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_refill_over_virtual_time() {
        let (gateway, storage, clock) = engine().await;

        let key = ApiKeyRecord::new("tenant");
        storage.put_api_key(&key).await.unwrap();
        storage
            .put_config(&RateLimitConfig::new(
                &key.api_key,
                Algorithm::TokenBucket,
                5,
                10.0,
            ))
            .await
            .unwrap();

        for _ in 0..7 {
            gateway.decide(&key.api_key, "/t").await.unwrap();
        }
        assert!(!gateway.decide(&key.api_key, "/t").await.unwrap().allowed);

        // 0.5 tokens/s: four seconds buys two admissions
        clock.advance(4.0);
        assert!(gateway.decide(&key.api_key, "/t").await.unwrap().allowed);
        assert!(gateway.decide(&key.api_key, "/t").await.unwrap().allowed);
        assert!(!gateway.decide(&key.api_key, "/t").await.unwrap().allowed);
    }
}
