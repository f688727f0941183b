//! Storage layer: persistence of API keys, rate-limit configurations, and
//! the decision audit log.
//!
//! The engine consumes only the small [`ConfigStore`] interface. Two
//! backends implement it: an in-memory store (the default, and the store the
//! tests run against) and a Redis store. The backend is selected by the
//! configured connection URL.

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::StorageConfig;
use crate::core::models::{ApiKeyRecord, RateLimitConfig, RequestLog};
use crate::utils::error::{RateGateError, Result};

/// Persistence interface consumed by the engine and the admin surface.
#[async_trait]
pub trait ConfigStore: Send + Sync + std::fmt::Debug {
    /// Insert an API-key record.
    async fn put_api_key(&self, record: &ApiKeyRecord) -> Result<()>;
    /// All API-key records, oldest first.
    async fn list_api_keys(&self) -> Result<Vec<ApiKeyRecord>>;
    /// Look up a record by its opaque token.
    async fn find_api_key(&self, api_key: &str) -> Result<Option<ApiKeyRecord>>;
    /// Number of registered keys.
    async fn count_api_keys(&self) -> Result<u64>;

    /// Insert a rate-limit configuration, superseding earlier configs for
    /// the same key.
    async fn put_config(&self, record: &RateLimitConfig) -> Result<()>;
    /// All effective configurations, oldest first.
    async fn list_configs(&self) -> Result<Vec<RateLimitConfig>>;
    /// The most recent configuration for a key.
    async fn latest_config_for(&self, api_key: &str) -> Result<Option<RateLimitConfig>>;
    /// Number of effective configurations.
    async fn count_configs(&self) -> Result<u64>;

    /// Append a decision record.
    async fn append_log(&self, record: &RequestLog) -> Result<()>;
    /// Most recent decision records, newest first.
    async fn recent_logs(&self, limit: usize) -> Result<Vec<RequestLog>>;
    /// Number of retained decision records.
    async fn count_logs(&self) -> Result<u64>;
    /// Delete all decision records.
    async fn delete_all_logs(&self) -> Result<()>;
}

/// Storage facade handed to the rest of the service.
#[derive(Debug, Clone)]
pub struct StorageLayer {
    backend: Arc<dyn ConfigStore>,
}

impl StorageLayer {
    /// Connect the backend named by the configured URL.
    ///
    /// `memory://` selects the in-memory store; `redis://` (or `rediss://`)
    /// connects to Redis.
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        let backend: Arc<dyn ConfigStore> = if config.url.starts_with("memory://") {
            info!("Using in-memory storage");
            Arc::new(memory::MemoryStore::new())
        } else if config.url.starts_with("redis://") || config.url.starts_with("rediss://") {
            info!(url = %config.url, "Connecting to Redis storage");
            Arc::new(redis::RedisStore::connect(&config.url).await?)
        } else {
            return Err(RateGateError::Config(format!(
                "Unsupported store URL: {}",
                config.url
            )));
        };

        Ok(Self { backend })
    }

    /// Build a layer over an explicit backend (used by tests).
    pub fn with_backend(backend: Arc<dyn ConfigStore>) -> Self {
        Self { backend }
    }

    /// Insert an API-key record.
    pub async fn put_api_key(&self, record: &ApiKeyRecord) -> Result<()> {
        self.backend.put_api_key(record).await
    }

    /// All API-key records, oldest first.
    pub async fn list_api_keys(&self) -> Result<Vec<ApiKeyRecord>> {
        self.backend.list_api_keys().await
    }

    /// Look up a record by its opaque token.
    pub async fn find_api_key(&self, api_key: &str) -> Result<Option<ApiKeyRecord>> {
        self.backend.find_api_key(api_key).await
    }

    /// Number of registered keys.
    pub async fn count_api_keys(&self) -> Result<u64> {
        self.backend.count_api_keys().await
    }

    /// Insert a configuration, superseding earlier ones for the same key.
    pub async fn put_config(&self, record: &RateLimitConfig) -> Result<()> {
        self.backend.put_config(record).await
    }

    /// All effective configurations, oldest first.
    pub async fn list_configs(&self) -> Result<Vec<RateLimitConfig>> {
        self.backend.list_configs().await
    }

    /// The most recent configuration for a key.
    pub async fn latest_config_for(&self, api_key: &str) -> Result<Option<RateLimitConfig>> {
        self.backend.latest_config_for(api_key).await
    }

    /// Number of effective configurations.
    pub async fn count_configs(&self) -> Result<u64> {
        self.backend.count_configs().await
    }

    /// Append a decision record.
    pub async fn append_log(&self, record: &RequestLog) -> Result<()> {
        self.backend.append_log(record).await
    }

    /// Most recent decision records, newest first.
    pub async fn recent_logs(&self, limit: usize) -> Result<Vec<RequestLog>> {
        self.backend.recent_logs(limit).await
    }

    /// Number of retained decision records.
    pub async fn count_logs(&self) -> Result<u64> {
        self.backend.count_logs().await
    }

    /// Delete all decision records.
    pub async fn delete_all_logs(&self) -> Result<()> {
        self.backend.delete_all_logs().await
    }
}
