//! In-memory store: the default backend, and the one tests run against.
//!
//! Records live in plain vectors behind one `RwLock`; the collections are
//! small (admin-created keys and configs) except the log, which is capped.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::VecDeque;

use super::ConfigStore;
use crate::core::models::{ApiKeyRecord, RateLimitConfig, RequestLog};
use crate::utils::error::Result;

/// Retained log entries; older entries are dropped.
const MAX_LOG_ENTRIES: usize = 10_000;

#[derive(Debug, Default)]
struct MemoryInner {
    api_keys: Vec<ApiKeyRecord>,
    configs: Vec<RateLimitConfig>,
    logs: VecDeque<RequestLog>,
}

/// Non-durable store keeping everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn put_api_key(&self, record: &ApiKeyRecord) -> Result<()> {
        self.inner.write().api_keys.push(record.clone());
        Ok(())
    }

    async fn list_api_keys(&self) -> Result<Vec<ApiKeyRecord>> {
        Ok(self.inner.read().api_keys.clone())
    }

    async fn find_api_key(&self, api_key: &str) -> Result<Option<ApiKeyRecord>> {
        Ok(self
            .inner
            .read()
            .api_keys
            .iter()
            .find(|record| record.api_key == api_key)
            .cloned())
    }

    async fn count_api_keys(&self) -> Result<u64> {
        Ok(self.inner.read().api_keys.len() as u64)
    }

    async fn put_config(&self, record: &RateLimitConfig) -> Result<()> {
        let mut inner = self.inner.write();
        // A new config supersedes any earlier one for the same key
        inner.configs.retain(|c| c.api_key != record.api_key);
        inner.configs.push(record.clone());
        Ok(())
    }

    async fn list_configs(&self) -> Result<Vec<RateLimitConfig>> {
        Ok(self.inner.read().configs.clone())
    }

    async fn latest_config_for(&self, api_key: &str) -> Result<Option<RateLimitConfig>> {
        Ok(self
            .inner
            .read()
            .configs
            .iter()
            .filter(|c| c.api_key == api_key)
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn count_configs(&self) -> Result<u64> {
        Ok(self.inner.read().configs.len() as u64)
    }

    async fn append_log(&self, record: &RequestLog) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.logs.len() == MAX_LOG_ENTRIES {
            inner.logs.pop_front();
        }
        inner.logs.push_back(record.clone());
        Ok(())
    }

    async fn recent_logs(&self, limit: usize) -> Result<Vec<RequestLog>> {
        Ok(self
            .inner
            .read()
            .logs
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_logs(&self) -> Result<u64> {
        Ok(self.inner.read().logs.len() as u64)
    }

    async fn delete_all_logs(&self) -> Result<()> {
        self.inner.write().logs.clear();
        Ok(())
    }
}
