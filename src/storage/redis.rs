//! Redis-backed store for deployments that need records to outlive the
//! process.
//!
//! Layout: API keys and configurations live in hashes keyed by the opaque
//! token (a config insert therefore supersedes the previous one for that key
//! in a single `HSET`); the decision log is a list with newest entries at
//! the head, trimmed to a fixed length. All values are JSON documents.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

use super::ConfigStore;
use crate::core::models::{ApiKeyRecord, RateLimitConfig, RequestLog};
use crate::utils::error::Result;

const API_KEYS_KEY: &str = "rategate:api_keys";
const CONFIGS_KEY: &str = "rategate:configs";
const LOGS_KEY: &str = "rategate:logs";

/// Retained log entries; `LTRIM` drops older ones.
const MAX_LOG_ENTRIES: isize = 10_000;

/// Store backed by a Redis server.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connect to the server at `url` with automatic reconnection.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        debug!("Redis connection established");
        Ok(Self { conn })
    }

    fn conn(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

#[async_trait]
impl ConfigStore for RedisStore {
    async fn put_api_key(&self, record: &ApiKeyRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        let _: () = self
            .conn()
            .hset(API_KEYS_KEY, &record.api_key, json)
            .await?;
        Ok(())
    }

    async fn list_api_keys(&self) -> Result<Vec<ApiKeyRecord>> {
        let raw: Vec<String> = self.conn().hvals(API_KEYS_KEY).await?;
        let mut records = raw
            .iter()
            .map(|json| serde_json::from_str(json).map_err(Into::into))
            .collect::<Result<Vec<ApiKeyRecord>>>()?;
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }

    async fn find_api_key(&self, api_key: &str) -> Result<Option<ApiKeyRecord>> {
        let raw: Option<String> = self.conn().hget(API_KEYS_KEY, api_key).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn count_api_keys(&self) -> Result<u64> {
        Ok(self.conn().hlen(API_KEYS_KEY).await?)
    }

    async fn put_config(&self, record: &RateLimitConfig) -> Result<()> {
        let json = serde_json::to_string(record)?;
        let _: () = self.conn().hset(CONFIGS_KEY, &record.api_key, json).await?;
        Ok(())
    }

    async fn list_configs(&self) -> Result<Vec<RateLimitConfig>> {
        let raw: Vec<String> = self.conn().hvals(CONFIGS_KEY).await?;
        let mut records = raw
            .iter()
            .map(|json| serde_json::from_str(json).map_err(Into::into))
            .collect::<Result<Vec<RateLimitConfig>>>()?;
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }

    async fn latest_config_for(&self, api_key: &str) -> Result<Option<RateLimitConfig>> {
        let raw: Option<String> = self.conn().hget(CONFIGS_KEY, api_key).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn count_configs(&self) -> Result<u64> {
        Ok(self.conn().hlen(CONFIGS_KEY).await?)
    }

    async fn append_log(&self, record: &RequestLog) -> Result<()> {
        let json = serde_json::to_string(record)?;
        let mut conn = self.conn();
        let _: () = conn.lpush(LOGS_KEY, json).await?;
        let _: () = conn.ltrim(LOGS_KEY, 0, MAX_LOG_ENTRIES - 1).await?;
        Ok(())
    }

    async fn recent_logs(&self, limit: usize) -> Result<Vec<RequestLog>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let raw: Vec<String> = self
            .conn()
            .lrange(LOGS_KEY, 0, limit as isize - 1)
            .await?;
        raw.iter()
            .map(|json| serde_json::from_str(json).map_err(Into::into))
            .collect()
    }

    async fn count_logs(&self) -> Result<u64> {
        Ok(self.conn().llen(LOGS_KEY).await?)
    }

    async fn delete_all_logs(&self) -> Result<()> {
        let _: () = self.conn().del(LOGS_KEY).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Algorithm;

    // Requires a local Redis server; run with `cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn test_round_trip_against_local_redis() {
        let store = RedisStore::connect("redis://127.0.0.1:6379")
            .await
            .expect("local redis not reachable");
        store.delete_all_logs().await.unwrap();

        let key = ApiKeyRecord::new("redis-test");
        store.put_api_key(&key).await.unwrap();
        let found = store.find_api_key(&key.api_key).await.unwrap().unwrap();
        assert_eq!(found.id, key.id);

        store
            .put_config(&RateLimitConfig::new(
                &key.api_key,
                Algorithm::LeakyBucket,
                5,
                10.0,
            ))
            .await
            .unwrap();
        let latest = store.latest_config_for(&key.api_key).await.unwrap().unwrap();
        assert_eq!(latest.algorithm, Algorithm::LeakyBucket);
    }
}
