//! Best-effort asynchronous persistence of decision logs.
//!
//! Decisions must never wait on storage I/O, so the gateway pushes each
//! [`RequestLog`] onto a bounded in-memory queue and a single background task
//! drains it into the store. Overflow drops the oldest entries; telemetry is
//! best-effort and a failed append is logged and forgotten.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, warn};

use super::models::RequestLog;
use crate::storage::StorageLayer;

/// Default queue capacity.
const QUEUE_CAPACITY: usize = 4096;

#[derive(Debug)]
struct SinkQueue {
    entries: Mutex<VecDeque<RequestLog>>,
    notify: Notify,
    capacity: usize,
}

/// Handle for submitting decision logs to the background writer.
#[derive(Debug, Clone)]
pub struct LogSink {
    queue: Arc<SinkQueue>,
}

impl LogSink {
    /// Spawn the background writer task and return a submission handle.
    pub fn spawn(storage: Arc<StorageLayer>) -> Self {
        Self::with_capacity(storage, QUEUE_CAPACITY)
    }

    /// Spawn with an explicit queue capacity.
    pub fn with_capacity(storage: Arc<StorageLayer>, capacity: usize) -> Self {
        let queue = Arc::new(SinkQueue {
            entries: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            capacity: capacity.max(1),
        });

        let worker_queue = Arc::clone(&queue);
        tokio::spawn(async move {
            loop {
                let batch: Vec<RequestLog> = {
                    let mut entries = worker_queue.entries.lock();
                    entries.drain(..).collect()
                };

                if batch.is_empty() {
                    worker_queue.notify.notified().await;
                    continue;
                }

                for log in batch {
                    // Best-effort: the decision has already been returned
                    if let Err(e) = storage.append_log(&log).await {
                        warn!(error = %e, api_key = %log.api_key, "Failed to persist request log");
                    }
                }
            }
        });

        Self { queue }
    }

    /// Enqueue a log for persistence. Never blocks; drops the oldest queued
    /// entry when full.
    pub fn submit(&self, log: RequestLog) {
        {
            let mut entries = self.queue.entries.lock();
            if entries.len() == self.queue.capacity {
                entries.pop_front();
                debug!("Log sink full, dropped oldest entry");
            }
            entries.push_back(log);
        }
        self.queue.notify.notify_one();
    }

    /// Entries waiting to be written.
    pub fn pending(&self) -> usize {
        self.queue.entries.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::core::models::{Algorithm, RequestLog};
    use chrono::Utc;
    use uuid::Uuid;

    fn log(marker: u64) -> RequestLog {
        RequestLog {
            id: Uuid::new_v4(),
            api_key: "rk_test".to_string(),
            endpoint: "/api/protected/test".to_string(),
            algorithm: Algorithm::TokenBucket,
            allowed: true,
            timestamp: Utc::now(),
            remaining_quota: marker,
        }
    }

    async fn memory_storage() -> Arc<StorageLayer> {
        let config = StorageConfig {
            url: "memory://".to_string(),
        };
        Arc::new(StorageLayer::new(&config).await.unwrap())
    }

    #[tokio::test]
    async fn test_submitted_logs_reach_the_store() {
        let storage = memory_storage().await;
        let sink = LogSink::spawn(Arc::clone(&storage));

        for i in 0..10 {
            sink.submit(log(i));
        }

        // Poll until the background task has drained the queue
        for _ in 0..100 {
            if storage.count_logs().await.unwrap() == 10 {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("sink did not drain within the deadline");
    }

    #[tokio::test]
    async fn test_overflow_drops_oldest() {
        let storage = memory_storage().await;
        // Capacity 2; submit 3 before the worker can drain. The worker may
        // interleave, so only assert the oldest-first drop property on the
        // queue itself by pre-filling synchronously.
        let sink = LogSink::with_capacity(storage, 2);

        // Hold no await points between submits: the worker cannot run.
        sink.submit(log(1));
        sink.submit(log(2));
        sink.submit(log(3));

        let pending = sink.pending();
        assert!(pending <= 2, "queue exceeded its bound: {pending}");
    }
}
