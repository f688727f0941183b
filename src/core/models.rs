//! Domain records shared across the engine, the HTTP surface, and storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The four rate-limiting algorithms.
///
/// Wire format is lowercase snake_case (`token_bucket`, `leaky_bucket`,
/// `fixed_window`, `sliding_window`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Tokens refill at a constant rate; bursts up to capacity
    TokenBucket,
    /// Queue drains at a constant rate
    LeakyBucket,
    /// Counter resets at fixed interval boundaries
    FixedWindow,
    /// Weighted counter across the current and previous window
    SlidingWindow,
}

impl Algorithm {
    /// All algorithms, in reporting order.
    pub const ALL: [Algorithm; 4] = [
        Algorithm::TokenBucket,
        Algorithm::LeakyBucket,
        Algorithm::FixedWindow,
        Algorithm::SlidingWindow,
    ];

    /// Wire tag for this algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::TokenBucket => "token_bucket",
            Algorithm::LeakyBucket => "leaky_bucket",
            Algorithm::FixedWindow => "fixed_window",
            Algorithm::SlidingWindow => "sliding_window",
        }
    }

    /// Stable index into per-algorithm tables.
    pub(crate) fn index(&self) -> usize {
        match self {
            Algorithm::TokenBucket => 0,
            Algorithm::LeakyBucket => 1,
            Algorithm::FixedWindow => 2,
            Algorithm::SlidingWindow => 3,
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered tenant, identified by an opaque bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    /// Record id
    pub id: Uuid,
    /// Human-readable key name
    pub name: String,
    /// The opaque bearer token, unique across the system
    pub api_key: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Whether the key may be used
    pub is_active: bool,
}

impl ApiKeyRecord {
    /// Create a record with a freshly generated token.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            api_key: format!("rk_{}", Uuid::new_v4().simple()),
            created_at: Utc::now(),
            is_active: true,
        }
    }
}

/// Stored rate-limit policy for one API key.
///
/// A new insert for the same key supersedes earlier configs (most recent wins
/// by `created_at`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Record id
    pub id: Uuid,
    /// The key this policy applies to
    pub api_key: String,
    /// Enforcing algorithm
    pub algorithm: Algorithm,
    /// Maximum admissions per window
    pub max_requests: u64,
    /// Window length in seconds
    pub window_seconds: f64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl RateLimitConfig {
    /// Create a new policy record.
    pub fn new(
        api_key: impl Into<String>,
        algorithm: Algorithm,
        max_requests: u64,
        window_seconds: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            api_key: api_key.into(),
            algorithm,
            max_requests,
            window_seconds,
            created_at: Utc::now(),
        }
    }
}

/// One decision, as appended to the audit log and the analytics ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLog {
    /// Record id
    pub id: Uuid,
    /// Key the decision was made for
    pub api_key: String,
    /// Endpoint the request targeted
    pub endpoint: String,
    /// Algorithm that made the decision
    pub algorithm: Algorithm,
    /// Whether the request was admitted
    pub allowed: bool,
    /// Wall-clock time of the decision
    pub timestamp: DateTime<Utc>,
    /// Estimated further admissions at the decision instant
    pub remaining_quota: u64,
}
