//! # RateGate
//!
//! A multi-tenant API rate limiting service.
//!
//! Given a tenant's API key and its configured policy, RateGate decides in
//! O(1) whether a request is allowed or blocked, keeps the per-tenant state
//! each algorithm needs across time, and exposes the telemetry a live
//! dashboard reads.
//!
//! ## Features
//!
//! - **Four algorithms**: Token Bucket, Leaky Bucket, Fixed Window, and
//!   Sliding Window Counter, interchangeable per tenant
//! - **Race-free decisions**: one mutex per live instance; decisions for a
//!   key are totally ordered
//! - **Live analytics**: process-wide counters and a ring of recent
//!   decisions, updated synchronously with every decision
//! - **Async persistence**: the decision path never waits on storage; the
//!   audit log is written by a background worker
//! - **Built-in load driver**: drive the decision path at a target rate and
//!   measure admission behavior
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use rategate::{Config, RateGate};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let gate = RateGate::new(config).await?;
//!     gate.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main types
pub use crate::config::Config;
pub use crate::core::{
    Algorithm, AnalyticsAggregator, Clock, Decision, DecisionGateway, LimiterRegistry,
    ManualClock, MonotonicClock,
};
pub use crate::storage::StorageLayer;
pub use crate::utils::error::{RateGateError, Result};

use tracing::info;

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The assembled service: engine plus HTTP surface.
pub struct RateGate {
    server: server::HttpServer,
}

impl RateGate {
    /// Build the engine and HTTP server from a configuration.
    pub async fn new(config: Config) -> Result<Self> {
        info!("Creating RateGate instance");
        let server = server::HttpServer::new(config).await?;
        Ok(Self { server })
    }

    /// Run until the process is asked to stop.
    pub async fn run(self) -> Result<()> {
        info!("Starting RateGate v{}", VERSION);
        self.server.start().await
    }
}
