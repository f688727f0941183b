//! The rate-limiting engine: clock, algorithms, registry, gateway,
//! analytics, and the load driver.

pub mod algorithms;
pub mod analytics;
pub mod clock;
pub mod gateway;
pub mod loadtest;
pub mod models;
pub mod registry;
pub mod sink;

pub use algorithms::{Limiter, LimiterParams, Verdict};
pub use analytics::{AnalyticsAggregator, AnalyticsSummary};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use gateway::{Decision, DecisionGateway};
pub use loadtest::{run_load_test, LoadTestReport, LoadTestRequest};
pub use models::{Algorithm, ApiKeyRecord, RateLimitConfig, RequestLog};
pub use registry::LimiterRegistry;
pub use sink::LogSink;
