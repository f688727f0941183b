//! Application state shared across HTTP handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::core::analytics::AnalyticsAggregator;
use crate::core::gateway::DecisionGateway;
use crate::core::registry::LimiterRegistry;
use crate::storage::StorageLayer;

/// Shared resources handed to every request handler.
///
/// All engine components are constructed once at startup; handlers only ever
/// see them through `Arc`, so cloning the state is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration (read-only)
    pub config: Arc<Config>,
    /// Storage layer
    pub storage: Arc<StorageLayer>,
    /// Per-tenant limiter registry
    pub registry: Arc<LimiterRegistry>,
    /// In-memory decision telemetry
    pub analytics: Arc<AnalyticsAggregator>,
    /// The decision front door
    pub gateway: Arc<DecisionGateway>,
}

impl AppState {
    /// Assemble the state from already-constructed components.
    pub fn new(
        config: Config,
        storage: Arc<StorageLayer>,
        registry: Arc<LimiterRegistry>,
        analytics: Arc<AnalyticsAggregator>,
        gateway: Arc<DecisionGateway>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            registry,
            analytics,
            gateway,
        }
    }
}
