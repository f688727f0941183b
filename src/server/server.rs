//! HTTP server assembly: engine construction, middleware, and routes.

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer as ActixHttpServer};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::core::analytics::AnalyticsAggregator;
use crate::core::clock::{Clock, MonotonicClock};
use crate::core::gateway::DecisionGateway;
use crate::core::registry::LimiterRegistry;
use crate::server::routes;
use crate::server::state::AppState;
use crate::storage::StorageLayer;
use crate::utils::error::{RateGateError, Result};

/// The HTTP server and the engine it fronts.
pub struct HttpServer {
    config: Config,
    state: AppState,
}

impl HttpServer {
    /// Build the engine and wire up the server.
    pub async fn new(config: Config) -> Result<Self> {
        info!("Initializing engine");

        let storage = Arc::new(StorageLayer::new(&config.storage).await?);
        let registry = Arc::new(LimiterRegistry::new());
        let analytics = Arc::new(AnalyticsAggregator::new());
        let clock = Arc::new(MonotonicClock::new()) as Arc<dyn Clock>;

        let gateway = Arc::new(DecisionGateway::new(
            Arc::clone(&storage),
            Arc::clone(&registry),
            Arc::clone(&analytics),
            clock,
        ));

        let state = AppState::new(config.clone(), storage, registry, analytics, gateway);

        Ok(Self { config, state })
    }

    /// Run the server until the process is asked to stop.
    pub async fn start(self) -> Result<()> {
        let bind_addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        info!("Starting HTTP server on {}", bind_addr);

        let server_config = self.config.server.clone();
        let state = web::Data::new(self.state);

        let server = ActixHttpServer::new(move || {
            let cors = if server_config.allows_any_origin() {
                Cors::permissive()
            } else {
                let mut cors = Cors::default()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600);
                for origin in &server_config.cors_origins {
                    cors = cors.allowed_origin(origin);
                }
                cors
            };

            App::new()
                .app_data(state.clone())
                .wrap(cors)
                .wrap(Logger::default())
                .configure(routes::configure_api)
        })
        .bind(&bind_addr)
        .map_err(|e| {
            RateGateError::Config(format!("Failed to bind {bind_addr}: {e}"))
        })?
        .run();

        info!("HTTP server listening on {}", bind_addr);
        server
            .await
            .map_err(|e| RateGateError::Internal(format!("Server error: {e}")))?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// The shared application state (used by tests).
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
