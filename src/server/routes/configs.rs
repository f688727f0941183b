//! Rate-limit configuration endpoints.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;

use crate::core::models::{Algorithm, RateLimitConfig};
use crate::server::state::AppState;
use crate::utils::error::{RateGateError, Result};

/// Configure rate-limit-config routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/rate-limit-configs")
            .route(web::post().to(create_config))
            .route(web::get().to(list_configs)),
    );
}

/// Configuration creation request
#[derive(Debug, Deserialize)]
struct CreateConfigRequest {
    api_key: String,
    algorithm: Algorithm,
    max_requests: u64,
    window_seconds: f64,
}

/// Create a rate-limit configuration for an existing API key.
///
/// The new configuration supersedes any earlier one for the key, and the
/// key's live limiter instance is evicted so the next decision starts fresh
/// under the new policy.
async fn create_config(
    state: web::Data<AppState>,
    body: web::Json<CreateConfigRequest>,
) -> Result<HttpResponse> {
    if body.max_requests == 0 {
        return Err(RateGateError::Validation(
            "max_requests must be positive".to_string(),
        ));
    }
    if !(body.window_seconds.is_finite() && body.window_seconds > 0.0) {
        return Err(RateGateError::Validation(
            "window_seconds must be a positive number".to_string(),
        ));
    }

    if state.storage.find_api_key(&body.api_key).await?.is_none() {
        return Err(RateGateError::NotFound("API key".to_string()));
    }

    let record = RateLimitConfig::new(
        &body.api_key,
        body.algorithm,
        body.max_requests,
        body.window_seconds,
    );
    state.storage.put_config(&record).await?;
    state.registry.evict(&body.api_key);

    info!(
        api_key = %record.api_key,
        algorithm = %record.algorithm,
        max_requests = record.max_requests,
        window_seconds = record.window_seconds,
        "Rate limit configured"
    );
    Ok(HttpResponse::Ok().json(record))
}

/// List all effective configurations, oldest first.
async fn list_configs(state: web::Data<AppState>) -> Result<HttpResponse> {
    let records = state.storage.list_configs().await?;
    Ok(HttpResponse::Ok().json(records))
}
