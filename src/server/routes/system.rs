//! Service banner and system status endpoints.

use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

use crate::server::state::AppState;
use crate::utils::error::Result;

/// Configure system routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/system-status", web::get().to(system_status));
}

/// Service banner.
async fn root() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "RateGate rate limiting service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// System status response
#[derive(Debug, Serialize)]
struct SystemStatus {
    status: &'static str,
    active_api_keys: u64,
    active_configs: u64,
    total_requests_logged: u64,
    active_limiters: BTreeMap<&'static str, usize>,
}

/// Counts of stored records and live limiter instances.
async fn system_status(state: web::Data<AppState>) -> Result<HttpResponse> {
    let active_counts = state.registry.active_counts();
    let active_limiters = active_counts
        .iter()
        .map(|(algorithm, count)| (algorithm.as_str(), *count))
        .collect();

    let status = SystemStatus {
        status: "operational",
        active_api_keys: state.storage.count_api_keys().await?,
        active_configs: state.storage.count_configs().await?,
        total_requests_logged: state.storage.count_logs().await?,
        active_limiters,
    };
    Ok(HttpResponse::Ok().json(status))
}
