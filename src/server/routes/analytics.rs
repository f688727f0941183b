//! Analytics and admin-reset endpoints.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::server::state::AppState;
use crate::utils::error::Result;

/// Configure analytics routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/analytics/summary", web::get().to(summary))
        .route("/analytics/recent-logs", web::get().to(recent_logs))
        .route("/reset-stats", web::delete().to(reset_stats));
}

/// Counter snapshot for the dashboard.
async fn summary(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.analytics.summary()))
}

fn default_limit() -> usize {
    100
}

#[derive(Debug, Deserialize)]
struct RecentLogsQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    api_key: Option<String>,
}

/// Recent decisions, newest first, optionally filtered by key.
async fn recent_logs(
    state: web::Data<AppState>,
    query: web::Query<RecentLogsQuery>,
) -> Result<HttpResponse> {
    let logs = state
        .analytics
        .recent(query.limit, query.api_key.as_deref());
    Ok(HttpResponse::Ok().json(logs))
}

/// Reset all statistics: counters, live limiter instances, and the persisted
/// decision log.
async fn reset_stats(state: web::Data<AppState>) -> Result<HttpResponse> {
    state.analytics.reset();
    state.registry.reset();
    state.storage.delete_all_logs().await?;

    info!("Statistics and limiter state reset");
    Ok(HttpResponse::Ok().json(json!({ "status": "ok" })))
}
