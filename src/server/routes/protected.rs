//! The rate-limited demonstration endpoint.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::models::Algorithm;
use crate::server::state::AppState;
use crate::utils::error::Result;

/// Configure the protected test route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/protected/test", web::get().to(protected_test));
}

#[derive(Debug, Deserialize)]
struct ProtectedQuery {
    api_key: String,
}

/// Successful admission response
#[derive(Debug, Serialize)]
struct AllowedResponse {
    success: bool,
    message: &'static str,
    algorithm: Algorithm,
    remaining_quota: u64,
    timestamp: DateTime<Utc>,
}

/// Run one admission decision for the calling key.
///
/// Admitted requests get 200 with the remaining quota; blocked requests get
/// 429; unknown keys get 401.
async fn protected_test(
    state: web::Data<AppState>,
    query: web::Query<ProtectedQuery>,
) -> Result<HttpResponse> {
    let decision = state
        .gateway
        .decide(&query.api_key, "/api/protected/test")
        .await?;

    if decision.allowed {
        Ok(HttpResponse::Ok().json(AllowedResponse {
            success: true,
            message: "Request allowed",
            algorithm: decision.algorithm,
            remaining_quota: decision.remaining_quota,
            timestamp: decision.timestamp,
        }))
    } else {
        Ok(HttpResponse::TooManyRequests().json(json!({
            "detail": "Rate limit exceeded",
            "algorithm": decision.algorithm,
            "remaining_quota": 0,
        })))
    }
}
